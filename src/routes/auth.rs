use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{create_access_token, AuthUser},
    models::user::*,
    routes::AppState,
    services::accounts,
};
use axum::{extract::State, http::StatusCode, Json};

fn issue(user: User, secret: &str) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = accounts::register_student(&state.pool, &req).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "Registered student");

    Ok((StatusCode::CREATED, Json(issue(user, &state.jwt_secret)?)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = accounts::authenticate(&state.pool, &req.username, &req.password).await?;

    Ok(Json(issue(user, &state.jwt_secret)?))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
