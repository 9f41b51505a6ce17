//! # 관리자 라우트 핸들러
//!
//! 세션을 만들고 단계를 진행시키는 쪽입니다. 참가자 클라이언트는 폴링으로 변화를 알게 됩니다.
//!
//! ## 엔드포인트
//! - `GET   /api/v1/admin/live-sessions`             → 세션 목록 (요약)
//! - `POST  /api/v1/admin/live-sessions`             → 문항과 함께 세션 생성
//! - `PATCH /api/v1/admin/live-sessions/{id}/status` → 세션 상태 변경
//!
//! `AdminUser` 추출기가 먼저 실행되므로 참가자 토큰으로는 403이 됩니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AdminUser,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_live_sessions(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let sessions = db::list_live_sessions(&state.pool).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// `POST /admin/live-sessions`: 새 세션을 `scheduled` 상태로 만듭니다.
///
/// 제목이 비었거나, 문항이 없거나, 선택지가 2개 미만인 문항이 있으면 400입니다.
pub async fn create_live_session(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(req): Json<CreateLiveSessionRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if req.questions.is_empty() {
        return Err(AppError::BadRequest(
            "A live session needs at least one question".to_string(),
        ));
    }
    if let Some(position) = req.questions.iter().position(|q| q.options.len() < 2) {
        return Err(AppError::BadRequest(format!(
            "Question {} needs at least two options",
            position
        )));
    }

    let session =
        db::create_live_session(&state.pool, title, req.scheduled_start, &req.questions).await?;

    tracing::info!(
        session_id = %session.id,
        admin_id = %admin.user_id,
        questions = session.questions.len(),
        "Created live session"
    );

    Ok((StatusCode::CREATED, Json(session)))
}

/// `PATCH /admin/live-sessions/{id}/status`: 세션 단계를 바꿉니다.
///
/// 알 수 없는 상태 문자열은 `Unknown`으로 파싱되므로 여기서 400으로 거절합니다.
pub async fn update_live_session_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Session>, AppError> {
    if req.status == SessionStatus::Unknown {
        return Err(AppError::BadRequest("Unsupported session status".to_string()));
    }

    let session = db::update_status(&state.pool, &id, req.status)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        session_id = %session.id,
        admin_id = %admin.user_id,
        status = session.status.as_str(),
        "Live session status changed"
    );

    Ok(Json(session))
}
