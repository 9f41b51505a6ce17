//! # 라이브 세션 라우트 핸들러 (참가자용)
//!
//! 클라이언트 게이트웨이의 세 가지 동작을 그대로 HTTP로 노출합니다.
//!
//! ## 엔드포인트
//! - `GET  /api/v1/live-sessions/{id}`                  → 세션 + 내 답안 + 현재 문항 위치
//! - `POST /api/v1/live-sessions/{id}/answers`          → 답안 하나 제출
//! - `PUT  /api/v1/live-sessions/{id}/current-question` → 현재 문항 위치 저장
//!
//! 모든 엔드포인트는 `AuthUser`(Bearer JWT)가 필요합니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::SqlitePool;

async fn find_session(pool: &SqlitePool, id: &str) -> Result<Session, AppError> {
    db::get_live_session(pool, id).await?.ok_or(AppError::NotFound)
}

fn question_at(session: &Session, question_index: usize) -> Result<&Question, AppError> {
    session.questions.get(question_index).ok_or_else(|| {
        AppError::BadRequest(format!(
            "question_index {} is out of range (session has {} questions)",
            question_index,
            session.questions.len()
        ))
    })
}

/// `GET /live-sessions/{id}`: 세션을 조회합니다.
///
/// 진행 중이거나 끝난 세션이면 참가 기록을 함께 돌려주고 (없으면 빈 답안으로 생성),
/// 아직 시작 전이면 `answers: []`, `current_question_index: 0`입니다.
pub async fn load_live_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LoadSessionResponse>, AppError> {
    let session = find_session(&state.pool, &id).await?;

    let participation = if session.status.has_participation() {
        db::ensure_participation(
            &state.pool,
            &session.id,
            &auth_user.user_id,
            session.questions.len(),
        )
        .await?
    } else {
        Participation::default()
    };

    Ok(Json(LoadSessionResponse {
        session,
        answers: participation.answers,
        current_question_index: participation.current_question_index,
    }))
}

/// `POST /live-sessions/{id}/answers`: 답안 하나를 기록합니다.
///
/// # 에러
/// - 409: 세션이 `active`가 아님
/// - 400: 문항 또는 선택지 인덱스가 범위를 벗어남
pub async fn submit_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let session = find_session(&state.pool, &id).await?;

    if session.status != SessionStatus::Active {
        return Err(AppError::Conflict(format!(
            "Answers are only accepted while the session is active (status: {})",
            session.status.as_str()
        )));
    }

    let question = question_at(&session, req.question_index)?;
    if req.answer_index >= question.options.len() {
        return Err(AppError::BadRequest(format!(
            "answer_index {} is out of range (question has {} options)",
            req.answer_index,
            question.options.len()
        )));
    }

    let answers = db::save_answer(
        &state.pool,
        &session.id,
        &auth_user.user_id,
        session.questions.len(),
        req.question_index,
        req.answer_index,
    )
    .await?;

    tracing::debug!(
        session_id = %session.id,
        user_id = %auth_user.user_id,
        question_index = req.question_index,
        answer_index = req.answer_index,
        "Answer recorded"
    );

    Ok(Json(SubmitAnswerResponse { answers }))
}

/// `PUT /live-sessions/{id}/current-question`: 마지막으로 보던 문항 위치를 저장합니다.
///
/// 다른 기기에서 다시 들어왔을 때 같은 문항부터 보여주기 위한 값입니다.
pub async fn update_current_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<QuestionIndexPayload>,
) -> Result<Json<QuestionIndexPayload>, AppError> {
    let session = find_session(&state.pool, &id).await?;

    if !session.status.has_participation() {
        return Err(AppError::Conflict(format!(
            "Session has not started yet (status: {})",
            session.status.as_str()
        )));
    }
    question_at(&session, req.question_index)?;

    let question_index = db::save_current_question_index(
        &state.pool,
        &session.id,
        &auth_user.user_id,
        session.questions.len(),
        req.question_index,
    )
    .await?;

    Ok(Json(QuestionIndexPayload { question_index }))
}
