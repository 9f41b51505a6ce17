//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `admin`: 관리자용 세션 생성/목록/상태 변경
//! - `auth`: 인증 관련 (회원가입, 로그인, 내 정보)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `live_sessions`: 참가자용 세션 조회, 답안 제출, 현재 문항 저장

pub mod admin;
pub mod auth;
pub mod health;
pub mod live_sessions;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
}

/// `/api/v1` 아래에 중첩될 API 라우터를 만듭니다.
///
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 사용합니다.
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    // 참가자용: 게이트웨이 세 가지 동작과 1:1로 대응합니다.
    let live_routes = Router::new()
        .route("/live-sessions/{id}", get(live_sessions::load_live_session))
        .route(
            "/live-sessions/{id}/answers",
            post(live_sessions::submit_answer),
        )
        .route(
            "/live-sessions/{id}/current-question",
            put(live_sessions::update_current_question),
        );

    let admin_routes = Router::new()
        .route(
            "/admin/live-sessions",
            get(admin::list_live_sessions).post(admin::create_live_session),
        )
        .route(
            "/admin/live-sessions/{id}/status",
            patch(admin::update_live_session_status),
        );

    Router::new()
        .merge(auth_routes)
        .merge(live_routes)
        .merge(admin_routes)
        .route("/health", get(health::health_check))
        .with_state(state)
}
