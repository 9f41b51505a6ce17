//! # ensayo-live
//!
//! 라이브 세션(실시간 모의고사) 한 회차를 참가자 쪽에서 따라가는 상태 머신과,
//! 그 상태 머신이 호출하는 세션 API 서버를 함께 담은 크레이트입니다.
//!
//! - 클라이언트 코어: [`live`] (상태 머신, 드라이버, 파사드, 게이트웨이)
//! - 서버: [`routes`], [`db`], [`middleware`], [`services`]
//! - 공유: [`models`], [`error`], [`config`]

pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::AppState;

/// 서버 전체 라우터: API를 `/api/v1` 아래에 두고 CORS와 요청 로깅을 씌웁니다.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
