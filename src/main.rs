//! # ensayo-live 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성과 마이그레이션
//! 4. 관리자 계정 준비 (ADMIN_USERNAME/ADMIN_PASSWORD가 있을 때)
//! 5. API 라우터 설정과 HTTP 서버 시작
//!
//! 라우터와 핸들러는 라이브러리 크레이트(`ensayo_live`)에 있고,
//! 여기서는 조립과 실행만 합니다.

use anyhow::Result;
use ensayo_live::{config::Config, routes::AppState, services::accounts};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 이 크레이트와 tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ensayo_live=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting ensayo-live server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    match config.admin_credentials() {
        Some((username, password)) => {
            accounts::ensure_admin(&pool, username, password).await?;
        }
        None => tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, admin routes unusable until an admin exists"),
    }

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
    };
    let app = ensayo_live::app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
