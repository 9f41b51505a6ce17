//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `live_sessions`: 세션과 문항의 생성/조회/상태 변경 쿼리
//! - `participations`: 참가자별 답안과 현재 문항 위치 쿼리
//! - `users`: 사용자 인증 관련 쿼리

pub mod live_sessions;
pub mod participations;
pub mod users;

// 하위 모듈의 공개 함수를 재공개(re-export)하여
// `crate::db::get_live_session`처럼 바로 접근할 수 있게 합니다.
pub use live_sessions::*;
pub use participations::*;

/// 테스트용 인메모리 DB. 연결이 하나뿐이어야 같은 메모리 DB를 계속 봅니다.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}
