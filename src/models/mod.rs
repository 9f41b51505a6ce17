//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `live_session`: 라이브 세션, 문항, 참가 기록, API 요청/응답
//! - `user`: 사용자(User)와 인증 요청/응답
//!
//! `pub use X::*;`로 재공개하므로 `crate::models::Session`처럼 짧게 쓸 수 있습니다.

pub mod live_session;
pub mod user;

pub use live_session::*;
pub use user::*;
