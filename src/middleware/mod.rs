//! # 요청 전처리 모듈
//!
//! - `auth`: JWT 발급/검증과 `AuthUser`/`AdminUser` 추출기(Extractor)

pub mod auth;
