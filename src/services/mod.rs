//! # 서비스 계층
//!
//! 여러 라우트가 공유하는 비즈니스 로직입니다.
//! - `accounts`: 비밀번호 해싱, 가입/로그인, 관리자 계정 준비

pub mod accounts;
