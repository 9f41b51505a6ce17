//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! - `AppError`: 서버 쪽 에러. `IntoResponse`로 HTTP 응답으로 자동 변환됩니다.
//! - `GatewayError`: 클라이언트 쪽(상태 머신이 쓰는 세션 게이트웨이) 에러.
//!   네트워크 계층이 무엇이든(HTTP, 테스트용 가짜 구현 등) 이 네 가지로 분류합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// 서버에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400): 범위를 벗어난 문항/선택지 인덱스 등
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수에서 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 부족 (HTTP 403): 관리자 전용 API
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 현재 상태와 충돌 (HTTP 409): 예: 진행 중이 아닌 세션에 답안 제출
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 세션 게이트웨이 호출 실패의 종류
///
/// 상태 머신은 이 에러를 사용자에게 그대로 보여주지 않습니다.
/// 최초 로딩 실패만 `error` 상태로 노출되고, 나머지(폴링/이동 저장/답안 제출)는
/// 로그만 남깁니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// 세션이 존재하지 않음
    #[error("session not found: {0}")]
    NotFound(String),

    /// 서버가 요청을 거부함 (범위를 벗어난 인덱스, 진행 중이 아닌 세션 등)
    #[error("rejected by server: {0}")]
    Validation(String),

    /// 연결 실패, 5xx 응답, 해석할 수 없는 응답 본문
    #[error("network error: {0}")]
    Network(String),

    /// 제한 시간 안에 응답이 오지 않음
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_map_to_status_codes() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn gateway_error_messages_are_not_empty() {
        let timeout = GatewayError::Timeout(Duration::from_secs(10));
        assert_eq!(timeout.to_string(), "request timed out after 10s");
        assert!(!GatewayError::Network("refused".into()).to_string().is_empty());
    }
}
