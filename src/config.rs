//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 서버 설정(`Config`):
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: 시작 시 만들어 둘 관리자 계정 (선택)
//!
//! 클라이언트 설정(`ClientConfig`, 상태 머신 + HTTP 게이트웨이용):
//! - `API_BASE_URL`: 라이브 세션 API 주소
//! - `ACCESS_TOKEN`: 참가자 JWT (선택)
//! - `LIVE_POLL_INTERVAL_MS`: 폴링 간격 (기본 2000ms)
//! - `LIVE_REQUEST_TIMEOUT_MS`: 게이트웨이 요청 제한 시간 (기본 10000ms)

use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// 서버 전체 설정
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/ensayo.db?mode=rwc")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 시작 시 보장할 관리자 계정: 둘 다 있어야 사용됩니다
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`이 없으면 에러가 발생합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }

    /// 관리자 계정 정보가 모두 설정된 경우에만 `(username, password)`를 돌려줍니다.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// 라이브 세션 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정을 만듭니다. 값이 없거나 숫자가 아니면 기본값을 씁니다.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: u64| {
            lookup(key)
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            api_base_url: lookup("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            access_token: lookup("ACCESS_TOKEN"),
            poll_interval: Duration::from_millis(millis(
                "LIVE_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )),
            request_timeout: Duration::from_millis(millis(
                "LIVE_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn client_config_falls_back_to_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
    }

    #[test]
    fn client_config_reads_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("API_BASE_URL", "https://ensayo.example/api/v1"),
            ("ACCESS_TOKEN", "token"),
            ("LIVE_POLL_INTERVAL_MS", "500"),
            ("LIVE_REQUEST_TIMEOUT_MS", "soon"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://ensayo.example/api/v1");
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_millis(10_000));
    }
}
