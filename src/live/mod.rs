//! # 라이브 세션 클라이언트 코어
//!
//! 참가자 한 명이 라이브 세션(실시간 모의고사)을 따라가는 데 필요한 모든 것:
//! - `machine`: 상태 전이/가드/액션 (순수 로직)
//! - `guards`: 전이 조건 (머신과 파사드가 공유)
//! - `driver`: 머신을 tokio 태스크로 돌리며 게이트웨이 호출과 폴링을 실행
//! - `facade`: 뷰용 핸들(`LiveSession`)과 파생 값(`LiveSessionView`)
//! - `gateway` / `http_gateway`: 세션 데이터 게이트웨이 트레이트와 HTTP 구현
//! - `display`: 상태 문구, 시작까지 남은 시간

pub mod display;
pub mod driver;
pub mod facade;
pub mod gateway;
pub mod guards;
pub mod http_gateway;
pub mod machine;

pub use display::{minutes_until, minutes_until_start, status_label};
pub use driver::{spawn_live_session, LiveSessionOptions};
pub use facade::{LiveSession, LiveSessionView};
pub use gateway::SessionGateway;
pub use http_gateway::HttpGateway;
pub use machine::{
    determine_state, ActiveState, Effect, LiveCommand, LiveContext, LiveEvent, LiveSessionMachine,
    LiveSnapshot, LiveState, Preview,
};
