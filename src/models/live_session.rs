//! # 라이브 세션 모델 정의
//!
//! 실시간 모의고사(ensayo) 세션과 참가자의 답안 상태를 표현하는 구조체들입니다.
//! 서버(axum 핸들러)와 클라이언트(상태 머신, HTTP 게이트웨이)가 같은 타입을 공유하므로
//! JSON 직렬화 형태가 곧 API 계약입니다.
//!
//! ## 세션 라이프사이클 (서버가 관리)
//! ```text
//! scheduled → lobby → active → completed
//!     └──────────┴────────┴──→ cancelled
//! ```
//! 상태 순서는 서버(관리자)만 바꿀 수 있습니다.
//! 클라이언트 상태 머신은 서버가 보고한 상태를 그대로 따라갈 뿐입니다.

use serde::{Deserialize, Serialize};

/// 참가자의 답안 목록. 문항마다 한 칸이며, `None`은 "아직 답하지 않음"입니다.
///
/// 선택지 인덱스는 0부터 시작하므로 0과 "미응답"을 구분하기 위해 `Option`을 씁니다.
pub type AnswerList = Vec<Option<usize>>;

/// 세션 상태
///
/// 서버가 알 수 없는 문자열을 보내면 `Unknown`으로 역직렬화됩니다.
/// (`#[serde(other)]`: 매칭되지 않는 모든 값이 이 variant로 들어감)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Lobby,
    Active,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    /// DB에 저장된 문자열을 상태로 변환합니다. 모르는 값은 `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value {
            "scheduled" => Self::Scheduled,
            "lobby" => Self::Lobby,
            "active" => Self::Active,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Lobby => "lobby",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// 참가 기록(답안)이 존재하는 단계인지 여부.
    /// `scheduled`/`lobby`에서는 아직 답안이 없으므로 조회하지 않습니다.
    pub fn has_participation(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

/// 문항 하나. 상태 머신은 문항 수(`questions.len()`)만 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

/// 라이브 세션: 예정된 시각에 여러 참가자가 함께 푸는 모의고사 한 회차
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub status: SessionStatus,
    /// 시작 예정 시각 (epoch 밀리초)
    pub scheduled_start: i64,
    /// 순서가 있는 문항 목록
    pub questions: Vec<Question>,
}

/// 관리자 목록 화면용 요약: `live_sessions` 테이블 한 행 + 문항 수
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub status: SessionStatus,
    pub scheduled_start: i64,
    pub question_count: usize,
}

/// 참가 기록: (세션, 사용자) 쌍마다 하나
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub answers: AnswerList,
    /// 서버에 저장된 현재 문항 위치 (새로고침해도 이어서 풀 수 있도록)
    pub current_question_index: usize,
}

// ── API 요청/응답 ──

/// `GET /api/v1/live-sessions/{id}` 응답
///
/// 세션이 `active`/`completed` 이전 단계면 `answers`는 비어 있고
/// `current_question_index`는 0입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSessionResponse {
    pub session: Session,
    #[serde(default)]
    pub answers: AnswerList,
    #[serde(default)]
    pub current_question_index: usize,
}

/// `POST /api/v1/live-sessions/{id}/answers` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_index: usize,
    pub answer_index: usize,
}

/// 답안 제출 응답: 저장 후의 전체 답안 목록(서버가 기준)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub answers: AnswerList,
}

/// `PUT /api/v1/live-sessions/{id}/current-question` 요청/응답 본문
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionIndexPayload {
    pub question_index: usize,
}

/// 관리자 세션 생성 요청의 문항 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

/// `POST /api/v1/admin/live-sessions` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLiveSessionRequest {
    pub title: String,
    pub scheduled_start: i64,
    pub questions: Vec<NewQuestion>,
}

/// `PATCH /api/v1/admin/live-sessions/{id}/status` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SessionStatus,
}
