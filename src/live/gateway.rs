//! Session data gateway: the three network capabilities the live session
//! machine depends on. Transport is up to the implementation
//! (`HttpGateway` for the real API, scripted fakes in tests).

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{LoadSessionResponse, QuestionIndexPayload, SubmitAnswerResponse};

#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Session plus the caller's participation. `answers` is empty and the
    /// index is zero while the session is still `scheduled` or `lobby`.
    async fn load_session(&self, session_id: &str) -> Result<LoadSessionResponse, GatewayError>;

    /// Stores one answer and returns the full, authoritative answer list.
    async fn submit_answer(
        &self,
        session_id: &str,
        question_index: usize,
        answer_index: usize,
    ) -> Result<SubmitAnswerResponse, GatewayError>;

    async fn update_current_question_index(
        &self,
        session_id: &str,
        question_index: usize,
    ) -> Result<QuestionIndexPayload, GatewayError>;
}
