//! HTTP implementation of `SessionGateway` against the `/api/v1/live-sessions` API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::live::gateway::SessionGateway;
use crate::models::{
    LoadSessionResponse, QuestionIndexPayload, SubmitAnswerRequest, SubmitAnswerResponse,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.api_base_url.clone(),
            config.access_token.clone(),
            config.request_timeout,
        )
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn session_url(&self, session_id: &str, suffix: &str) -> String {
        format!("{}/live-sessions/{}{}", self.base_url, session_id, suffix)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(format!("invalid response body: {}", e)))
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Network(error.to_string())
        }
    }
}

async fn error_from_response(response: Response) -> GatewayError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error.message)
        .unwrap_or_else(|_| status.to_string());
    classify_status(status, message)
}

fn classify_status(status: StatusCode, message: String) -> GatewayError {
    match status {
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Network(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl SessionGateway for HttpGateway {
    async fn load_session(&self, session_id: &str) -> Result<LoadSessionResponse, GatewayError> {
        let url = self.session_url(session_id, "");
        self.execute(self.client.get(&url)).await
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        question_index: usize,
        answer_index: usize,
    ) -> Result<SubmitAnswerResponse, GatewayError> {
        let url = self.session_url(session_id, "/answers");
        let body = SubmitAnswerRequest {
            question_index,
            answer_index,
        };
        self.execute(self.client.post(&url).json(&body)).await
    }

    async fn update_current_question_index(
        &self,
        session_id: &str,
        question_index: usize,
    ) -> Result<QuestionIndexPayload, GatewayError> {
        let url = self.session_url(session_id, "/current-question");
        let body = QuestionIndexPayload { question_index };
        self.execute(self.client.put(&url).json(&body)).await
    }
}
