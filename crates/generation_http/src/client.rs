use generation_service::{ContinueRequest, ContinueResponse, GenerationError, SessionOpening};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::HttpServiceConfig;
use crate::error::{map_request_error, parse_error_message};
use crate::retry::{is_retryable_http_error, retry_delay};
use crate::url::join_endpoint;

/// Async client for the two session flows.
#[derive(Debug, Clone)]
pub struct FlowClient {
    http: Client,
    config: HttpServiceConfig,
}

impl FlowClient {
    pub fn new(config: HttpServiceConfig) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|error| GenerationError::Unavailable(error.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HttpServiceConfig {
        &self.config
    }

    pub fn begin_endpoint(&self) -> String {
        join_endpoint(&self.config.base_url, &self.config.begin_path)
    }

    pub fn continue_endpoint(&self) -> String {
        join_endpoint(&self.config.base_url, &self.config.continue_path)
    }

    pub fn build_request<B: Serialize>(&self, endpoint: &str, body: &B) -> reqwest::RequestBuilder {
        self.http.post(endpoint).json(body)
    }

    pub async fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
        let endpoint = self.begin_endpoint();
        let opening: SessionOpening = self.post_with_retry(&endpoint, &json!({})).await?;
        tracing::debug!(
            endpoint = %endpoint,
            chars = opening.opening_message.len(),
            "session opening received"
        );
        Ok(opening)
    }

    pub async fn continue_session(
        &self,
        request: &ContinueRequest,
    ) -> Result<ContinueResponse, GenerationError> {
        let endpoint = self.continue_endpoint();
        let response: ContinueResponse = self.post_with_retry(&endpoint, request).await?;
        tracing::debug!(
            endpoint = %endpoint,
            reply_chars = response.ai_response.len(),
            history_chars = response.updated_conversation_history.len(),
            "turn reply received"
        );
        Ok(response)
    }

    async fn post_with_retry<B, T>(&self, endpoint: &str, body: &B) -> Result<T, GenerationError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;

        loop {
            let failure = match self.post_once(endpoint, body).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            let retryable = match &failure {
                Attempt::Status {
                    status,
                    response_body,
                    ..
                } => is_retryable_http_error(status.as_u16(), response_body),
                Attempt::Failed(error) => error.is_retryable(),
            };

            if !retryable || attempt >= max_retries {
                return Err(failure.into_error());
            }

            let delay = retry_delay(self.config.retry_base_delay, attempt);
            tracing::warn!(
                endpoint,
                attempt = attempt + 1,
                max_retries,
                delay_ms = delay.as_millis() as u64,
                "retrying generation request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn post_once<B, T>(&self, endpoint: &str, body: &B) -> Result<T, Attempt>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .build_request(endpoint, body)
            .send()
            .await
            .map_err(|error| Attempt::Failed(map_request_error(error)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| Attempt::Failed(map_request_error(error)))?;

        if !status.is_success() {
            let message = parse_error_message(status, &text);
            return Err(Attempt::Status {
                status,
                response_body: text,
                message,
            });
        }

        serde_json::from_str::<T>(&text)
            .map_err(|error| Attempt::Failed(GenerationError::InvalidResponse(error.to_string())))
    }
}

enum Attempt {
    Status {
        status: StatusCode,
        response_body: String,
        message: String,
    },
    Failed(GenerationError),
}

impl Attempt {
    fn into_error(self) -> GenerationError {
        match self {
            Self::Status {
                status, message, ..
            } => GenerationError::Status {
                status: status.as_u16(),
                message,
            },
            Self::Failed(error) => error,
        }
    }
}
