//! Minimal service-agnostic contract for the conversational generation backend.
//!
//! This crate defines only the two session operations a client drives (begin a
//! session, continue a session) plus their wire types and error taxonomy. It
//! excludes transport details, prompt construction and model selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opening turn produced when a brand-new session begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpening {
    #[serde(alias = "initialAiMessage")]
    pub opening_message: String,
}

impl SessionOpening {
    #[must_use]
    pub fn new(opening_message: impl Into<String>) -> Self {
        Self {
            opening_message: opening_message.into(),
        }
    }
}

/// Input required to continue an existing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequest {
    pub user_input: String,
    /// Flat transcript the service should treat as context, including the
    /// just-submitted user turn.
    pub conversation_history: String,
}

impl ContinueRequest {
    #[must_use]
    pub fn new(user_input: impl Into<String>, conversation_history: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            conversation_history: conversation_history.into(),
        }
    }
}

/// Reply to one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponse {
    pub ai_response: String,
    /// Canonical transcript after this turn. Callers must persist it verbatim.
    pub updated_conversation_history: String,
}

impl ContinueResponse {
    #[must_use]
    pub fn new(
        ai_response: impl Into<String>,
        updated_conversation_history: impl Into<String>,
    ) -> Self {
        Self {
            ai_response: ai_response.into(),
            updated_conversation_history: updated_conversation_history.into(),
        }
    }
}

/// Failure reported by a generation service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request timed out")]
    Timeout,

    #[error("generation service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("generation service unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    /// Returns true for failures worth retrying with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::InvalidResponse(_) | Self::Unavailable(_) => false,
        }
    }
}

/// Immutable metadata describing a generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProfile {
    pub service_id: String,
    pub endpoint: Option<String>,
}

/// Service interface for the two session operations.
///
/// Calls block the calling thread until the service answers or fails; hosts
/// run them off the UI thread.
pub trait GenerationService: Send + Sync + 'static {
    /// Returns service identity metadata.
    fn profile(&self) -> ServiceProfile;

    /// Produces the assistant's first turn for a session with no history.
    fn begin_session(&self) -> Result<SessionOpening, GenerationError>;

    /// Produces the assistant reply and the updated canonical transcript.
    fn continue_session(&self, request: ContinueRequest)
        -> Result<ContinueResponse, GenerationError>;
}
