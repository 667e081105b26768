use generation_service::GenerationError;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: Option<ErrorPayloadValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorPayloadValue {
    Message(String),
    Fields {
        message: Option<String>,
        status: Option<String>,
    },
}

impl ErrorPayloadValue {
    fn message(&self) -> Option<&str> {
        let message = match self {
            Self::Message(message) => Some(message.as_str()),
            Self::Fields { message, status } => message.as_deref().or(status.as_deref()),
        };
        message.map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Extracts a human-readable message from an error response body.
///
/// Accepts `{"error": "..."}` and `{"error": {"message": "..."}}` shapes and
/// falls back to the raw body, then to the status reason phrase.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    match serde_json::from_str::<ErrorPayload>(body) {
        Ok(ErrorPayload { error: Some(value) }) => value
            .message()
            .map(ToOwned::to_owned)
            .unwrap_or_else(fallback),
        _ => fallback(),
    }
}

pub(crate) fn map_request_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout
    } else if error.is_decode() {
        GenerationError::InvalidResponse(error.to_string())
    } else {
        GenerationError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_message_is_preferred() {
        let message = parse_error_message(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"message":"flow crashed","status":"INTERNAL"}}"#,
        );
        assert_eq!(message, "flow crashed");
    }

    #[test]
    fn string_error_is_accepted() {
        let message = parse_error_message(StatusCode::BAD_REQUEST, r#"{"error":"missing userInput"}"#);
        assert_eq!(message, "missing userInput");
    }

    #[test]
    fn status_field_is_used_when_message_is_missing() {
        let message =
            parse_error_message(StatusCode::BAD_GATEWAY, r#"{"error":{"status":"UNAVAILABLE"}}"#);
        assert_eq!(message, "UNAVAILABLE");
    }

    #[test]
    fn non_json_body_is_returned_verbatim() {
        let message = parse_error_message(StatusCode::BAD_GATEWAY, "upstream connect error");
        assert_eq!(message, "upstream connect error");
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        let message = parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(message, "Service Unavailable");
    }
}
