//! Session state machine.
//!
//! `Session` owns the live message list and the durable transcript string and
//! decides every transition; it performs no I/O. Service calls and store
//! writes are delegated to a [`SessionHost`], and their outcomes come back
//! through [`Session::on_session_begun`] and [`Session::on_turn_completed`].
//!
//! Two slots are kept apart: `messages` is what the user sees and
//! is updated optimistically, `persisted_transcript` is what survives a
//! restart and only ever changes to a value the service returned.

use generation_service::{ContinueRequest, ContinueResponse, GenerationError, SessionOpening};

use crate::transcript::{self, Message, Speaker};

pub type RequestId = u64;

pub const OPENING_FAILURE_TEXT: &str =
    "I seem to be having trouble starting our conversation. Please refresh.";
pub const TURN_FAILURE_TEXT: &str = "I apologize, but I encountered a slight difficulty in processing that. Could you perhaps rephrase or try again shortly?";
pub const UNREADABLE_HISTORY_TEXT: &str = "I could not recall our earlier conversation, so I have left it untouched. We can keep talking, but nothing new will be saved until it is readable again.";

/// Result of the one-time read of persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredTranscript {
    /// Nothing stored, or an empty value.
    Absent,
    Present(String),
    /// A record exists but could not be loaded. It must not be replaced.
    Unreadable,
}

impl From<Option<String>> for StoredTranscript {
    fn from(stored: Option<String>) -> Self {
        match stored {
            Some(transcript) if !transcript.is_empty() => Self::Present(transcript),
            _ => Self::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    StartingNew { request_id: RequestId },
    Ready,
    TurnPending { request_id: RequestId },
}

/// Transient "thinking" notice shown while a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Opening turn requested, nothing to show yet.
    Preparing,
    /// The user's turn is waiting on a reply.
    Contemplating,
}

impl Indicator {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Preparing => "The Sage is preparing their wisdom...",
            Self::Contemplating => "The Sage is contemplating...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent { request_id: RequestId },
    /// Empty or whitespace-only input; nothing changed.
    Blank,
    /// A request is already outstanding; nothing changed.
    Busy,
    /// Persisted state has not been read yet; nothing changed.
    NotMounted,
    /// The host could not dispatch the request; the turn failed locally.
    StartFailed(String),
}

pub trait SessionHost {
    fn begin_session(&mut self) -> Result<RequestId, String>;
    fn continue_session(&mut self, request: ContinueRequest) -> Result<RequestId, String>;
    fn persist_transcript(&mut self, transcript: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: Phase,
    messages: Vec<Message>,
    persisted_transcript: String,
    mounted: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            messages: Vec::new(),
            persisted_transcript: String::new(),
            mounted: false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(
            self.phase,
            Phase::StartingNew { .. } | Phase::TurnPending { .. }
        )
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn persisted_transcript(&self) -> &str {
        &self.persisted_transcript
    }

    #[must_use]
    pub fn indicator(&self) -> Option<Indicator> {
        if !self.is_pending() {
            return None;
        }

        match self.messages.last() {
            None => Some(Indicator::Preparing),
            Some(message) if message.speaker == Speaker::User => Some(Indicator::Contemplating),
            Some(_) => None,
        }
    }

    /// Applies the one-time read of persisted state.
    ///
    /// An absent transcript starts a new session; a present one is decoded
    /// into the live list. An unreadable one leaves the session Ready with a
    /// notice and no service call. Later calls are ignored.
    pub fn mount(&mut self, stored: impl Into<StoredTranscript>, host: &mut dyn SessionHost) {
        if self.mounted {
            tracing::debug!("session already mounted; ignoring repeated mount");
            return;
        }
        self.mounted = true;

        let stored = match stored.into() {
            StoredTranscript::Present(stored) => stored,
            StoredTranscript::Absent => {
                tracing::info!("no persisted transcript; starting a new session");
                match host.begin_session() {
                    Ok(request_id) => self.phase = Phase::StartingNew { request_id },
                    Err(error) => {
                        tracing::warn!(%error, "failed to dispatch session opening");
                        self.fail_opening();
                    }
                }
                return;
            }
            StoredTranscript::Unreadable => {
                tracing::warn!("persisted transcript unreadable; continuing without it");
                self.messages = vec![Message::assistant_error(UNREADABLE_HISTORY_TEXT)];
                self.phase = Phase::Ready;
                return;
            }
        };

        self.persisted_transcript = stored;
        if self.messages.is_empty() {
            let decoded = transcript::decode(&self.persisted_transcript);
            if decoded.is_empty() {
                tracing::warn!(
                    bytes = self.persisted_transcript.len(),
                    "persisted transcript contained no turns; live transcript left empty"
                );
            } else {
                tracing::info!(turns = decoded.len(), "resumed persisted session");
                self.messages = decoded;
            }
        }
        self.phase = Phase::Ready;
    }

    /// Optimistically records a user turn and asks the host to continue the session.
    pub fn submit(&mut self, text: &str, host: &mut dyn SessionHost) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Blank;
        }

        if !self.mounted {
            return SubmitOutcome::NotMounted;
        }

        if self.phase != Phase::Ready {
            tracing::debug!(phase = ?self.phase, "submission rejected while a request is outstanding");
            return SubmitOutcome::Busy;
        }

        self.messages.push(Message::user(text));

        // Context for the service only; the durable copy waits for its answer.
        let speculative_history = format!(
            "{}\n{}",
            self.persisted_transcript,
            transcript::encode_turn(Speaker::User, text)
        );
        let request = ContinueRequest::new(text, speculative_history);

        let outcome = match host.continue_session(request) {
            Ok(request_id) => {
                tracing::debug!(request_id, "turn dispatched");
                self.phase = Phase::TurnPending { request_id };
                SubmitOutcome::Sent { request_id }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to dispatch turn");
                self.messages.push(Message::assistant_error(TURN_FAILURE_TEXT));
                self.phase = Phase::Ready;
                SubmitOutcome::StartFailed(error)
            }
        };

        outcome
    }

    pub fn on_session_begun(
        &mut self,
        request_id: RequestId,
        result: Result<SessionOpening, GenerationError>,
        host: &mut dyn SessionHost,
    ) {
        if self.phase != (Phase::StartingNew { request_id }) {
            tracing::debug!(request_id, "ignoring stale session opening");
            return;
        }

        match result {
            Ok(opening) => {
                let encoded = transcript::encode_turn(Speaker::Assistant, &opening.opening_message);
                self.messages = vec![Message::assistant(opening.opening_message)];
                self.persisted_transcript = encoded;
                host.persist_transcript(&self.persisted_transcript);
                tracing::info!("new session opened");
            }
            Err(error) => {
                tracing::warn!(%error, "session opening failed");
                self.fail_opening();
            }
        }

        self.phase = Phase::Ready;
    }

    pub fn on_turn_completed(
        &mut self,
        request_id: RequestId,
        result: Result<ContinueResponse, GenerationError>,
        host: &mut dyn SessionHost,
    ) {
        if self.phase != (Phase::TurnPending { request_id }) {
            tracing::debug!(request_id, "ignoring stale turn completion");
            return;
        }

        match result {
            Ok(response) => {
                self.messages.push(Message::assistant(response.ai_response));
                self.persisted_transcript = response.updated_conversation_history;
                host.persist_transcript(&self.persisted_transcript);
                tracing::debug!(request_id, "turn committed");
            }
            Err(error) => {
                tracing::warn!(request_id, %error, "turn failed; persisted transcript unchanged");
                self.messages.push(Message::assistant_error(TURN_FAILURE_TEXT));
            }
        }

        self.phase = Phase::Ready;
    }

    // Nothing is persisted, so the next launch retries the opening.
    fn fail_opening(&mut self) {
        self.messages = vec![Message::assistant_error(OPENING_FAILURE_TEXT)];
        self.phase = Phase::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullHost {
        next_request_id: RequestId,
    }

    impl SessionHost for NullHost {
        fn begin_session(&mut self) -> Result<RequestId, String> {
            self.next_request_id += 1;
            Ok(self.next_request_id)
        }

        fn continue_session(&mut self, _request: ContinueRequest) -> Result<RequestId, String> {
            self.next_request_id += 1;
            Ok(self.next_request_id)
        }

        fn persist_transcript(&mut self, _transcript: &str) {}
    }

    #[test]
    fn new_session_is_unmounted_and_idle() {
        let session = Session::new();

        assert_eq!(session.phase(), Phase::Uninitialized);
        assert!(!session.is_mounted());
        assert!(!session.is_pending());
        assert!(session.messages().is_empty());
        assert_eq!(session.indicator(), None);
    }

    #[test]
    fn indicator_prepares_while_opening_is_outstanding() {
        let mut session = Session::new();
        let mut host = NullHost::default();

        session.mount(StoredTranscript::Absent, &mut host);

        assert_eq!(session.indicator(), Some(Indicator::Preparing));
        assert_eq!(
            Indicator::Preparing.text(),
            "The Sage is preparing their wisdom..."
        );
    }

    #[test]
    fn indicator_contemplates_after_user_turn() {
        let mut session = Session::new();
        let mut host = NullHost::default();
        session.mount(Some("AI: hi".to_string()), &mut host);

        session.submit("question", &mut host);

        assert_eq!(session.indicator(), Some(Indicator::Contemplating));
        assert_eq!(
            Indicator::Contemplating.text(),
            "The Sage is contemplating..."
        );
    }

    #[test]
    fn indicator_clears_when_turn_completes() {
        let mut session = Session::new();
        let mut host = NullHost::default();
        session.mount(Some("AI: hi".to_string()), &mut host);
        let SubmitOutcome::Sent { request_id } = session.submit("question", &mut host) else {
            panic!("submission should be sent");
        };

        session.on_turn_completed(
            request_id,
            Ok(ContinueResponse::new("answer", "AI: hi\nUser: question\nAI: answer")),
            &mut host,
        );

        assert_eq!(session.indicator(), None);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut session = Session::new();
        let mut host = NullHost::default();
        session.mount(Some("AI: hi".to_string()), &mut host);
        let SubmitOutcome::Sent { request_id } = session.submit("question", &mut host) else {
            panic!("submission should be sent");
        };

        session.on_turn_completed(
            request_id + 100,
            Ok(ContinueResponse::new("wrong", "AI: wrong")),
            &mut host,
        );

        assert!(session.is_pending());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.persisted_transcript(), "AI: hi");
    }
}
