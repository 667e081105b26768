//! Conversational client for a generation service.
//!
//! ## Layout
//!
//! - [`transcript`]: the flat `User: ` / `AI: ` transcript format.
//! - [`session`]: the pure session state machine and its [`session::SessionHost`] seam.
//! - [`controller`]: worker threads and store writes around a [`session::Session`].
//! - [`repl`]: the `sage-chat` terminal front end.
//!
//! ## Service bootstrap
//!
//! - `SAGE_CHAT_SERVICE=mock` (default) for a local deterministic service
//! - `SAGE_CHAT_SERVICE=http` for the HTTP flow service
//!
//! With `http`, set `SAGE_CHAT_HTTP_CONFIG_PATH` to a JSON file of this shape:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:3400",
//!   "begin_path": "personalizedOnboarding",
//!   "continue_path": "maintainConversationContext",
//!   "timeout_sec": 60,
//!   "max_retries": 2
//! }
//! ```
//!
//! Only `base_url` is required. Unknown JSON fields are rejected.
//!
//! ## Persistence
//!
//! The whole transcript lives under one store key. The service owns the
//! canonical history: the stored value is replaced only by what a successful
//! turn returns, never by locally rendered messages.

pub mod commands;
pub mod config;
pub mod controller;
pub mod logging;
pub mod repl;
pub mod services;
pub mod session;
pub mod transcript;

pub use controller::{SessionController, SessionSnapshot};
pub use session::{
    Indicator, Phase, RequestId, Session, SessionHost, StoredTranscript, SubmitOutcome,
};
pub use transcript::{decode, encode, encode_turn, Message, Speaker, TranscriptScanner};
