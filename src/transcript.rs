//! Flat, line-oriented transcript format.
//!
//! Every turn starts with a speaker marker (`User: ` or `AI: `); further lines
//! of a multi-line turn follow with no marker. Turns are joined with a single
//! `\n` and never separated by blank lines.
//!
//! Decoding is lenient: it never fails, and input it cannot attribute to a
//! turn is dropped. Content lines that themselves start with a marker are
//! read back as new turns; the format has no escaping.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Literal line prefix that opens a turn for this speaker.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::User => "User: ",
            Self::Assistant => "AI: ",
        }
    }

    /// Splits a raw line into the speaker it opens and the remaining content.
    #[must_use]
    pub fn parse_marker(line: &str) -> Option<(Self, &str)> {
        [Self::User, Self::Assistant]
            .into_iter()
            .find_map(|speaker| line.strip_prefix(speaker.marker()).map(|rest| (speaker, rest)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// UI key. Never persisted; reconstructed messages get positional ids.
    pub id: String,
    pub speaker: Speaker,
    pub content: String,
    /// Set on locally synthesized failure notices.
    pub is_error: bool,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::live(Speaker::User, content.into(), false)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::live(Speaker::Assistant, content.into(), false)
    }

    #[must_use]
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::live(Speaker::Assistant, content.into(), true)
    }

    fn live(speaker: Speaker, content: String, is_error: bool) -> Self {
        Self {
            id: format!("live-{}", uuid::Uuid::new_v4()),
            speaker,
            content,
            is_error,
        }
    }

    fn reconstructed(ordinal: usize, speaker: Speaker, content: String) -> Self {
        Self {
            id: format!("hist-{ordinal}"),
            speaker,
            content,
            is_error: false,
        }
    }
}

/// Encodes one turn: the marker, then the content with its embedded newlines.
#[must_use]
pub fn encode_turn(speaker: Speaker, content: &str) -> String {
    format!("{}{content}", speaker.marker())
}

/// Encodes an ordered message list into the flat format.
#[must_use]
pub fn encode(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| encode_turn(message.speaker, &message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reconstructs messages from the flat format.
#[must_use]
pub fn decode(transcript: &str) -> Vec<Message> {
    let mut scanner = TranscriptScanner::default();
    for line in transcript.split('\n') {
        scanner.push_line(line);
    }
    scanner.finish()
}

/// Line-at-a-time decoder state: the speaker of the turn being accumulated and
/// its content lines so far.
#[derive(Debug, Default)]
pub struct TranscriptScanner {
    current: Option<(Speaker, Vec<String>)>,
    decoded: Vec<Message>,
    discarded_lines: usize,
}

impl TranscriptScanner {
    pub fn push_line(&mut self, line: &str) {
        if let Some((speaker, first_line)) = Speaker::parse_marker(line) {
            self.flush();
            self.current = Some((speaker, vec![first_line.to_string()]));
            return;
        }

        match self.current.as_mut() {
            Some((_, lines)) => lines.push(line.to_string()),
            None => self.discarded_lines += 1,
        }
    }

    /// Number of lines dropped because no turn had started yet.
    #[must_use]
    pub fn discarded_lines(&self) -> usize {
        self.discarded_lines
    }

    /// Returns true while a turn is being accumulated.
    #[must_use]
    pub fn in_turn(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn finish(mut self) -> Vec<Message> {
        self.flush();
        if self.discarded_lines > 0 {
            tracing::debug!(
                discarded = self.discarded_lines,
                "transcript lines without an owning turn were dropped"
            );
        }
        self.decoded
    }

    fn flush(&mut self) {
        if let Some((speaker, lines)) = self.current.take() {
            let ordinal = self.decoded.len();
            self.decoded
                .push(Message::reconstructed(ordinal, speaker, lines.join("\n")));
        }
    }
}
