use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker appended to every utterance to delimit turns in the history.
/// Stripped before anything is shown on the chat platform.
pub const TURN_TERMINATOR: &str = "<END_OF_TURN>";

/// Append the turn terminator unless the text already ends with it.
pub fn with_terminator(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(TURN_TERMINATOR) {
        trimmed.to_string()
    } else {
        format!("{trimmed} {TURN_TERMINATOR}")
    }
}

/// Remove every trailing turn terminator and surrounding whitespace.
pub fn strip_terminator(text: &str) -> &str {
    let mut out = text.trim();
    while let Some(rest) = out.strip_suffix(TURN_TERMINATOR) {
        out = rest.trim_end();
    }
    out
}

/// Who authored an [`Utterance`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The outreach agent.
    Agent,
    /// The professional being contacted.
    Professional,
}

/// A single turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Unique identifier for this utterance.
    pub id: Uuid,
    /// The author of the utterance.
    pub speaker: Speaker,
    /// The text, stored with the turn terminator appended.
    pub text: String,
    /// UTC timestamp of when the utterance was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    /// Creates a new utterance; the terminator is appended when missing.
    pub fn new(speaker: Speaker, text: impl AsRef<str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            text: with_terminator(text.as_ref()),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new utterance with [`Speaker::Agent`].
    pub fn agent(text: impl AsRef<str>) -> Self {
        Self::new(Speaker::Agent, text)
    }

    /// Creates a new utterance with [`Speaker::Professional`].
    pub fn professional(text: impl AsRef<str>) -> Self {
        Self::new(Speaker::Professional, text)
    }

    /// The text without its terminator.
    pub fn display_text(&self) -> &str {
        strip_terminator(&self.text)
    }
}
