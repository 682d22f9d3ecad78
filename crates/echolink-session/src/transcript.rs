use chrono::{DateTime, Utc};
use echolink_core::{Speaker, Stage, Utterance};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SessionOutcome
// ---------------------------------------------------------------------------

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The conversation reached EndConversation.
    Completed,
    /// The professional never replied before the unresponsive threshold.
    Unresponsive,
    /// The professional replied at least once, then went quiet or ran past
    /// the final-exchange deadline.
    Incomplete,
    /// A model or chat call failed and the session was abandoned.
    Aborted { reason: String },
}

impl SessionOutcome {
    /// Stable tag used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Unresponsive => "unresponsive",
            SessionOutcome::Incomplete => "incomplete",
            SessionOutcome::Aborted { .. } => "aborted",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Aborted { reason } => write!(f, "aborted ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Frozen copy of a session's history, captured when the sync loop exits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: Uuid,
    pub professional_email: String,
    pub professional_name: String,
    pub agent_name: String,
    pub final_stage: Stage,
    pub outcome: SessionOutcome,
    pub utterances: Vec<Utterance>,
    pub captured_at: DateTime<Utc>,
}

impl Transcript {
    /// Each turn as `"<speaker name> - <text>"`, terminator stripped.
    pub fn labelled_lines(&self) -> Vec<(Speaker, String)> {
        self.utterances
            .iter()
            .map(|u| {
                let name = match u.speaker {
                    Speaker::Agent => self.agent_name.as_str(),
                    Speaker::Professional => self.professional_name.as_str(),
                };
                (u.speaker, format!("{name} - {}", u.display_text()))
            })
            .collect()
    }

    pub fn professional_turns(&self) -> usize {
        self.utterances
            .iter()
            .filter(|u| u.speaker == Speaker::Professional)
            .count()
    }
}
