use crate::transcript::{SessionOutcome, Transcript};
use chrono::{DateTime, Utc};
use echolink_core::{Persona, Speaker, Stage, Utterance};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of one outreach conversation with one professional.
///
/// The history is append-only: utterances can be pushed but never edited or
/// removed, except by [`ConversationSession::reset`] at seed time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: Uuid,
    pub professional_email: String,
    pub persona: Persona,
    stage: Stage,
    utterances: Vec<Utterance>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(professional_email: impl Into<String>, persona: Persona) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            professional_email: professional_email.into(),
            persona,
            stage: Stage::Introduction,
            utterances: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Back to Introduction with an empty history.
    pub fn reset(&mut self) {
        self.stage = Stage::Introduction;
        self.utterances.clear();
        self.updated_at = Utc::now();
    }

    pub fn push(&mut self, utterance: Utterance) {
        self.updated_at = Utc::now();
        self.utterances.push(utterance);
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.updated_at = Utc::now();
        self.stage = stage;
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn message_count(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Number of turns authored by the professional.
    pub fn professional_turns(&self) -> usize {
        self.utterances
            .iter()
            .filter(|u| u.speaker == Speaker::Professional)
            .count()
    }

    /// Display name for a speaker in this session.
    pub fn speaker_name(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Agent => &self.persona.name,
            Speaker::Professional if self.persona.professional_name.is_empty() => "Professional",
            Speaker::Professional => &self.persona.professional_name,
        }
    }

    /// The whole history as one block, one `Name: text` line per turn.
    pub fn render_history(&self) -> String {
        self.utterances
            .iter()
            .map(|u| format!("{}: {}", self.speaker_name(u.speaker), u.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Freeze the session into an immutable [`Transcript`].
    pub fn freeze(&self, outcome: SessionOutcome) -> Transcript {
        Transcript {
            session_id: self.id,
            professional_email: self.professional_email.clone(),
            professional_name: self.persona.professional_name.clone(),
            agent_name: self.persona.name.clone(),
            final_stage: self.stage,
            outcome,
            utterances: self.utterances.clone(),
            captured_at: Utc::now(),
        }
    }
}
