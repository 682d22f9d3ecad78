use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed identity and purpose strings for one outreach session.
///
/// `purpose` and `talking_points` arrive already interpolated; nothing in
/// the engine re-derives them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    /// The agent's first name.
    pub name: String,
    /// The agent's role, e.g. what it promotes.
    pub role: String,
    /// The team the agent speaks for.
    pub team: String,
    /// Medium of contact, e.g. "chat".
    pub conversation_type: String,
    /// First name of the professional being contacted.
    pub professional_name: String,
    /// What the conversation should achieve.
    pub purpose: String,
    /// Product facts and resource links the agent may quote.
    #[serde(default)]
    pub talking_points: String,
    /// Extra instruction per stage number, appended to that stage's
    /// description when the agent speaks in it.
    #[serde(default)]
    pub stage_notes: BTreeMap<u8, String>,
}

impl Persona {
    /// The configured note for `stage`, if any and not blank.
    pub fn note_for(&self, stage: Stage) -> Option<&str> {
        self.stage_notes
            .get(&stage.number())
            .map(|note| note.trim())
            .filter(|note| !note.is_empty())
    }
}
