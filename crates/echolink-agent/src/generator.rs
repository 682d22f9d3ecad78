use crate::llm::LlmClient;
use crate::prompts::conversation_prompt;
use echolink_core::{with_terminator, EchoLinkError, EchoLinkResult, Persona, Stage, TURN_TERMINATOR};
use std::sync::Arc;

/// One generated agent turn in both of its forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// History form: exactly one trailing turn terminator.
    pub stored: String,
    /// Chat form: terminator stripped, trimmed.
    pub display: String,
}

/// Produces the agent's next utterance for a stage.
pub struct ResponseGenerator {
    llm: Arc<LlmClient>,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        history: &str,
        stage: Stage,
        persona: &Persona,
    ) -> EchoLinkResult<Generated> {
        let prompt = conversation_prompt(persona, stage, history);
        let raw = self.llm.chat(None, &prompt).await?;
        clean_reply(&raw, &persona.name)
    }
}

/// Reduce a raw completion to a single agent utterance.
///
/// Everything after the first terminator is dropped, as is a leading
/// `"<name>:"` the model sometimes echoes from the turn prefix.
pub fn clean_reply(raw: &str, agent_name: &str) -> EchoLinkResult<Generated> {
    let first_turn = raw.split(TURN_TERMINATOR).next().unwrap_or_default().trim();

    let prefix = format!("{agent_name}:");
    let display = first_turn
        .strip_prefix(prefix.as_str())
        .unwrap_or(first_turn)
        .trim();

    if display.is_empty() {
        return Err(EchoLinkError::Agent("Model produced an empty reply".into()));
    }

    Ok(Generated {
        stored: with_terminator(display),
        display: display.to_string(),
    })
}
