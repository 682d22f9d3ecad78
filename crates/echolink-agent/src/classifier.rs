use crate::llm::LlmClient;
use crate::prompts::stage_analyzer_prompt;
use echolink_core::{EchoLinkResult, Stage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Picks the next conversation stage from the rendered history.
pub struct StageClassifier {
    llm: Arc<LlmClient>,
}

impl StageClassifier {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Classify `history` (one speaker-prefixed line per utterance).
    ///
    /// An empty history is Introduction without asking the model. An answer
    /// that does not name a stage also falls back to Introduction; only a
    /// failed model call is an error.
    pub async fn classify(&self, history: &str) -> EchoLinkResult<Stage> {
        if history.trim().is_empty() {
            return Ok(Stage::Introduction);
        }

        let raw = self.llm.chat(None, &stage_analyzer_prompt(history)).await?;
        match Stage::parse_verdict(&raw) {
            Some(stage) => {
                debug!(verdict = %raw.trim(), stage = stage.label(), "Stage classified");
                Ok(stage)
            }
            None => {
                warn!(verdict = %raw.trim(), "Unusable stage verdict, falling back to Introduction");
                Ok(Stage::Introduction)
            }
        }
    }
}
