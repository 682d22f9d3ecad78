use crate::classifier::StageClassifier;
use crate::generator::{Generated, ResponseGenerator};
use crate::llm::LlmClient;
use echolink_core::{EchoLinkError, EchoLinkResult, Stage, Utterance};
use echolink_session::{ConversationSession, SessionOutcome, Transcript};
use std::sync::Arc;
use tracing::{debug, info};

/// Stage-driven state machine for one conversation.
///
/// Owns the session; every mutation of stage or history goes through here.
/// A failed model call leaves both untouched.
pub struct ConversationEngine {
    session: ConversationSession,
    classifier: StageClassifier,
    generator: ResponseGenerator,
}

impl ConversationEngine {
    pub fn new(llm: Arc<LlmClient>, session: ConversationSession) -> Self {
        Self {
            session,
            classifier: StageClassifier::new(Arc::clone(&llm)),
            generator: ResponseGenerator::new(llm),
        }
    }

    /// Separate models for classification and generation.
    pub fn with_parts(
        classifier: StageClassifier,
        generator: ResponseGenerator,
        session: ConversationSession,
    ) -> Self {
        Self {
            session,
            classifier,
            generator,
        }
    }

    pub fn seed(&mut self) {
        self.session.reset();
        debug!(session_id = %self.session.id, "Conversation seeded");
    }

    pub fn record_human_turn(&mut self, text: &str) {
        self.session.push(Utterance::professional(text));
    }

    /// Re-classify the history and move to the resulting stage.
    pub async fn advance_stage(&mut self) -> EchoLinkResult<Stage> {
        let current = self.session.stage();
        if current.is_terminal() {
            return Ok(current);
        }

        let next = self
            .classifier
            .classify(&self.session.render_history())
            .await?;
        if next != current {
            info!(
                session_id = %self.session.id,
                from = current.label(),
                to = next.label(),
                "Conversation stage changed"
            );
        }
        self.session.set_stage(next);
        Ok(next)
    }

    /// Generate and record the agent's next turn; returns its display text.
    pub async fn step(&mut self) -> EchoLinkResult<String> {
        let generated = self.draft().await?;
        self.commit(&generated);
        Ok(generated.display)
    }

    /// Generate the agent's next turn without recording it.
    ///
    /// Pair with [`commit`](Self::commit) once the turn has actually been
    /// delivered.
    pub async fn draft(&self) -> EchoLinkResult<Generated> {
        let stage = self.session.stage();
        if stage.is_terminal() {
            return Err(EchoLinkError::Agent(
                "Conversation has ended; no further turns are generated".into(),
            ));
        }

        self.generator
            .generate(&self.session.render_history(), stage, &self.session.persona)
            .await
    }

    /// Append a drafted turn to the history.
    pub fn commit(&mut self, generated: &Generated) {
        self.session.push(Utterance::agent(&generated.stored));
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn history(&self) -> &[Utterance] {
        self.session.utterances()
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn transcript(&self, outcome: SessionOutcome) -> Transcript {
        self.session.freeze(outcome)
    }
}
