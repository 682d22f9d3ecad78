use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::failover::FailoverBackend;
use echolink_core::EchoLinkResult;

/// LLM client that dispatches to the configured provider backend.
///
/// The primary backend and any fallback models are always wrapped in a
/// [`FailoverBackend`]; without a configured `retry_policy` the default
/// policy applies.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
}

impl LlmClient {
    pub fn new(config: ModelConfig) -> EchoLinkResult<Self> {
        let policy = config.retry_policy.clone().unwrap_or_default();
        let fallbacks = config.fallback_models.clone();
        let mut backends = vec![backend_for(config)];
        backends.extend(fallbacks.into_iter().map(backend_for));

        Ok(Self {
            backend: Box::new(FailoverBackend::new(backends, policy)?),
        })
    }

    /// Create from a pre-built backend (for custom providers and tests).
    pub fn from_backend(backend: Box<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Single-turn completion.
    pub async fn chat(&self, system_prompt: Option<&str>, prompt: &str) -> EchoLinkResult<String> {
        self.backend.chat(system_prompt, prompt).await
    }
}

fn backend_for(config: ModelConfig) -> Box<dyn LlmBackend> {
    match config.provider {
        LlmProvider::OpenAi | LlmProvider::Azure | LlmProvider::OpenRouter | LlmProvider::Groq => {
            Box::new(OpenAiBackend::new(config))
        }
    }
}
