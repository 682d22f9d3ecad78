pub mod openai;

use echolink_core::EchoLinkResult;
use async_trait::async_trait;

/// Trait for LLM provider backends.
///
/// Every provider EchoLink talks to speaks the OpenAI chat-completions
/// dialect, so a single implementation covers them; the trait exists so the
/// failover wrapper and test doubles can stand in for it.
///
/// To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `LlmBackend` for your struct
/// 3. Add the variant to `LlmProvider` enum in `config.rs`
/// 4. Wire it up in `LlmClient::new()` in `llm.rs`
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Single-turn completion: an optional system prompt plus one user
    /// prompt, answered with the model's raw text.
    async fn chat(&self, system_prompt: Option<&str>, prompt: &str) -> EchoLinkResult<String>;
}
