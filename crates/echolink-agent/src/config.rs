use echolink_core::{EchoLinkError, EchoLinkResult, RetryPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    /// Azure OpenAI: deployment-scoped URL, `api-key` header and an
    /// `api-version` query parameter.
    Azure,
    OpenRouter,
    /// Groq cloud inference — OpenAI-compatible API, free tier with rate limits.
    Groq,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: LlmProvider,
    /// Model name, or the deployment name for Azure.
    pub model_id: String,
    #[serde(default)]
    pub api_key: String,
    pub api_base_url: Option<String>,
    /// Azure only.
    pub api_version: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub fallback_models: Vec<ModelConfig>,
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::OpenAi => "https://api.openai.com",
                // Azure endpoints are per-resource; validate() requires api_base_url.
                LlmProvider::Azure => "",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }

    /// Full chat-completions endpoint for this provider.
    pub fn completions_url(&self) -> String {
        match self.provider {
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url(),
                self.model_id,
                self.api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_AZURE_API_VERSION)
            ),
            _ => format!("{}/v1/chat/completions", self.base_url()),
        }
    }

    /// Check that the config can actually reach a provider.
    pub fn validate(&self) -> EchoLinkResult<()> {
        if self.model_id.trim().is_empty() {
            return Err(EchoLinkError::Config("model_id must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(EchoLinkError::Config(format!(
                "missing API key for model '{}'",
                self.model_id
            )));
        }
        if self.provider == LlmProvider::Azure && self.api_base_url.is_none() {
            return Err(EchoLinkError::Config(
                "azure provider requires api_base_url (the resource endpoint)".into(),
            ));
        }
        for fallback in &self.fallback_models {
            fallback.validate()?;
        }
        Ok(())
    }
}
