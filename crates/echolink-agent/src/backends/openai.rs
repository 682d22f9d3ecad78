use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use echolink_core::{EchoLinkError, EchoLinkResult};
use tracing::debug;

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, Azure OpenAI, OpenRouter, Groq and any other provider
/// that implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(&self, system_prompt: Option<&str>, prompt: &str) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        api_messages.push(serde_json::json!({
            "role": "user",
            "content": prompt
        }));

        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Content-Type", "application/json");

        match self.config.provider {
            LlmProvider::Azure => request.header("api-key", &self.config.api_key),
            // OpenRouter requires extra headers
            LlmProvider::OpenRouter => request
                .bearer_auth(&self.config.api_key)
                .header("HTTP-Referer", "https://github.com/echolink/echolink")
                .header("X-Title", "EchoLink"),
            LlmProvider::OpenAi | LlmProvider::Groq => request.bearer_auth(&self.config.api_key),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(&self, system_prompt: Option<&str>, prompt: &str) -> EchoLinkResult<String> {
        let url = self.config.completions_url();
        let api_messages = self.build_messages(system_prompt, prompt);

        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": api_messages,
        });

        let request = self.add_provider_headers(self.http.post(&url));

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| EchoLinkError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            // Gateways answer 5xx with HTML; keep the status in the message so
            // the failover layer can classify it.
            let text = resp.text().await.unwrap_or_default();
            return Err(EchoLinkError::Http(format!(
                "OpenAI API error {status}: {text}"
            )));
        }

        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| EchoLinkError::Http(e.to_string()))?;

        debug!(model = %self.config.model_id, "Completion received");
        parse_openai_response(&resp_body)
    }
}

/// Pull the assistant text out of a chat-completions response body.
pub fn parse_openai_response(body: &serde_json::Value) -> EchoLinkResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| EchoLinkError::Agent(format!("Completion had no message content: {body}")))
}
