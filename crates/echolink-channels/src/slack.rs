use crate::chat::{ChatClient, ChatMessage};
use async_trait::async_trait;
use echolink_core::{compute_backoff, EchoLinkError, EchoLinkResult, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Type alias for the injectable sleep function used in tests.
#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Slack Web API client for direct-message outreach.
///
/// Looks users up by email, opens direct channels, posts messages and reads
/// channel history. History reads retry transient failures with exponential
/// backoff; every other call fails fast.
pub struct SlackChannel {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
    fetch_policy: RetryPolicy,
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

// ── Slack API types ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenConversationRequest<'a> {
    users: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupByEmailResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<SlackUser>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OpenConversationResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<SlackConversation>,
}

#[derive(Debug, Deserialize)]
struct SlackConversation {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackHistoryMessage>,
}

#[derive(Debug, Deserialize)]
struct SlackHistoryMessage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
}

impl From<SlackHistoryMessage> for ChatMessage {
    fn from(m: SlackHistoryMessage) -> Self {
        let from_agent = m.bot_id.is_some() || m.subtype.as_deref() == Some("bot_message");
        ChatMessage {
            text: m.text,
            timestamp: m.ts,
            from_agent,
        }
    }
}

// ── Implementation ──────────────────────────────────────────────────────────

impl SlackChannel {
    /// Create a new `SlackChannel`.
    ///
    /// * `bot_token` – A Slack Bot User OAuth token (`xoxb-...`).
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
            fetch_policy: RetryPolicy::chat_fetch(),
            #[cfg(test)]
            sleep_fn: None,
        }
    }

    /// Point the client at a different API root (e.g. a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_fetch_policy(mut self, policy: RetryPolicy) -> Self {
        self.fetch_policy = policy;
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }

    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }

    /// One `conversations.history` request.
    ///
    /// `Err(true)` marks a transient failure worth retrying, `Err(false)` a
    /// permanent one.
    async fn fetch_once(&self, channel_id: &str, limit: usize) -> Result<Vec<ChatMessage>, bool> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.url("conversations.history"))
            .bearer_auth(&self.bot_token)
            .query(&[("channel", channel_id), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Slack conversations.history transport error");
                true
            })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            warn!(status = %status, "Slack conversations.history transient status");
            return Err(true);
        }
        if !status.is_success() {
            warn!(status = %status, "Slack conversations.history rejected");
            return Err(false);
        }

        let body: HistoryResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Slack conversations.history parse error");
            false
        })?;

        if !body.ok {
            warn!(
                error = body.error.as_deref().unwrap_or_default(),
                "Slack conversations.history failed"
            );
            return Err(false);
        }

        Ok(body.messages.into_iter().map(ChatMessage::from).collect())
    }
}

#[async_trait]
impl ChatClient for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn lookup_user_id_by_email(&self, email: &str) -> EchoLinkResult<Option<String>> {
        let response = self
            .client
            .get(self.url("users.lookupByEmail"))
            .bearer_auth(&self.bot_token)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack lookup error: {e}")))?;

        let body: LookupByEmailResponse = response
            .json()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack parse error: {e}")))?;

        if !body.ok {
            let error = body.error.unwrap_or_default();
            if error == "users_not_found" {
                return Ok(None);
            }
            return Err(EchoLinkError::Channel(format!(
                "Slack users.lookupByEmail failed: {error}"
            )));
        }

        Ok(body.user.map(|u| u.id))
    }

    async fn open_direct_channel(&self, user_id: &str) -> EchoLinkResult<String> {
        let response = self
            .client
            .post(self.url("conversations.open"))
            .bearer_auth(&self.bot_token)
            .json(&OpenConversationRequest { users: user_id })
            .send()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack open error: {e}")))?;

        let body: OpenConversationResponse = response
            .json()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack parse error: {e}")))?;

        if !body.ok {
            return Err(EchoLinkError::Channel(format!(
                "Slack conversations.open failed: {}",
                body.error.unwrap_or_default()
            )));
        }

        body.channel
            .map(|c| c.id)
            .ok_or_else(|| EchoLinkError::Channel("Slack conversations.open returned no channel".into()))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> EchoLinkResult<()> {
        let payload = PostMessageRequest {
            channel: channel_id,
            text,
        };

        let response = self
            .client
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack send error: {e}")))?;

        let body: SlackApiResponse = response
            .json()
            .await
            .map_err(|e| EchoLinkError::Channel(format!("Slack parse error: {e}")))?;

        if !body.ok {
            return Err(EchoLinkError::Channel(format!(
                "Slack chat.postMessage failed: {}",
                body.error.unwrap_or_default()
            )));
        }

        debug!(channel = channel_id, "Slack message posted");
        Ok(())
    }

    async fn fetch_latest_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Option<Vec<ChatMessage>> {
        for attempt in 0..=self.fetch_policy.max_retries {
            match self.fetch_once(channel_id, limit).await {
                Ok(messages) => return Some(messages),
                Err(false) => return None,
                Err(true) if attempt < self.fetch_policy.max_retries => {
                    let delay = compute_backoff(&self.fetch_policy, attempt);
                    info!(attempt, delay_ms = delay, "Retrying Slack history fetch");
                    self.do_sleep(delay).await;
                }
                Err(true) => {}
            }
        }
        warn!(channel = channel_id, "Slack history fetch retries exhausted");
        None
    }
}
