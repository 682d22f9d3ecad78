use async_trait::async_trait;
use echolink_core::EchoLinkResult;
use serde::{Deserialize, Serialize};

/// One message read back from a direct channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    /// Platform timestamp, when the platform provides one.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Whether the message was posted by the agent's own bot user.
    #[serde(default)]
    pub from_agent: bool,
}

impl ChatMessage {
    pub fn from_professional(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
            from_agent: false,
        }
    }

    pub fn from_agent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
            from_agent: true,
        }
    }
}

/// Chat platform operations the outreach loop depends on.
#[async_trait]
pub trait ChatClient: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve a workspace user from their email. `Ok(None)` when no such user exists.
    async fn lookup_user_id_by_email(&self, email: &str) -> EchoLinkResult<Option<String>>;

    /// Open (or reuse) the direct channel with a user and return its id.
    async fn open_direct_channel(&self, user_id: &str) -> EchoLinkResult<String>;

    async fn post_message(&self, channel_id: &str, text: &str) -> EchoLinkResult<()>;

    /// Up to `limit` most recent messages, newest first.
    ///
    /// Transient failures are retried inside the client; `None` means no data
    /// could be obtained this time.
    async fn fetch_latest_messages(&self, channel_id: &str, limit: usize)
        -> Option<Vec<ChatMessage>>;
}
