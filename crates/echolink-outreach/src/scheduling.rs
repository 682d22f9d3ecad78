use async_trait::async_trait;
use echolink_core::{EchoLinkError, EchoLinkResult};
use serde::Deserialize;
use tracing::debug;

const CALENDLY_API: &str = "https://api.calendly.com";

/// Source of single-use meeting booking links.
#[async_trait]
pub trait SchedulingLinkProvider: Send + Sync {
    async fn create_single_use_booking_link(&self) -> EchoLinkResult<String>;
}

/// Calendly scheduling-links API client.
pub struct CalendlyClient {
    api_key: String,
    event_type_uuid: String,
    api_base: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SchedulingLinkResponse {
    resource: SchedulingLinkResource,
}

#[derive(Debug, Deserialize)]
struct SchedulingLinkResource {
    booking_url: String,
}

impl CalendlyClient {
    pub fn new(api_key: impl Into<String>, event_type_uuid: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            event_type_uuid: event_type_uuid.into(),
            api_base: CALENDLY_API.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// The event type URI links are issued for. Always the canonical API host.
    pub fn owner_uri(&self) -> String {
        format!("{CALENDLY_API}/event_types/{}", self.event_type_uuid)
    }
}

#[async_trait]
impl SchedulingLinkProvider for CalendlyClient {
    async fn create_single_use_booking_link(&self) -> EchoLinkResult<String> {
        let body = serde_json::json!({
            "max_event_count": 1,
            "owner": self.owner_uri(),
            "owner_type": "EventType",
        });

        let resp = self
            .http
            .post(format!("{}/scheduling_links", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EchoLinkError::Scheduling(format!("Calendly request failed: {e}")))?;

        let status = resp.status();
        if status != reqwest::StatusCode::CREATED {
            let text = resp.text().await.unwrap_or_default();
            return Err(EchoLinkError::Scheduling(format!(
                "Calendly returned {status}: {text}"
            )));
        }

        let parsed: SchedulingLinkResponse = resp
            .json()
            .await
            .map_err(|e| EchoLinkError::Scheduling(format!("Calendly parse error: {e}")))?;
        debug!("Calendly booking link created");
        Ok(parsed.resource.booking_url)
    }
}
