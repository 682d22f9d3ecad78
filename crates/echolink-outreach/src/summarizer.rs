use crate::scheduling::SchedulingLinkProvider;
use echolink_agent::prompts::{demo_interest_prompt, summary_prompt};
use echolink_agent::LlmClient;
use echolink_channels::ChatClient;
use echolink_core::EchoLinkResult;
use echolink_memory::{MemoryEntry, MemoryStore};
use echolink_session::Transcript;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const LINK_RULE: &str = "===========================================";
const SUMMARY_OPEN_RULE: &str = "==========";
const SUMMARY_CLOSE_RULE: &str = "===========";

/// Who receives the conversation summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContact {
    pub name: String,
    pub channel_id: String,
}

/// Where and to whom the follow-up messages of one session go.
#[derive(Debug, Clone)]
pub struct FollowUpTarget {
    /// Direct channel with the professional.
    pub channel_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub demo_interest: bool,
    pub booking_link: Option<String>,
    /// `None` when the summary could not be produced or delivered.
    pub summary: Option<String>,
}

/// Post-session follow-up: demo link when wanted, summary to the operator.
pub struct SessionSummarizer {
    llm: Arc<LlmClient>,
    chat: Arc<dyn ChatClient>,
    memory: Arc<dyn MemoryStore>,
    scheduler: Option<Arc<dyn SchedulingLinkProvider>>,
    operator: OperatorContact,
}

impl SessionSummarizer {
    pub fn new(
        llm: Arc<LlmClient>,
        chat: Arc<dyn ChatClient>,
        memory: Arc<dyn MemoryStore>,
        operator: OperatorContact,
    ) -> Self {
        Self {
            llm,
            chat,
            memory,
            scheduler: None,
            operator,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn SchedulingLinkProvider>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Only memory-store failures are returned as errors; model, scheduling
    /// and posting failures are logged and reflected in the report.
    pub async fn summarize(
        &self,
        transcript: &Transcript,
        target: &FollowUpTarget,
    ) -> EchoLinkResult<SummaryReport> {
        for (speaker, line) in transcript.labelled_lines() {
            self.memory
                .insert(MemoryEntry::new(line, Some(speaker), Some(transcript.session_id)))
                .await?;
        }
        let stream = self.memory.render(Some(transcript.session_id)).await?;

        let demo_interest = match self.llm.chat(None, &demo_interest_prompt(&stream)).await {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                warn!(session_id = %transcript.session_id, error = %e, "Demo-interest check failed, assuming no");
                false
            }
        };

        let booking_link = if demo_interest {
            self.send_booking_link(target).await
        } else {
            None
        };

        let summary = self.send_summary(&stream, target).await;

        info!(
            session_id = %transcript.session_id,
            demo_interest,
            link_sent = booking_link.is_some(),
            summary_sent = summary.is_some(),
            "Follow-up finished"
        );

        Ok(SummaryReport {
            demo_interest,
            booking_link,
            summary,
        })
    }

    async fn send_booking_link(&self, target: &FollowUpTarget) -> Option<String> {
        let Some(scheduler) = &self.scheduler else {
            warn!("Demo requested but no scheduling provider is configured");
            return None;
        };

        let url = match scheduler.create_single_use_booking_link().await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Could not create booking link, skipping");
                return None;
            }
        };

        let header = format!(
            "Below is the meeting link for demo {}\n{LINK_RULE}\n",
            target.first_name
        );
        for text in [header.as_str(), url.as_str()] {
            if let Err(e) = self.chat.post_message(&target.channel_id, text).await {
                warn!(error = %e, "Could not post booking link");
                return None;
            }
        }
        Some(url)
    }

    async fn send_summary(&self, stream: &str, target: &FollowUpTarget) -> Option<String> {
        let summary = match self.llm.chat(None, &summary_prompt(stream)).await {
            Ok(s) => s.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Summary generation failed");
                return None;
            }
        };

        let message = format!(
            "Hi {}, Below is the summary conversation happened with {} {}\n{SUMMARY_OPEN_RULE}\n{summary}\n{SUMMARY_CLOSE_RULE}",
            self.operator.name, target.first_name, target.last_name
        );
        match self.chat.post_message(&self.operator.channel_id, &message).await {
            Ok(()) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Could not post summary to operator");
                None
            }
        }
    }
}

/// A demo-interest answer counts as yes only when it is `YES`, ignoring
/// case, surrounding whitespace and trailing periods.
pub fn is_yes(answer: &str) -> bool {
    answer
        .trim()
        .trim_end_matches('.')
        .trim()
        .eq_ignore_ascii_case("yes")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn yes_variants() {
        for answer in ["YES", "yes", " Yes.\n", "YES.."] {
            assert!(is_yes(answer), "{answer:?}");
        }
        for answer in ["NO", "", "Yes, they did", "Y", "maybe"] {
            assert!(!is_yes(answer), "{answer:?}");
        }
    }
}
