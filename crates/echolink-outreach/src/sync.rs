use crate::policy::{decide, Inbound, TickDecision, TickObservation, TimingPolicy};
use echolink_agent::ConversationEngine;
use echolink_channels::{ChatClient, ChatMessage, TextNormalizer};
use echolink_core::{EchoLinkError, EchoLinkResult};
use echolink_session::{SessionOutcome, Transcript};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Result of one finished outreach conversation.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub transcript: Transcript,
    pub replies_received: u32,
    pub elapsed: Duration,
}

/// Polls a direct channel and drives a [`ConversationEngine`] until the
/// conversation completes, stalls or fails.
///
/// The last message the agent posted is kept as a sentinel: anything in the
/// channel up to and including it has already been seen.
pub struct MessageSyncLoop {
    engine: ConversationEngine,
    chat: Arc<dyn ChatClient>,
    normalizer: Arc<TextNormalizer>,
    policy: TimingPolicy,
    channel_id: String,
}

impl MessageSyncLoop {
    pub fn new(
        engine: ConversationEngine,
        chat: Arc<dyn ChatClient>,
        normalizer: Arc<TextNormalizer>,
        policy: TimingPolicy,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            chat,
            normalizer,
            policy,
            channel_id: channel_id.into(),
        }
    }

    /// Send the opening message and run until an exit outcome is reached.
    pub async fn run(mut self) -> SessionReport {
        let start = Instant::now();
        let mut replies_received = 0u32;

        let mut sentinel = match self.send_next().await {
            Ok(text) => text,
            Err(e) => return self.abort(e, start, replies_received),
        };
        info!(
            session_id = %self.engine.session().id,
            channel = %self.channel_id,
            "Opening message sent"
        );

        loop {
            let elapsed = start.elapsed();

            let inbound = match self.poll(&sentinel).await {
                Some(reply) => {
                    replies_received += 1;
                    debug!(session_id = %self.engine.session().id, reply = %reply, "New reply");
                    self.engine.record_human_turn(&reply);
                    match self.engine.advance_stage().await {
                        Ok(stage) => Inbound::Classified(stage),
                        Err(e) => return self.abort(e, start, replies_received),
                    }
                }
                None => Inbound::Nothing,
            };

            let observation = TickObservation {
                elapsed,
                replies_received,
                inbound,
            };

            match decide(&self.policy, &observation) {
                TickDecision::Continue => {}
                TickDecision::EndUnresponsive => {
                    return self.finish(SessionOutcome::Unresponsive, start, replies_received)
                }
                TickDecision::EndIncomplete => {
                    return self.finish(SessionOutcome::Incomplete, start, replies_received)
                }
                TickDecision::EndCompleted => {
                    return self.finish(SessionOutcome::Completed, start, replies_received)
                }
                TickDecision::SendReply { final_exchange } => {
                    sentinel = match self.send_next().await {
                        Ok(text) => text,
                        Err(e) => return self.abort(e, start, replies_received),
                    };
                    if final_exchange {
                        info!(
                            session_id = %self.engine.session().id,
                            "Hard deadline passed, final reply sent"
                        );
                        return self.finish(SessionOutcome::Incomplete, start, replies_received);
                    }
                }
            }

            tokio::time::sleep(self.policy.poll_interval()).await;
        }
    }

    /// Generate the next agent turn and post it; returns the posted text.
    ///
    /// The turn only enters the history once the post went through.
    async fn send_next(&mut self) -> EchoLinkResult<String> {
        let generated = self.engine.draft().await?;
        self.chat
            .post_message(&self.channel_id, &generated.display)
            .await?;
        self.engine.commit(&generated);
        Ok(generated.display)
    }

    async fn poll(&self, sentinel: &str) -> Option<String> {
        let messages = self
            .chat
            .fetch_latest_messages(&self.channel_id, self.policy.fetch_limit)
            .await?;
        collect_new_reply(&messages, sentinel, &self.normalizer)
    }

    fn finish(self, outcome: SessionOutcome, start: Instant, replies_received: u32) -> SessionReport {
        let elapsed = start.elapsed();
        info!(
            session_id = %self.engine.session().id,
            outcome = outcome.as_str(),
            stage = self.engine.stage().label(),
            replies = replies_received,
            elapsed_secs = elapsed.as_secs(),
            "Conversation ended"
        );
        SessionReport {
            transcript: self.engine.transcript(outcome.clone()),
            outcome,
            replies_received,
            elapsed,
        }
    }

    fn abort(self, err: EchoLinkError, start: Instant, replies_received: u32) -> SessionReport {
        error!(session_id = %self.engine.session().id, error = %err, "Conversation aborted");
        self.finish(
            SessionOutcome::Aborted {
                reason: err.to_string(),
            },
            start,
            replies_received,
        )
    }
}

/// Everything the professional wrote since the agent last spoke, oldest
/// first and joined into one reply.
///
/// `messages` is newest first. The walk stops at the first message that is
/// the sentinel or was posted by the agent.
pub fn collect_new_reply(
    messages: &[ChatMessage],
    sentinel: &str,
    normalizer: &TextNormalizer,
) -> Option<String> {
    let mut fresh: Vec<String> = Vec::new();
    for message in messages {
        let text = normalizer.normalize(&message.text);
        if message.from_agent || text == sentinel {
            break;
        }
        if !text.is_empty() {
            fresh.push(text);
        }
    }

    if fresh.is_empty() {
        return None;
    }
    fresh.reverse();
    Some(fresh.join(" "))
}
