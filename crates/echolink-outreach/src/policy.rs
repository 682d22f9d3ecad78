use echolink_core::{EchoLinkError, EchoLinkResult, Stage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When to give up on, force-close or keep polling a conversation.
///
/// Thresholds are measured from the moment the opening message was posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPolicy {
    /// No reply at all by this point: abandon as unresponsive.
    #[serde(default = "default_unresponsive_after_secs")]
    pub unresponsive_after_secs: u64,
    /// A reply arriving after this point gets one final answer, then the session ends.
    #[serde(default = "default_hard_deadline_secs")]
    pub hard_deadline_secs: u64,
    /// The professional went quiet mid-conversation for this long: stop.
    #[serde(default = "default_incomplete_after_secs")]
    pub incomplete_after_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How many recent messages each poll reads.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

fn default_unresponsive_after_secs() -> u64 {
    15 * 60
}

fn default_hard_deadline_secs() -> u64 {
    25 * 60
}

fn default_incomplete_after_secs() -> u64 {
    30 * 60
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_fetch_limit() -> usize {
    10
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            unresponsive_after_secs: default_unresponsive_after_secs(),
            hard_deadline_secs: default_hard_deadline_secs(),
            incomplete_after_secs: default_incomplete_after_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

impl TimingPolicy {
    pub fn unresponsive_after(&self) -> Duration {
        Duration::from_secs(self.unresponsive_after_secs)
    }

    pub fn hard_deadline(&self) -> Duration {
        Duration::from_secs(self.hard_deadline_secs)
    }

    pub fn incomplete_after(&self) -> Duration {
        Duration::from_secs(self.incomplete_after_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> EchoLinkResult<()> {
        if self.unresponsive_after_secs > self.hard_deadline_secs
            || self.hard_deadline_secs > self.incomplete_after_secs
        {
            return Err(EchoLinkError::Config(format!(
                "timing thresholds must be ordered: unresponsive_after ({}s) <= hard_deadline ({}s) <= incomplete_after ({}s)",
                self.unresponsive_after_secs, self.hard_deadline_secs, self.incomplete_after_secs
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(EchoLinkError::Config("poll_interval_ms must be > 0".into()));
        }
        if self.fetch_limit == 0 {
            return Err(EchoLinkError::Config("fetch_limit must be > 0".into()));
        }
        Ok(())
    }
}

/// What the latest poll turned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Nothing newer than the agent's last message.
    Nothing,
    /// A new reply was recorded and the conversation re-classified.
    Classified(Stage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickObservation {
    pub elapsed: Duration,
    /// Replies recorded so far, including one arriving this tick.
    pub replies_received: u32,
    pub inbound: Inbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Continue,
    SendReply { final_exchange: bool },
    EndUnresponsive,
    EndIncomplete,
    EndCompleted,
}

/// The whole exit/continue table of the sync loop.
pub fn decide(policy: &TimingPolicy, obs: &TickObservation) -> TickDecision {
    match obs.inbound {
        Inbound::Nothing if obs.replies_received == 0 && obs.elapsed > policy.unresponsive_after() => {
            TickDecision::EndUnresponsive
        }
        Inbound::Nothing if obs.replies_received > 0 && obs.elapsed > policy.incomplete_after() => {
            TickDecision::EndIncomplete
        }
        Inbound::Nothing => TickDecision::Continue,
        Inbound::Classified(stage) if stage.is_terminal() => TickDecision::EndCompleted,
        Inbound::Classified(_) => TickDecision::SendReply {
            final_exchange: obs.elapsed >= policy.hard_deadline(),
        },
    }
}
