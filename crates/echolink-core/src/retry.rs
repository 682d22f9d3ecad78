use crate::error::EchoLinkError;
use serde::{Deserialize, Serialize};

/// Configures bounded exponential-backoff retries for external calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds; doubled on each retry.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Policy used for chat-history fetches: 5 retries starting at 2 s.
    pub fn chat_fetch() -> Self {
        Self {
            max_retries: 5,
            backoff_base_ms: 2_000,
            backoff_max_ms: 120_000,
        }
    }
}

/// Computes the backoff delay for a given attempt using exponential backoff
/// capped at `backoff_max_ms`.
pub fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// Determines whether an error is transient and worth retrying.
///
/// Returns `true` for rate-limit (429), timeout, connection and server
/// errors (5xx). Returns `false` for client errors like 400, which are not
/// expected to succeed on retry.
pub fn is_retryable(err: &EchoLinkError) -> bool {
    let lower = err.to_string().to_lowercase();

    if lower.contains("400") {
        return false;
    }

    lower.contains("429")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("5xx")
        || lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
}
