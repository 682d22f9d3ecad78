use crate::backends::LlmBackend;
use async_trait::async_trait;
use echolink_core::{compute_backoff, is_retryable, EchoLinkError, EchoLinkResult, RetryPolicy};
use tracing::{info, warn};

/// Type alias for the injectable sleep function used in tests.
#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

/// An `LlmBackend` implementation that wraps multiple backends and performs
/// automatic failover with exponential-backoff retries.
///
/// For each request it tries backends in order. Within each backend it retries
/// up to `max_retries` times for transient (retryable) errors. If all retries
/// on a backend are exhausted, or a non-retryable error is encountered, it
/// moves to the next backend. If every backend fails, the last error is
/// returned.
pub struct FailoverBackend {
    backends: Vec<Box<dyn LlmBackend>>,
    policy: RetryPolicy,
    /// Injectable sleep function for testing (allows skipping real delays).
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

impl FailoverBackend {
    /// Create a new failover backend with the given backends and retry policy.
    pub fn new(backends: Vec<Box<dyn LlmBackend>>, policy: RetryPolicy) -> EchoLinkResult<Self> {
        if backends.is_empty() {
            return Err(EchoLinkError::Config(
                "FailoverBackend requires at least one backend".into(),
            ));
        }
        Ok(Self {
            backends,
            policy,
            #[cfg(test)]
            sleep_fn: None,
        })
    }

    /// Perform a sleep for the given duration in milliseconds.
    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl LlmBackend for FailoverBackend {
    async fn chat(&self, system_prompt: Option<&str>, prompt: &str) -> EchoLinkResult<String> {
        let mut last_err: Option<EchoLinkError> = None;

        for (backend_idx, backend) in self.backends.iter().enumerate() {
            for attempt in 0..=self.policy.max_retries {
                match backend.chat(system_prompt, prompt).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        if !is_retryable(&e) {
                            warn!(
                                backend = backend_idx,
                                attempt,
                                error = %e,
                                "Non-retryable error, moving to next backend"
                            );
                            last_err = Some(e);
                            break;
                        }

                        if attempt < self.policy.max_retries {
                            let delay = compute_backoff(&self.policy, attempt);
                            info!(
                                backend = backend_idx,
                                attempt,
                                delay_ms = delay,
                                error = %e,
                                "Retryable error, backing off"
                            );
                            self.do_sleep(delay).await;
                        }
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| EchoLinkError::Agent("All failover backends exhausted".into())))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
