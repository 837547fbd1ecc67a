//! Retry helper for calls to unreliable providers

use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

/// Retry configuration: a bounded number of attempts with a fixed pause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: usize,
    /// Pause between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(3, 1000)
    }
}

impl RetryConfig {
    pub fn fixed(max_attempts: usize, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_ms,
        }
    }
}

/// Retry an async operation while `should_retry` accepts the error
///
/// Errors rejected by the predicate are returned immediately.
pub async fn retry_when<F, Fut, T, E, P>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        debug!(
            operation = operation_name,
            attempt = attempt,
            max_attempts = max_attempts,
            "Attempting operation"
        );

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                if attempt >= max_attempts || !should_retry(&error) {
                    error!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %error,
                        "Operation failed, giving up"
                    );
                    return Err(error);
                }

                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    delay_ms = config.delay_ms,
                    "Operation failed, retrying"
                );

                if config.delay_ms > 0 {
                    sleep(Duration::from_millis(config.delay_ms)).await;
                }
            }
        }
    }
}
