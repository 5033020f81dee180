//! Retry logic with exponential backoff for embedding API calls.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Base for exponential backoff, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on a single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Add ±25% random jitter to prevent thundering herd.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate delay before a specific retry attempt (0 = first try, no delay).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        // Exponential backoff: base_delay * multiplier^(attempt-1)
        let exponential =
            self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
        let delay_ms = exponential.min(self.max_delay_ms as f64) as u64;

        if self.jitter {
            let jitter_range = delay_ms / 4;
            if jitter_range > 0 {
                let jitter = fastrand::u64(0..jitter_range * 2);
                return Duration::from_millis(delay_ms - jitter_range + jitter);
            }
        }

        Duration::from_millis(delay_ms)
    }
}

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<E> {
    Retryable(E),
    Fatal(E),
}

/// Outcome of a retried operation.
#[derive(Debug, Clone)]
pub struct RetryResult<T, E> {
    pub result: Result<T, E>,
    /// Number of attempts made (1 = first try settled it).
    pub attempts: u32,
}

/// Run `operation` until it succeeds, fails fatally, or retries run out.
pub async fn execute_with_retry_async<T, E, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts: attempt + 1,
                }
            }
            Err(Attempt::Fatal(err)) => {
                return RetryResult {
                    result: Err(err),
                    attempts: attempt + 1,
                }
            }
            Err(Attempt::Retryable(err)) => {
                if attempt >= config.max_retries {
                    return RetryResult {
                        result: Err(err),
                        attempts: attempt + 1,
                    };
                }
                attempt += 1;
                let delay = config.calculate_delay(attempt);
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }
    }
}

/// 429 and 5xx are transient; other statuses are not.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 100);
        assert!(config.jitter);
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let config = RetryConfig {
            base_delay_ms: 100,
            max_delay_ms: 300,
            jitter: false,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(0), Duration::ZERO);
        assert_eq!(config.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(3), Duration::from_millis(300));
        assert_eq!(config.calculate_delay(10), Duration::from_millis(300));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let config = RetryConfig::default();
        for _ in 0..50 {
            let delay = config.calculate_delay(1).as_millis();
            assert!((75..=125).contains(&delay), "delay {delay}");
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = execute_with_retry_async(&RetryConfig::default(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(Attempt::Retryable("503"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.result, Ok("done"));
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_errors_stop_immediately() {
        let result: RetryResult<(), &str> =
            execute_with_retry_async(&RetryConfig::default(), |_| async {
                Err(Attempt::Fatal("401"))
            })
            .await;
        assert_eq!(result.result, Err("401"));
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let config = RetryConfig::default().with_max_retries(2);
        let result: RetryResult<(), &str> =
            execute_with_retry_async(&config, |_| async { Err(Attempt::Retryable("timeout")) })
                .await;
        assert_eq!(result.result, Err("timeout"));
        assert_eq!(result.attempts, 3);
    }
}
