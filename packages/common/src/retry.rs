use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

/// A single retry attempt record.
#[derive(Debug, Clone)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    /// When this attempt occurred.
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded retry budget for a single idempotent step.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u8,
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_ms: 200,
            max_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately, used where waiting buys nothing.
    pub fn immediate(max_attempts: u8) -> Self {
        Self {
            max_attempts,
            base_ms: 0,
            max_ms: 0,
        }
    }
}

/// Returned when every attempt allowed by a [`RetryPolicy`] failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u8,
    pub history: Vec<RetryAttempt>,
    pub last_error: E,
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}

/// Run `op` until it succeeds or the policy's attempts are used up, sleeping
/// with [`calculate_backoff`] between attempts.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut history = Vec::new();
    let mut attempt: u8 = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                history.push(RetryAttempt::new(attempt, err.to_string()));
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        history,
                        last_error: err,
                    });
                }

                let delay = calculate_backoff(attempt, policy.base_ms, policy.max_ms);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, retrying"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
