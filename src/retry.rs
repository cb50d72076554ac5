// src/retry.rs
// Retry with capped exponential backoff for transient failures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::ConfigError;

/// Substrings (lowercase) that mark a failure as transient.
const RETRYABLE_PATTERNS: &[&str] = &[
    // Network failures
    "network",
    "connection",
    "timeout",
    "fetch",
    // 5xx server errors
    "500",
    "502",
    "503",
    "504",
    // Rate limiting
    "429",
    "rate limit",
];

pub const DEFAULT_RETRY_CONFIG: RetryConfig = RetryConfig {
    max_attempts: 3,
    initial_delay_ms: 1000,
    max_delay_ms: 8000,
    backoff_multiplier: 2.0,
};

/// Deserialization goes through `RawRetryConfig` so every loaded config is
/// validated like one built with `RetryConfig::new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRetryConfig")]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

/// Unchecked wire form; missing fields take the default policy.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRetryConfig {
    max_attempts: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_multiplier: f64,
}

impl Default for RawRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_CONFIG.max_attempts,
            initial_delay_ms: DEFAULT_RETRY_CONFIG.initial_delay_ms,
            max_delay_ms: DEFAULT_RETRY_CONFIG.max_delay_ms,
            backoff_multiplier: DEFAULT_RETRY_CONFIG.backoff_multiplier,
        }
    }
}

impl TryFrom<RawRetryConfig> for RetryConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRetryConfig) -> Result<Self, Self::Error> {
        RetryConfig::new(
            raw.max_attempts,
            raw.initial_delay_ms,
            raw.max_delay_ms,
            raw.backoff_multiplier,
        )
    }
}

impl RetryConfig {
    pub fn new(
        max_attempts: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        backoff_multiplier: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
            backoff_multiplier,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts < 1 {
            return Err(ConfigError::InvalidRetryConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::InvalidRetryConfig(format!(
                "max_delay_ms ({}) must not be below initial_delay_ms ({})",
                self.max_delay_ms, self.initial_delay_ms
            )));
        }

        let multiplier = self.backoff_multiplier;
        if multiplier.is_nan() || multiplier.is_infinite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidRetryConfig(format!(
                "backoff_multiplier must be a finite number >= 1 (got {})",
                self.backoff_multiplier
            )));
        }

        Ok(())
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delays(mut self, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.initial_delay_ms = initial_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        DEFAULT_RETRY_CONFIG
    }
}

/// Receives `(next_attempt, max_attempts)` right before each retry.
///
/// Never called before the first attempt. Plain closures taking two `u32`s
/// implement this trait.
pub trait RetryObserver {
    fn on_retry(&self, next_attempt: u32, max_attempts: u32);
}

impl<F> RetryObserver for F
where
    F: Fn(u32, u32),
{
    fn on_retry(&self, next_attempt: u32, max_attempts: u32) {
        self(next_attempt, max_attempts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RetryObserver for NoopObserver {
    fn on_retry(&self, _next_attempt: u32, _max_attempts: u32) {}
}

/// Delay to wait after a failed `attempt` (1-indexed).
///
/// `min(initial_delay_ms * backoff_multiplier^(attempt - 1), max_delay_ms)`,
/// saturating instead of overflowing for large attempt numbers.
pub fn calculate_retry_delay(attempt: u32, config: &RetryConfig) -> Duration {
    if config.initial_delay_ms == 0 {
        return Duration::ZERO;
    }

    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let uncapped = config.initial_delay_ms as f64 * config.backoff_multiplier.powi(exponent);
    let capped = uncapped.min(config.max_delay_ms as f64);

    Duration::from_millis(capped as u64)
}

/// Suspend the current task for `delay` without blocking the runtime.
pub async fn wait_for_retry(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Message shown while a retry is in flight.
pub fn format_retry_message(attempt: u32, max_attempts: u32) -> String {
    if attempt >= max_attempts {
        format!("Final attempt ({} of {})", max_attempts, max_attempts)
    } else {
        format!("Retrying... (attempt {} of {})", attempt, max_attempts)
    }
}

pub fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

pub fn is_retryable_error<E: fmt::Display + ?Sized>(error: &E) -> bool {
    is_retryable_message(&error.to_string())
}

/// Run `operation` with the default retry policy and no observer.
pub async fn retry_with_backoff<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_with_backoff_config(operation, &DEFAULT_RETRY_CONFIG, &NoopObserver).await
}

/// Run `operation` until it succeeds, fails fatally, or runs out of attempts.
///
/// Failures whose message matches a transient pattern are retried after
/// `calculate_retry_delay(attempt)`; anything else is returned straight
/// away. The final failure is always returned exactly as the operation
/// produced it.
pub async fn retry_with_backoff_config<F, Fut, T, E, O>(
    mut operation: F,
    config: &RetryConfig,
    observer: &O,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    O: RetryObserver + ?Sized,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!(attempt, max_attempts, "Executing attempt");

        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, max_attempts, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= max_attempts {
            error!(attempt, max_attempts, error = %err, "Retry attempts exhausted");
            return Err(err);
        }

        if !is_retryable_error(&err) {
            warn!(attempt, error = %err, "Non-retryable failure, giving up");
            return Err(err);
        }

        observer.on_retry(attempt + 1, max_attempts);

        let delay = calculate_retry_delay(attempt, config);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient failure, retrying"
        );
        wait_for_retry(delay).await;

        attempt += 1;
    }
}
