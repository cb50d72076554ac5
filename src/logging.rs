// src/logging.rs
// Structured logging with correlation IDs for tutor sessions

use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

use crate::config::{LogFormat, LoggingConfig};
use crate::retry::{format_retry_message, RetryObserver};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize structured JSON logging
pub fn init_logging(service_name: &str) {
    init_json(service_name, "info");
}

/// Initialize simple console logging (for development)
pub fn init_console_logging(service_name: &str) {
    init_pretty(service_name, "info");
}

pub fn init_from_config(service_name: &str, config: &LoggingConfig) {
    match config.format {
        LogFormat::Json => init_json(service_name, &config.level),
        LogFormat::Pretty => init_pretty(service_name, &config.level),
    }
}

// try_init: a second initialization (tests, embedding apps) is a no-op
fn init_json(service_name: &str, level: &str) {
    let initialized = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true),
        )
        .try_init()
        .is_ok();

    if initialized {
        info!(service = service_name, "Logging initialized");
    }
}

fn init_pretty(service_name: &str, level: &str) {
    let initialized = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().pretty().with_target(true))
        .try_init()
        .is_ok();

    if initialized {
        info!(service = service_name, "Console logging initialized");
    }
}

/// Generate a correlation ID for request tracing
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Context for structured logging
#[derive(Debug, Clone)]
pub struct LogContext {
    pub request_id: String,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

impl LogContext {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            session_id: None,
            user_id: None,
        }
    }

    pub fn with_session(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_user(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new(generate_request_id())
    }
}

/// Log a scheduled retry
pub fn log_retry_attempt(ctx: &LogContext, operation: &str, next_attempt: u32, max_attempts: u32) {
    warn!(
        request_id = %ctx.request_id,
        session_id = ?ctx.session_id,
        user_id = ?ctx.user_id,
        operation = operation,
        next_attempt = next_attempt,
        max_attempts = max_attempts,
        "{}",
        format_retry_message(next_attempt, max_attempts)
    );
}

/// Log a rejected form field
pub fn log_validation_failure(ctx: &LogContext, field: &str, value: &str, reason: &str) {
    warn!(
        request_id = %ctx.request_id,
        session_id = ?ctx.session_id,
        field = field,
        value = %sanitize_for_logging(value),
        reason = reason,
        "Validation error"
    );
}

/// Log a failed operation
pub fn log_operation_failure(ctx: &LogContext, operation: &str, error: &str) {
    error!(
        request_id = %ctx.request_id,
        session_id = ?ctx.session_id,
        user_id = ?ctx.user_id,
        operation = operation,
        error = error,
        "Operation failed"
    );
}

/// Sanitize sensitive data for logging (redact API keys, tokens, etc.)
pub fn sanitize_for_logging(input: &str) -> String {
    let lower = input.to_lowercase();

    if input.chars().count() > 100 {
        let prefix: String = input.chars().take(20).collect();
        format!("{}...[REDACTED]", prefix)
    } else if ["password", "secret", "token", "api_key", "apikey", "sk-"]
        .iter()
        .any(|marker| lower.contains(marker))
    {
        "[REDACTED]".to_string()
    } else {
        input.to_string()
    }
}

/// Retry observer that writes each scheduled retry to the log.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    ctx: LogContext,
    operation: String,
}

impl TracingObserver {
    pub fn new(ctx: LogContext, operation: impl Into<String>) -> Self {
        Self {
            ctx,
            operation: operation.into(),
        }
    }
}

impl RetryObserver for TracingObserver {
    fn on_retry(&self, next_attempt: u32, max_attempts: u32) {
        log_retry_attempt(&self.ctx, &self.operation, next_attempt, max_attempts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID v4 length
    }

    #[test]
    fn test_log_context_chaining() {
        let ctx = LogContext::new("test-123".to_string())
            .with_session("session-9".to_string())
            .with_user("student-1".to_string());

        assert_eq!(ctx.request_id, "test-123");
        assert_eq!(ctx.session_id, Some("session-9".to_string()));
        assert_eq!(ctx.user_id, Some("student-1".to_string()));
    }

    #[test]
    fn test_log_context_default_has_request_id() {
        let ctx = LogContext::default();
        assert_eq!(ctx.request_id.len(), 36);
        assert!(ctx.session_id.is_none());
    }

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("2x + 3 = 7"), "2x + 3 = 7");
        assert_eq!(sanitize_for_logging("sk-live-abc123"), "[REDACTED]");
        assert_eq!(sanitize_for_logging("my_password"), "[REDACTED]");

        let long = "a".repeat(200);
        let sanitized = sanitize_for_logging(&long);
        assert!(sanitized.ends_with("[REDACTED]"));
        assert!(sanitized.len() < long.len());
    }

    #[test]
    fn test_sanitize_multibyte_does_not_panic() {
        let long = "√".repeat(150);
        assert!(sanitize_for_logging(&long).starts_with("√"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_console_logging("socratica-test");
        init_logging("socratica-test");
    }

    #[test]
    fn test_init_from_config_both_formats() {
        let config = crate::config::AppConfig::default();
        init_from_config("socratica-test", &config.logging);

        let json = LoggingConfig {
            format: LogFormat::Json,
            level: "debug".to_string(),
        };
        init_from_config("socratica-test", &json);
        tracing::debug!("still logging after repeated init");
    }

    #[tokio::test]
    async fn test_tracing_observer_in_retry() {
        let observer = TracingObserver::new(LogContext::default(), "ocr");
        let config = crate::retry::RetryConfig::default().with_delays(0, 0);
        let mut calls = 0;

        let result: Result<u32, String> = crate::retry::retry_with_backoff_config(
            || {
                calls += 1;
                let call = calls;
                async move {
                    if call == 1 {
                        Err("connection reset".to_string())
                    } else {
                        Ok(call)
                    }
                }
            },
            &config,
            &observer,
        )
        .await;

        assert_eq!(result, Ok(2));
    }
}
