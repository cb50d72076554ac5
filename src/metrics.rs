// src/metrics.rs
// Prometheus metrics for retried operations and form validation

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Instant;

use crate::retry::RetryObserver;
use crate::validation::ValidationResult;

/// Retry executor metrics, labelled by operation name
#[derive(Clone)]
pub struct RetryMetrics {
    pub retry_attempts_total: IntCounterVec,
    pub retry_outcomes_total: IntCounterVec,
    pub retry_operation_duration_seconds: HistogramVec,
}

impl RetryMetrics {
    pub fn new(registry: &Registry, namespace: &str) -> Result<Self, prometheus::Error> {
        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Total number of scheduled retries")
                .namespace(namespace),
            &["operation"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        let retry_outcomes_total = IntCounterVec::new(
            Opts::new("retry_outcomes_total", "Final outcome of retried operations")
                .namespace(namespace),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(retry_outcomes_total.clone()))?;

        let retry_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "retry_operation_duration_seconds",
                "Wall time of a retried operation including backoff",
            )
            .namespace(namespace)
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0]),
            &["operation"],
        )?;
        registry.register(Box::new(retry_operation_duration_seconds.clone()))?;

        Ok(Self {
            retry_attempts_total,
            retry_outcomes_total,
            retry_operation_duration_seconds,
        })
    }

    /// Observer that counts retries for `operation`
    pub fn observer(&self, operation: &str) -> RetryMetricsObserver {
        RetryMetricsObserver {
            retries: self.retry_attempts_total.clone(),
            operation: operation.to_string(),
        }
    }

    /// Record how a retried operation ended ("success" or "failure")
    pub fn record_outcome(&self, operation: &str, outcome: &str, duration: f64) {
        self.retry_outcomes_total
            .with_label_values(&[operation, outcome])
            .inc();

        self.retry_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration);
    }

    pub fn retries(&self, operation: &str) -> u64 {
        self.retry_attempts_total.with_label_values(&[operation]).get()
    }
}

pub struct RetryMetricsObserver {
    retries: IntCounterVec,
    operation: String,
}

impl RetryObserver for RetryMetricsObserver {
    fn on_retry(&self, _next_attempt: u32, _max_attempts: u32) {
        self.retries.with_label_values(&[self.operation.as_str()]).inc();
    }
}

/// Form validation metrics
#[derive(Clone)]
pub struct ValidationMetrics {
    pub validations_total: IntCounterVec,
}

impl ValidationMetrics {
    pub fn new(registry: &Registry, namespace: &str) -> Result<Self, prometheus::Error> {
        let validations_total = IntCounterVec::new(
            Opts::new("validations_total", "Total number of validation checks")
                .namespace(namespace),
            &["field", "result"],
        )?;
        registry.register(Box::new(validations_total.clone()))?;

        Ok(Self { validations_total })
    }

    pub fn record(&self, field: &str, result: &ValidationResult) {
        let outcome = if result.is_valid { "valid" } else { "invalid" };
        self.validations_total
            .with_label_values(&[field, outcome])
            .inc();
    }
}

/// Timer to measure operation duration
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for MetricsTimer {
    fn default() -> Self {
        Self::new()
    }
}
