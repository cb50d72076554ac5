// src/lib.rs
// Socratica core library - retry, validation and support utilities shared by the tutor

pub mod bounding_box;
pub mod config;
pub mod error;
pub mod error_messages;
pub mod logging;
pub mod measurement;
pub mod metrics;
pub mod network;
pub mod response_validation;
pub mod retry;
pub mod stuck_detection;
pub mod validation;

// Re-export commonly used items
pub use retry::{
    calculate_retry_delay, format_retry_message, is_retryable_error, is_retryable_message,
    retry_with_backoff, retry_with_backoff_config, wait_for_retry, NoopObserver, RetryConfig,
    RetryObserver, DEFAULT_RETRY_CONFIG,
};
pub use validation::{
    is_empty, is_whitespace_only, meets_min_length, validate_image_upload, validate_message,
    validate_problem_text, ValidationError, ValidationResult,
};
pub use error::{ConfigError, ErrorResponse, TutorError};
pub use error_messages::{
    detect_error_type, error_info, format_error, format_error_message, user_friendly_error,
    ErrorInfo, ErrorType,
};
pub use logging::{
    generate_request_id, init_console_logging, init_logging, LogContext, TracingObserver,
};
pub use config::{AppConfig, Environment, LogFormat, LoggingConfig};
pub use metrics::{MetricsTimer, RetryMetrics, ValidationMetrics};
pub use measurement::{calculate_angle, calculate_distance, format_angle, format_distance, Point};
pub use bounding_box::{calculate_bounding_box, BoundingBox, ElementShape, WhiteboardElement};
pub use network::{NetworkMonitor, NetworkStatus};
pub use response_validation::{
    evaluate_response_correctness, validate_mathematical_expression, CorrectnessLevel,
    ExpressionError, ResponseEvaluation,
};
pub use stuck_detection::{
    analyze_conversation, calculate_hint_level, detect_confusion, track_stuck_state, ChatMessage,
    MessageRole, StuckState,
};
