// src/error.rs
// Tagged failure types and standardized error bodies

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error_messages::{user_friendly_error, ErrorType};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: String, message: String) -> Self {
        Self {
            error,
            error_code,
            message,
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

/// Configuration errors surfaced while building a `RetryConfig` or loading `AppConfig`.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid retry config: {0}")]
    InvalidRetryConfig(String),
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),
    #[error("Unknown log format: {0}")]
    UnknownLogFormat(String),
}

/// Failure produced by tutor operations (chat, OCR, persistence calls).
///
/// Every variant keeps the original message text, so the retry executor can
/// still classify the failure by what it says.
#[derive(Debug, Clone, PartialEq)]
pub enum TutorError {
    Network(String),
    Timeout(String),
    Api { status: u16, message: String },
    RateLimited(String),
    Ocr(String),
    File(String),
    Validation(String),
    Internal(String),
}

impl TutorError {
    pub fn error_code(&self) -> String {
        match self {
            TutorError::Network(_) => "network_error".to_string(),
            TutorError::Timeout(_) => "timeout".to_string(),
            TutorError::Api { .. } => "api_error".to_string(),
            TutorError::RateLimited(_) => "rate_limit_exceeded".to_string(),
            TutorError::Ocr(_) => "ocr_error".to_string(),
            TutorError::File(_) => "file_error".to_string(),
            TutorError::Validation(_) => "validation_error".to_string(),
            TutorError::Internal(_) => "internal_error".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            TutorError::Network(msg) => format!("Network error: {}", msg),
            TutorError::Timeout(msg) => format!("Request timeout: {}", msg),
            TutorError::Api { status, message } => format!("API error ({}): {}", status, message),
            TutorError::RateLimited(msg) => format!("Rate limit exceeded: {}", msg),
            TutorError::Ocr(msg) => format!("OCR error: {}", msg),
            TutorError::File(msg) => format!("File error: {}", msg),
            TutorError::Validation(msg) => msg.clone(),
            TutorError::Internal(msg) => format!("Internal error: {}", msg),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            TutorError::Network(_) => 502,
            TutorError::Timeout(_) => 504,
            TutorError::Api { status, .. } => *status,
            TutorError::RateLimited(_) => 429,
            TutorError::Ocr(_) => 422,
            TutorError::File(_) => 400,
            TutorError::Validation(_) => 400,
            TutorError::Internal(_) => 500,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            TutorError::Network(_) | TutorError::Timeout(_) => ErrorType::NetworkError,
            TutorError::Api { .. } | TutorError::RateLimited(_) => ErrorType::ApiError,
            TutorError::Ocr(_) => ErrorType::OcrError,
            TutorError::File(_) => ErrorType::FileError,
            TutorError::Validation(_) => ErrorType::ValidationError,
            TutorError::Internal(_) => ErrorType::SystemError,
        }
    }

    /// Same classification the retry executor applies to any error.
    pub fn is_retryable(&self) -> bool {
        crate::retry::is_retryable_message(&self.message())
    }

    pub fn to_error_response(&self, request_id: Option<String>) -> ErrorResponse {
        let technical = self.message();
        let mut response = ErrorResponse::new(
            technical.clone(),
            self.error_code(),
            user_friendly_error(self.error_type(), Some(&technical)).to_string(),
        );

        if let Some(id) = request_id {
            response = response.with_request_id(id);
        }

        response
    }
}

impl fmt::Display for TutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TutorError {}

impl From<crate::validation::ValidationError> for TutorError {
    fn from(err: crate::validation::ValidationError) -> Self {
        // Upload checks are the only structured validation errors
        TutorError::File(err.to_string())
    }
}

impl From<ConfigError> for TutorError {
    fn from(err: ConfigError) -> Self {
        TutorError::Internal(err.to_string())
    }
}
