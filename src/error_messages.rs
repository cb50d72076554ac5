// src/error_messages.rs
// Turns technical failures into messages a student can act on

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    NetworkError,
    ValidationError,
    ApiError,
    OcrError,
    FileError,
    SystemError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NetworkError => "NETWORK_ERROR",
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::ApiError => "API_ERROR",
            ErrorType::OcrError => "OCR_ERROR",
            ErrorType::FileError => "FILE_ERROR",
            ErrorType::SystemError => "SYSTEM_ERROR",
        }
    }

    /// Network, API and OCR failures are worth offering a retry for.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorType::NetworkError | ErrorType::ApiError | ErrorType::OcrError
        )
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod messages {
    pub mod network {
        pub const GENERIC: &str =
            "We're having trouble connecting. Please check your internet connection and try again.";
        pub const TIMEOUT: &str =
            "The request took too long. Please check your connection and try again.";
        pub const OFFLINE: &str =
            "You appear to be offline. Please check your internet connection and try again.";
        pub const RETRY: &str = "Connection failed. Please try again.";
    }

    pub mod api {
        pub const GENERIC: &str = "We couldn't process your request. Please try again.";
        pub const RATE_LIMIT: &str =
            "You're sending messages too quickly. Please wait a moment and try again.";
        pub const SERVER_ERROR: &str =
            "The service is temporarily unavailable. Please try again in a moment.";
        pub const UNAUTHORIZED: &str =
            "There was an authentication issue. Please refresh the page and try again.";
    }

    pub mod validation {
        pub const EMPTY: &str = "Please enter your message or problem.";
        pub const WHITESPACE_ONLY: &str = "Please enter some text (not just spaces).";
        pub const TOO_SHORT: &str = "Please enter a complete message or problem.";
    }

    pub mod ocr {
        pub const GENERIC: &str = "We couldn't read text from your image. Please try a clearer photo or type your problem directly.";
        pub const NO_TEXT: &str = "No text was found in your image. Please try a clearer photo or type your problem directly.";
        pub const RATE_LIMIT: &str =
            "You're uploading images too quickly. Please wait a moment and try again.";
        pub const FILE_TOO_LARGE: &str =
            "Your image is too large. Please use an image smaller than 10MB.";
        pub const INVALID_FORMAT: &str = "Please upload a JPG, PNG, or WebP image.";
    }

    pub mod file {
        pub const INVALID_TYPE: &str = "Please upload a JPG, PNG, or WebP image.";
        pub const TOO_LARGE: &str =
            "Your image is too large. Please choose a smaller image (under 10MB).";
        pub const CORRUPTED: &str =
            "The image file appears to be corrupted. Please try a different image.";
    }

    pub mod system {
        pub const GENERIC: &str = "Something went wrong. Please try again or refresh the page.";
    }
}

/// Everything a UI needs to render a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    pub action: String,
    pub retryable: bool,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Classify a raw failure message. Rules are checked in order, first match wins.
pub fn detect_error_type(error_message: &str) -> ErrorType {
    let lower = error_message.to_lowercase();

    if contains_any(&lower, &["network", "connection", "fetch", "timeout", "offline"]) {
        ErrorType::NetworkError
    } else if contains_any(&lower, &["api", "500", "503", "502", "rate limit", "429"]) {
        ErrorType::ApiError
    } else if contains_any(&lower, &["ocr", "image", "extract", "read text"]) {
        ErrorType::OcrError
    } else if contains_any(&lower, &["file", "upload", "size", "format", "corrupted"]) {
        ErrorType::FileError
    } else if contains_any(&lower, &["validation", "invalid", "empty", "required"]) {
        ErrorType::ValidationError
    } else {
        ErrorType::SystemError
    }
}

pub fn user_friendly_error(error_type: ErrorType, original_message: Option<&str>) -> &'static str {
    let original = original_message.unwrap_or_default();
    let lower = original.to_lowercase();

    match error_type {
        ErrorType::NetworkError => {
            if lower.contains("timeout") {
                messages::network::TIMEOUT
            } else if lower.contains("offline") {
                messages::network::OFFLINE
            } else {
                messages::network::GENERIC
            }
        }
        ErrorType::ApiError => {
            if contains_any(&lower, &["rate limit", "too many requests"]) || original.contains("429") {
                messages::api::RATE_LIMIT
            } else if contains_any(original, &["500", "503", "502"]) {
                messages::api::SERVER_ERROR
            } else if contains_any(original, &["401", "403"]) {
                messages::api::UNAUTHORIZED
            } else {
                messages::api::GENERIC
            }
        }
        ErrorType::OcrError => {
            if lower.contains("no text") {
                messages::ocr::NO_TEXT
            } else if lower.contains("rate limit") || original.contains("429") {
                messages::ocr::RATE_LIMIT
            } else if contains_any(&lower, &["too large", "size"]) {
                messages::ocr::FILE_TOO_LARGE
            } else if contains_any(&lower, &["format", "unsupported"]) {
                messages::ocr::INVALID_FORMAT
            } else {
                messages::ocr::GENERIC
            }
        }
        ErrorType::FileError => {
            if contains_any(&lower, &["size", "too large"]) {
                messages::file::TOO_LARGE
            } else if contains_any(&lower, &["type", "format"]) {
                messages::file::INVALID_TYPE
            } else if contains_any(&lower, &["corrupted", "invalid"]) {
                messages::file::CORRUPTED
            } else {
                messages::file::INVALID_TYPE
            }
        }
        ErrorType::ValidationError => {
            if lower.contains("empty") {
                messages::validation::EMPTY
            } else if contains_any(&lower, &["whitespace", "spaces"]) {
                messages::validation::WHITESPACE_ONLY
            } else if contains_any(&lower, &["short", "length"]) {
                messages::validation::TOO_SHORT
            } else {
                messages::validation::EMPTY
            }
        }
        ErrorType::SystemError => messages::system::GENERIC,
    }
}

/// Heuristic for strings that were already written for the student.
fn reads_as_user_facing(message: &str) -> bool {
    if message.starts_with("Please") || message.starts_with("We") || message.starts_with("Your") {
        return true;
    }

    let lower = message.to_lowercase();
    message.chars().count() > 30
        && !contains_any(message, &["API", "500", "404", "fetch", "Failed to"])
        && !contains_any(&lower, &["error", "failed"])
}

/// Format a raw message, passing through text that is already user-facing.
pub fn format_error_message(message: &str, error_type: Option<ErrorType>) -> String {
    if let Some(error_type) = error_type {
        return user_friendly_error(error_type, Some(message)).to_string();
    }

    if reads_as_user_facing(message) {
        return message.to_string();
    }

    user_friendly_error(detect_error_type(message), Some(message)).to_string()
}

/// Format an error value. Unlike raw strings, error values are always rewritten.
pub fn format_error(error: &dyn std::error::Error, error_type: Option<ErrorType>) -> String {
    let message = error.to_string();
    let error_type = error_type.unwrap_or_else(|| detect_error_type(&message));
    user_friendly_error(error_type, Some(&message)).to_string()
}

fn suggested_action(error_type: ErrorType, error_message: &str) -> &'static str {
    let lower = error_message.to_lowercase();

    match error_type {
        ErrorType::NetworkError => "Check your internet connection and try again.",
        ErrorType::ApiError => {
            if error_message.contains("rate limit") || error_message.contains("429") {
                "Wait a moment and try again."
            } else {
                "Please try again in a moment."
            }
        }
        ErrorType::OcrError => "Try a clearer photo or type your problem directly.",
        ErrorType::FileError => {
            if lower.contains("size") {
                "Choose a smaller image (under 10MB)."
            } else if lower.contains("type") {
                "Upload a JPG, PNG, or WebP image."
            } else {
                "Try a different image."
            }
        }
        ErrorType::ValidationError => {
            if lower.contains("empty") {
                "Enter your message or problem."
            } else if lower.contains("short") {
                "Enter a complete message or problem."
            } else {
                "Check your input and try again."
            }
        }
        ErrorType::SystemError => "Please try again or refresh the page.",
    }
}

pub fn error_info(error_message: &str) -> ErrorInfo {
    let error_type = detect_error_type(error_message);

    ErrorInfo {
        error_type,
        message: user_friendly_error(error_type, Some(error_message)).to_string(),
        action: suggested_action(error_type, error_message).to_string(),
        retryable: error_type.is_retryable(),
    }
}
