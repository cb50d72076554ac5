// src/validation.rs
// Input validation for problem text, chat messages and image uploads

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("No image file provided.")]
    MissingFile,
    #[error("Invalid file type: {0}. Please upload a JPG, PNG, or WebP image.")]
    InvalidFileType(String),
    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },
    #[error("Image file is empty or corrupted")]
    EmptyFile,
}

/// Outcome of a form check; `error` is set exactly when `is_valid` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::valid(),
            Err(err) => Self::invalid(err.to_string()),
        }
    }
}

pub const MIN_PROBLEM_LENGTH: usize = 3;
pub const MIN_MESSAGE_LENGTH: usize = 1;

// Upload limits
pub const MAX_IMAGE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

// ============================================================================
// PREDICATES
// ============================================================================

pub fn is_empty(text: &str) -> bool {
    text.is_empty()
}

/// True for empty input too, since nothing survives trimming.
pub fn is_whitespace_only(text: &str) -> bool {
    text.trim().is_empty()
}

/// Length is counted in characters after trimming.
pub fn meets_min_length(text: &str, min_length: usize) -> bool {
    text.trim().chars().count() >= min_length
}

// ============================================================================
// MESSAGES
// ============================================================================

pub fn empty_text_error() -> &'static str {
    "Please enter your math problem."
}

pub fn whitespace_only_error() -> &'static str {
    "Please enter a math problem. The input cannot be only spaces."
}

pub fn min_length_error(min_length: usize) -> String {
    format!(
        "Please enter a complete math problem. The input must be at least {} characters long.",
        min_length
    )
}

// ============================================================================
// FORM VALIDATORS
// ============================================================================

/// Validate a math problem typed by the student
pub fn validate_problem_text(text: &str) -> ValidationResult {
    if is_empty(text) {
        return ValidationResult::invalid(empty_text_error());
    }

    if is_whitespace_only(text) {
        return ValidationResult::invalid(whitespace_only_error());
    }

    if !meets_min_length(text, MIN_PROBLEM_LENGTH) {
        return ValidationResult::invalid(min_length_error(MIN_PROBLEM_LENGTH));
    }

    ValidationResult::valid()
}

/// Validate a chat message sent to the tutor
pub fn validate_message(text: &str) -> ValidationResult {
    if is_empty(text) {
        return ValidationResult::invalid("Please enter a message. The input cannot be empty.");
    }

    if is_whitespace_only(text) {
        return ValidationResult::invalid("Please enter a message. The input cannot be only spaces.");
    }

    if !meets_min_length(text, MIN_MESSAGE_LENGTH) {
        return ValidationResult::invalid(format!(
            "Please enter a message. The input must be at least {} character long.",
            MIN_MESSAGE_LENGTH
        ));
    }

    ValidationResult::valid()
}

// ============================================================================
// UPLOAD VALIDATORS
// ============================================================================

/// Validate an image headed for OCR
pub fn validate_image_upload(content_type: Option<&str>, size_bytes: u64) -> Result<(), ValidationError> {
    let content_type = content_type.ok_or(ValidationError::MissingFile)?;
    let normalized = content_type.trim().to_lowercase();

    if !ALLOWED_IMAGE_TYPES.contains(&normalized.as_str()) {
        return Err(ValidationError::InvalidFileType(content_type.to_string()));
    }

    if size_bytes == 0 {
        return Err(ValidationError::EmptyFile);
    }

    if size_bytes > MAX_IMAGE_SIZE_BYTES {
        return Err(ValidationError::FileTooLarge {
            size: size_bytes,
            max: MAX_IMAGE_SIZE_BYTES,
        });
    }

    Ok(())
}

pub fn validate_image_result(content_type: Option<&str>, size_bytes: u64) -> ValidationResult {
    validate_image_upload(content_type, size_bytes).into()
}

// ============================================================================
// TESTS
// ============================================================================
