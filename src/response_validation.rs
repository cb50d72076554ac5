// src/response_validation.rs
// Syntax checks for math the student types and a first-pass correctness label

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationResult;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Expression cannot be empty")]
    Empty,
    #[error("Equation must have exactly one equals sign")]
    MultipleEquals,
    #[error("Both sides of equation must have content")]
    MissingSide,
    #[error("Left side of equation: {0}")]
    LeftSide(Box<ExpressionError>),
    #[error("Right side of equation: {0}")]
    RightSide(Box<ExpressionError>),
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Expression contains invalid characters")]
    InvalidCharacters,
    #[error("Expression contains consecutive operators")]
    ConsecutiveOperators,
    #[error("Expression cannot start with an operator")]
    LeadingOperator,
    #[error("Expression cannot end with an operator")]
    TrailingOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectnessLevel {
    Correct,
    Incorrect,
    Partial,
}

/// First-pass label for a student reply. The tutor model refines `Partial`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvaluation {
    pub correctness_level: CorrectnessLevel,
    pub is_valid_expression: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_error: Option<String>,
}

const PARTIAL_PROGRESS_MARKERS: &[&str] =
    &["partially", "getting there", "think", "try", "maybe", "almost", "close"];

const CORRECT_UNDERSTANDING_MARKERS: &[&str] = &["correct", "right", "yes", "equals", "="];

// ============================================================================
// Expression syntax
// ============================================================================

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^')
}

fn is_expression_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_operator(c) || matches!(c, '(' | ')' | '.') || c.is_whitespace()
}

fn has_operator_run(text: &str) -> bool {
    let mut previous_was_operator = false;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        let operator = is_operator(c);
        if operator && previous_was_operator {
            return true;
        }
        previous_was_operator = operator;
    }
    false
}

/// Drops `-<digits>` runs so `3 * -5` is not read as two operators in a row.
fn strip_negative_numbers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '-' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Drops parenthesized negations such as `(-x)`.
fn strip_negative_groups(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '(' && chars.get(i + 1) == Some(&'-') {
            let close = chars[i + 2..].iter().position(|&c| c == ')');
            if let Some(offset) = close.filter(|&offset| offset > 0) {
                i += 2 + offset + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn validate_expression_syntax(expression: &str) -> Result<(), ExpressionError> {
    let mut depth: i32 = 0;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ExpressionError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ExpressionError::UnbalancedParentheses);
    }

    if expression.is_empty() || !expression.chars().all(is_expression_char) {
        return Err(ExpressionError::InvalidCharacters);
    }

    if has_operator_run(expression)
        && has_operator_run(&strip_negative_groups(&strip_negative_numbers(expression)))
    {
        return Err(ExpressionError::ConsecutiveOperators);
    }

    let trimmed = expression.trim();
    let mut chars = trimmed.chars();
    let first = chars.next();
    let negative_number = first == Some('-') && chars.next().is_some_and(|c| c.is_ascii_digit());
    if first.is_some_and(is_operator) && !negative_number {
        return Err(ExpressionError::LeadingOperator);
    }

    if trimmed.chars().last().is_some_and(is_operator) {
        return Err(ExpressionError::TrailingOperator);
    }

    Ok(())
}

/// Check that an expression or single equation is well formed.
///
/// Accepts ASCII letters, digits, `+ - * / ^ ( ) .` and whitespace. An
/// equation must have exactly one `=` with content on both sides.
pub fn validate_mathematical_expression(expression: &str) -> Result<(), ExpressionError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(ExpressionError::Empty);
    }

    if !trimmed.contains('=') {
        return validate_expression_syntax(trimmed);
    }

    let sides: Vec<&str> = trimmed.split('=').map(str::trim).collect();
    let [left, right] = sides.as_slice() else {
        return Err(ExpressionError::MultipleEquals);
    };

    if left.is_empty() || right.is_empty() {
        return Err(ExpressionError::MissingSide);
    }

    validate_expression_syntax(left).map_err(|err| ExpressionError::LeftSide(Box::new(err)))?;
    validate_expression_syntax(right).map_err(|err| ExpressionError::RightSide(Box::new(err)))?;

    Ok(())
}

pub fn expression_validation_result(expression: &str) -> ValidationResult {
    match validate_mathematical_expression(expression) {
        Ok(()) => ValidationResult::valid(),
        Err(err) => ValidationResult::invalid(err.to_string()),
    }
}

// ============================================================================
// Correctness
// ============================================================================

/// Label a reply before the tutor model looks at it.
///
/// Replies with math-looking content and broken syntax are `Incorrect`.
/// Everything else is `Partial` until the model decides otherwise.
pub fn evaluate_response_correctness(response: &str) -> ResponseEvaluation {
    let has_math_content = response
        .chars()
        .any(|c| c.is_ascii_alphanumeric() || is_operator(c) || matches!(c, '=' | '(' | ')'));

    if has_math_content {
        if let Err(err) = validate_mathematical_expression(response) {
            return ResponseEvaluation {
                correctness_level: CorrectnessLevel::Incorrect,
                is_valid_expression: false,
                expression_error: Some(err.to_string()),
            };
        }
    }

    ResponseEvaluation {
        correctness_level: CorrectnessLevel::Partial,
        is_valid_expression: true,
        expression_error: None,
    }
}

pub fn indicates_partial_progress(response: &str) -> bool {
    let lower = response.to_lowercase();
    PARTIAL_PROGRESS_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub fn indicates_correct_understanding(response: &str) -> bool {
    let lower = response.to_lowercase();
    CORRECT_UNDERSTANDING_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_expressions() {
        assert!(validate_mathematical_expression("2x + 3 = 7").is_ok());
        assert!(validate_mathematical_expression("x^2 - 4").is_ok());
        assert!(validate_mathematical_expression("3 * -5").is_ok());
        assert!(validate_mathematical_expression("-3 + x").is_ok());
        assert!(validate_mathematical_expression("2 * (-x)").is_ok());
        assert!(validate_mathematical_expression("(a + b) / 2.5").is_ok());
    }

    #[test]
    fn test_equation_shape() {
        assert_eq!(validate_mathematical_expression("   "), Err(ExpressionError::Empty));
        assert_eq!(
            validate_mathematical_expression("x = 1 = 2"),
            Err(ExpressionError::MultipleEquals)
        );
        assert_eq!(validate_mathematical_expression("= 5"), Err(ExpressionError::MissingSide));
    }

    #[test]
    fn test_side_errors_name_the_side() {
        let err = validate_mathematical_expression("(x + 1 = 2").unwrap_err();
        assert_eq!(err.to_string(), "Left side of equation: Unbalanced parentheses");

        let err = validate_mathematical_expression("x + 1 = 2)").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::RightSide(Box::new(ExpressionError::UnbalancedParentheses))
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            validate_mathematical_expression(")x("),
            Err(ExpressionError::UnbalancedParentheses)
        );
        assert_eq!(
            validate_mathematical_expression("x + $"),
            Err(ExpressionError::InvalidCharacters)
        );
        assert_eq!(
            validate_mathematical_expression("x ++ 1"),
            Err(ExpressionError::ConsecutiveOperators)
        );
        assert_eq!(
            validate_mathematical_expression("* 3"),
            Err(ExpressionError::LeadingOperator)
        );
        assert_eq!(
            validate_mathematical_expression("x +"),
            Err(ExpressionError::TrailingOperator)
        );
    }

    #[test]
    fn test_expression_validation_result() {
        assert_eq!(expression_validation_result("x + 1"), ValidationResult::valid());
        assert_eq!(
            expression_validation_result(""),
            ValidationResult::invalid("Expression cannot be empty")
        );
    }

    #[test]
    fn test_evaluate_response_correctness() {
        let ok = evaluate_response_correctness("x = 4");
        assert_eq!(ok.correctness_level, CorrectnessLevel::Partial);
        assert!(ok.is_valid_expression);

        let broken = evaluate_response_correctness("x = 4!");
        assert_eq!(broken.correctness_level, CorrectnessLevel::Incorrect);
        assert!(!broken.is_valid_expression);
        assert_eq!(
            broken.expression_error.as_deref(),
            Some("Right side of equation: Expression contains invalid characters")
        );

        // Nothing math-like to check
        let ellipsis = evaluate_response_correctness("...");
        assert_eq!(ellipsis.correctness_level, CorrectnessLevel::Partial);
        assert!(ellipsis.is_valid_expression);
    }

    #[test]
    fn test_progress_markers() {
        assert!(indicates_partial_progress("I think it's 5"));
        assert!(indicates_partial_progress("Almost there?"));
        assert!(!indicates_partial_progress("Done."));

        assert!(indicates_correct_understanding("Yes, that's right"));
        assert!(indicates_correct_understanding("x = 3"));
        assert!(!indicates_correct_understanding("no"));
    }

    #[test]
    fn test_evaluation_serialization() {
        let json = serde_json::to_value(evaluate_response_correctness("x = 4")).unwrap();
        assert_eq!(json["correctnessLevel"], "partial");
        assert_eq!(json["isValidExpression"], true);
        assert!(json.get("expressionError").is_none());
    }
}
