// tests/retry_and_validation.rs
// End-to-end checks of the public retry and validation API

use socratica_core::{
    calculate_retry_delay, error_info, retry_with_backoff_config, NoopObserver, validate_message,
    validate_problem_text, ErrorType, RetryConfig, TutorError, ValidationResult,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[test]
fn delay_schedule_matches_default_policy() {
    let config = RetryConfig::new(5, 1000, 8000, 2.0).unwrap();
    let expected = [1000, 2000, 4000, 8000, 8000];

    for (attempt, ms) in (1..=5).zip(expected) {
        assert_eq!(calculate_retry_delay(attempt, &config), Duration::from_millis(ms));
    }
}

#[tokio::test(start_paused = true)]
async fn timeout_twice_then_success() {
    let calls = AtomicU32::new(0);
    let events = Mutex::new(Vec::new());
    let observer = |next: u32, max: u32| events.lock().unwrap().push((next, max));

    let value = retry_with_backoff_config(
        || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call <= 2 {
                    Err(TutorError::Timeout(format!("attempt {}", call)))
                } else {
                    Ok(call * 10)
                }
            }
        },
        &RetryConfig::default(),
        &observer,
    )
    .await
    .unwrap();

    assert_eq!(value, 30);
    assert_eq!(*events.lock().unwrap(), vec![(2, 3), (3, 3)]);
}

#[tokio::test(start_paused = true)]
async fn fatal_error_is_returned_unchanged() {
    let calls = AtomicU32::new(0);
    let original = TutorError::Api { status: 400, message: "invalid input".to_string() };
    let events = Mutex::new(Vec::new());
    let observer = |next: u32, max: u32| events.lock().unwrap().push((next, max));

    let err = retry_with_backoff_config(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            let original = original.clone();
            async move { Err::<(), _>(original) }
        },
        &RetryConfig::default(),
        &observer,
    )
    .await
    .unwrap_err();

    assert_eq!(err, original);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn network_failure_exhausts_attempts() {
    let calls = AtomicU32::new(0);
    let events = Mutex::new(Vec::new());
    let observer = |next: u32, max: u32| events.lock().unwrap().push((next, max));
    let config = RetryConfig::default().with_max_attempts(2);

    let err = retry_with_backoff_config(
        || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<(), _>(TutorError::Network(format!("network error {}", call))) }
        },
        &config,
        &observer,
    )
    .await
    .unwrap_err();

    assert_eq!(err, TutorError::Network("network error 2".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*events.lock().unwrap(), vec![(2, 2)]);

    // The surfaced failure still reads as a retryable network problem
    let info = error_info(&err.to_string());
    assert_eq!(info.error_type, ErrorType::NetworkError);
    assert!(info.retryable);
}

#[tokio::test(start_paused = true)]
async fn concurrent_invocations_are_independent() {
    let config = RetryConfig::default();

    let flaky = async {
        let calls = AtomicU32::new(0);
        retry_with_backoff_config(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        Err("fetch failed".to_string())
                    } else {
                        Ok("flaky")
                    }
                }
            },
            &config,
            &NoopObserver,
        )
        .await
    };
    let steady = retry_with_backoff_config(
        || async { Ok::<_, String>("steady") },
        &config,
        &NoopObserver,
    );

    let (a, b) = tokio::join!(flaky, steady);
    assert_eq!(a, Ok("flaky"));
    assert_eq!(b, Ok("steady"));
}

#[test]
fn problem_text_cases() {
    assert_eq!(
        validate_problem_text(""),
        ValidationResult::invalid("Please enter your math problem.")
    );

    let whitespace = validate_problem_text("   ");
    assert!(!whitespace.is_valid);
    assert!(whitespace.error.unwrap().contains("only spaces"));

    let short = validate_problem_text("ab");
    assert!(!short.is_valid);
    assert!(short.error.unwrap().contains("at least 3 characters"));

    assert_eq!(validate_problem_text("abc"), ValidationResult::valid());
}

#[test]
fn message_accepts_single_character() {
    assert_eq!(validate_message("x"), ValidationResult::valid());
    assert!(!validate_message("").is_valid);
}
