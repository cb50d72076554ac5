// src/stuck_detection.rs
// Detects when a student is stuck so the tutor can escalate its hints

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Consecutive confused replies before a student counts as stuck.
pub const STUCK_THRESHOLD: u32 = 2;

pub const MAX_HINT_LEVEL: u8 = 3;

/// Replies shorter than this (in chars) read as confused unless they carry math.
const MIN_MEANINGFUL_LENGTH: usize = 10;

/// Replies longer than this are checked for vague, disengaged wording.
const MAX_VAGUE_LENGTH: usize = 200;

/// Word-set overlap above which a reply counts as a repeated question.
const REPEAT_SIMILARITY: f64 = 0.8;

const REPEAT_WINDOW: usize = 3;

const CONFUSION_PATTERNS: &[&str] = &[
    r"(?i)\b(i don't know|i dont know|idk)\b",
    r"(?i)\b(i'm stuck|im stuck|stuck)\b",
    r"(?i)\b(i'm confused|im confused|confused)\b",
    r"(?i)\b(i don't understand|i dont understand)\b",
    r"(?i)\b(i don't get it|i dont get it)\b",
    r"(?i)\b(what\?|huh\?|i don't see|i dont see)\b",
    r"(?i)\b(i have no idea|no idea|no clue)\b",
    r"(?i)\b(can't figure|cannot figure|can't solve|cannot solve)\b",
    r"(?i)\b(help me|i need help|don't know how|dont know how)\b",
    r"(?i)\b(not sure|unsure|struggling|having trouble)\b",
];

const VAGUE_PATTERN: &str =
    r"(?i)\b(not sure|unsure|confusing|frustrated|struggling|having trouble)\b";

lazy_static! {
    static ref CONFUSION_REGEXES: Vec<Regex> = CONFUSION_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect();
    static ref VAGUE_REGEX: Option<Regex> = Regex::new(VAGUE_PATTERN).ok();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Student,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn student(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Student,
            content: content.into(),
        }
    }

    pub fn tutor(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tutor,
            content: content.into(),
        }
    }
}

/// Running count of confused replies for one conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StuckState {
    pub consecutive_confused: u32,
    pub is_stuck: bool,
    /// Index in the conversation of the latest confused reply
    pub last_confused_index: Option<usize>,
}

impl StuckState {
    pub fn hint_level(&self) -> u8 {
        calculate_hint_level(self.consecutive_confused)
    }
}

/// Hint level for a run of confused replies.
///
/// 0 below the stuck threshold, then 1 for 2-3, 2 for 4-5 and
/// `MAX_HINT_LEVEL` from 6 on.
pub fn calculate_hint_level(consecutive_confused: u32) -> u8 {
    match consecutive_confused {
        0..=1 => 0,
        2..=3 => 1,
        4..=5 => 2,
        _ => MAX_HINT_LEVEL,
    }
}

fn contains_math_content(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | '=' | ')'))
}

fn contains_vague_confusion(text: &str) -> bool {
    VAGUE_REGEX.as_ref().is_some_and(|re| re.is_match(text))
}

fn significant_words(text: &str) -> HashSet<&str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .collect()
}

/// Jaccard similarity of the words longer than two chars, in [0, 1].
fn word_similarity(a: &str, b: &str) -> f64 {
    let words_a = significant_words(a);
    let words_b = significant_words(b);

    match (words_a.is_empty(), words_b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let shared = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    shared as f64 / union as f64
}

fn repeats_recent_question(normalized: &str, history: &[ChatMessage]) -> bool {
    let recent: Vec<String> = history
        .iter()
        .filter(|message| message.role == MessageRole::Student)
        .map(|message| message.content.trim().to_lowercase())
        .collect();

    recent
        .iter()
        .skip(recent.len().saturating_sub(REPEAT_WINDOW))
        .any(|previous| {
            previous.chars().count() > MIN_MEANINGFUL_LENGTH
                && word_similarity(normalized, previous) > REPEAT_SIMILARITY
        })
}

/// Whether a student reply reads as confused.
///
/// Checked in order: empty reply, explicit confusion wording, very short
/// reply without math, a repeat of one of the last three student messages,
/// and long vague replies without math.
pub fn detect_confusion(response: &str, history: &[ChatMessage]) -> bool {
    let normalized = response.trim().to_lowercase();

    if normalized.is_empty() {
        return true;
    }

    if CONFUSION_REGEXES.iter().any(|re| re.is_match(&normalized)) {
        return true;
    }

    let length = normalized.chars().count();
    if length < MIN_MEANINGFUL_LENGTH {
        return !contains_math_content(&normalized);
    }

    if repeats_recent_question(&normalized, history) {
        return true;
    }

    length > MAX_VAGUE_LENGTH
        && contains_vague_confusion(&normalized)
        && !contains_math_content(&normalized)
}

/// Fold one more reply into `current`.
///
/// A confused reply extends the run and records its index (the history
/// length). Any other reply resets the run but keeps the last index.
pub fn track_stuck_state(response: &str, history: &[ChatMessage], current: StuckState) -> StuckState {
    if detect_confusion(response, history) {
        let consecutive_confused = current.consecutive_confused + 1;
        let state = StuckState {
            consecutive_confused,
            is_stuck: consecutive_confused >= STUCK_THRESHOLD,
            last_confused_index: Some(history.len()),
        };
        debug!(
            consecutive_confused,
            is_stuck = state.is_stuck,
            hint_level = state.hint_level(),
            "Student reply reads as confused"
        );
        state
    } else {
        StuckState {
            consecutive_confused: 0,
            is_stuck: false,
            last_confused_index: current.last_confused_index,
        }
    }
}

pub fn is_student_stuck(response: &str, history: &[ChatMessage], current: StuckState) -> bool {
    track_stuck_state(response, history, current).is_stuck
}

pub fn reset_stuck_state() -> StuckState {
    StuckState::default()
}

/// Rebuild the stuck state from a whole conversation.
///
/// Walks student messages from the newest back, counting confused replies
/// until the first clear one.
pub fn analyze_conversation(history: &[ChatMessage]) -> StuckState {
    let mut consecutive_confused = 0;
    let mut last_confused_index = None;

    for (index, message) in history.iter().enumerate().rev() {
        if message.role != MessageRole::Student {
            continue;
        }

        if !detect_confusion(&message.content, &history[..index]) {
            break;
        }

        consecutive_confused += 1;
        if last_confused_index.is_none() {
            last_confused_index = Some(index);
        }
    }

    StuckState {
        consecutive_confused,
        is_stuck: consecutive_confused >= STUCK_THRESHOLD,
        last_confused_index,
    }
}
