//! Pattern-table fallback classifier.
//!
//! The policy lives in data: two ordered lists of phrasings, compiled once on
//! first use. `is_lazy` and `is_learning` are independent -- a prompt can
//! match both tables, or neither.

use std::sync::OnceLock;

use regex_lite::Regex;

use super::PromptAnalysis;

/// Phrasings that ask the model to do the work.
const LAZY_PATTERNS: &[&str] = &[
    r"(?i)solve this",
    r"(?i)write code for",
    r"(?i)fix this code",
    r"(?i)code solution",
    r"(?i)do this for me",
    r"(?i)what's the answer",
    r"(?i)answer this question",
    r"(?i)help me with this assignment",
    r"(?i)complete this for me",
    r"(?i)write a program",
    r"(?i)write me a",
    r"(?i)give me a",
    r"(?i)create a",
];

/// Phrasings that ask to understand.
const LEARNING_PATTERNS: &[&str] = &[
    r"(?i)explain the concept",
    r"(?i)help me understand",
    r"(?i)what are the principles",
    r"(?i)how does this work",
    r"(?i)why does this happen",
];

static LAZY: OnceLock<Vec<Regex>> = OnceLock::new();
static LEARNING: OnceLock<Vec<Regex>> = OnceLock::new();

fn matches_any(
    patterns: &'static [&'static str],
    cache: &'static OnceLock<Vec<Regex>>,
    text: &str,
) -> bool {
    cache
        .get_or_init(|| patterns.iter().filter_map(|p| Regex::new(p).ok()).collect())
        .iter()
        .any(|re| re.is_match(text))
}

/// Classify without network access.
pub fn classify(prompt: &str) -> PromptAnalysis {
    let is_lazy = matches_any(LAZY_PATTERNS, &LAZY, prompt);
    let is_learning = matches_any(LEARNING_PATTERNS, &LEARNING, prompt);
    PromptAnalysis {
        is_lazy,
        is_learning,
        reason: if is_lazy {
            "Pattern matched with lazy usage".to_string()
        } else {
            "No lazy patterns detected".to_string()
        },
        suggested_prompt: None,
    }
}
