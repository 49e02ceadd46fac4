//! Claim extraction
//!
//! Successful responses are decomposed into sentence-level statements.
//! Each statement gets a normalized key (case-folded, punctuation removed,
//! whitespace collapsed) that is used only for matching equivalent claims
//! across providers; the original text is kept for display.
//!
//! Extraction is a pure function of the response text, so running it twice
//! over the same response yields the same claims.

use super::outcome::ProviderOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Characters that may trail a terminator and still belong to the sentence
const CLOSING_MARKS: [char; 4] = ['"', '\'', ')', ']'];

const LIST_MARKERS: [&str; 4] = ["- ", "* ", "+ ", "• "];

/// An atomic assertion taken from one provider's response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Statement as written by the provider
    pub text: String,
    pub source_provider_id: String,
    /// Matching key shared by equivalent statements
    pub normalized_key: String,
}

impl Claim {
    /// Build a claim, or None if the statement has no matchable content
    pub fn new(text: impl Into<String>, source_provider_id: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let normalized_key = normalize_key(&text);
        if normalized_key.is_empty() {
            return None;
        }

        Some(Self {
            text,
            source_provider_id: source_provider_id.into(),
            normalized_key,
        })
    }
}

/// Extract the claims of a successful outcome.
///
/// Non-success outcomes and blank responses yield no claims. A statement
/// repeated within the same response is kept once.
pub fn extract_claims(outcome: &ProviderOutcome) -> Vec<Claim> {
    match outcome.success_content() {
        Some(content) => extract_from_text(content, &outcome.provider_id),
        None => Vec::new(),
    }
}

/// Extract claims from raw response text attributed to `provider_id`
pub fn extract_from_text(text: &str, provider_id: &str) -> Vec<Claim> {
    let mut seen = HashSet::new();

    split_statements(text)
        .into_iter()
        .filter_map(|statement| Claim::new(statement, provider_id))
        .filter(|claim| seen.insert(claim.normalized_key.clone()))
        .collect()
}

/// Split text into trimmed sentence-level statements.
///
/// Lines are handled separately so bullet and numbered lists produce one
/// statement per item even without terminal punctuation.
pub fn split_statements(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .flat_map(split_sentences)
        .map(str::to_string)
        .collect()
}

/// Matching key: lowercase alphanumerics separated by single spaces
pub fn normalize_key(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();

    for marker in LIST_MARKERS {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start();
        }
    }

    // Markdown headings
    let heading = trimmed.trim_start_matches('#');
    if heading.len() != trimmed.len() && heading.starts_with(' ') {
        return heading.trim_start();
    }

    // Numbered items: "1. " or "1) "
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(item) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return item.trim_start();
        }
    }

    trimmed
}

fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !SENTENCE_TERMINATORS.contains(&c) {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if SENTENCE_TERMINATORS.contains(&next) || CLOSING_MARKS.contains(&next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        // "3.14" or "example.com" do not end a sentence
        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            sentences.push(&line[start..end]);
            start = end;
        }
    }

    if start < line.len() {
        sentences.push(&line[start..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
