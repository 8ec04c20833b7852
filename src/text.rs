//! Text cleaning and the lexical predicates shared by title and heading rules

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines made only of digits, dots and whitespace ("3", "2.1.", "  12  ")
static PAGE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s.]+$").unwrap());

/// Trim the text and strip any trailing run of `:`, `-`, `.` and whitespace
///
/// `"Conclusion :-- "` becomes `"Conclusion"`. Cleaning a clean string is a no-op.
pub fn clean_text(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, ':' | '-' | '.') || c.is_whitespace())
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Exact match of the lowercased text against the ignore list
///
/// This is equality, not containment: "Introduction" matches, "Introduction
/// to Systems" does not.
pub fn is_ignored<S: AsRef<str>>(text: &str, ignore_words: &[S]) -> bool {
    let lower = text.to_lowercase();
    ignore_words
        .iter()
        .any(|word| word.as_ref().to_lowercase() == lower)
}

/// Page-number-like text: nothing but digits, dots and whitespace
pub fn is_page_number(text: &str) -> bool {
    PAGE_NUMBER_RE.is_match(text)
}

/// Body-text heuristic: sentences end in `.`, `:` or `;`
pub fn has_trailing_punctuation(text: &str) -> bool {
    text.ends_with(['.', ':', ';'])
}
