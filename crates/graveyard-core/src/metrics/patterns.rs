//! Text patterns and lexicons used by the heuristic scorers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of sentence-ending punctuation.
    pub static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]+").unwrap();
}

/// Words that signal deliberate creative framing.
pub const CREATIVE_WORDS: [&str; 10] = [
    "imagine",
    "creative",
    "unique",
    "innovative",
    "original",
    "artistic",
    "inventive",
    "novel",
    "fresh",
    "unusual",
];

/// Phrases that introduce a comparison or analogy.
pub const METAPHOR_INDICATORS: [&str; 4] = ["like", "as if", "similar to", "reminds me of"];

/// Responses shorter than this (after trimming) score the floor value.
pub const MIN_SCORABLE_CHARS: usize = 10;

/// Score assigned to responses too short to judge.
pub const SHORT_RESPONSE_SCORE: f64 = 0.1;

/// Split text into trimmed, non-empty sentences.
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether trimmed text is too short to score.
pub fn is_too_short(text: &str) -> bool {
    text.trim().chars().count() < MIN_SCORABLE_CHARS
}

/// Count lexicon entries appearing anywhere in lower-cased text.
///
/// Substring presence, so "uniquely" counts for "unique".
pub fn count_present(lowered: &str, lexicon: &[&str]) -> usize {
    lexicon.iter().filter(|term| lowered.contains(*term)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_drop_empty_fragments() {
        let parts = sentences("One. Two!! Three?  ...");
        assert_eq!(parts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_short_text_detection() {
        assert!(is_too_short("   tiny   "));
        assert!(!is_too_short("long enough text"));
    }

    #[test]
    fn test_count_present_is_substring_based() {
        let text = "an uniquely fresh take, as if by magic";
        assert_eq!(count_present(text, &CREATIVE_WORDS), 2);
        assert_eq!(count_present(text, &METAPHOR_INDICATORS), 1);
    }
}
