//! Lightweight text heuristics standing in for an LLM judge.
//!
//! Each scorer looks at one response and returns a raw score. Judge noise,
//! averaging and threshold scoring are applied by the calculator.

use std::collections::HashSet;

use super::patterns::{
    count_present, is_too_short, sentences, CREATIVE_WORDS, METAPHOR_INDICATORS,
    SHORT_RESPONSE_SCORE,
};
use super::scoring::{mean, sample_stdev};
use crate::types::MetricKind;

/// A per-response text scorer for one quality dimension.
pub trait ResponseScorer: Send + Sync {
    /// The dimension this scorer measures.
    fn kind(&self) -> MetricKind;

    /// Raw score for one response. May be non-finite on degenerate input;
    /// the caller substitutes a neutral value.
    fn score(&self, prompt: &str, response: &str) -> f64;

    /// Whether the score imitates a sampled LLM judge and takes judge noise.
    fn simulates_judge(&self) -> bool {
        false
    }
}

/// Prompt relevance via vocabulary overlap and answer length.
pub struct SemanticAccuracyScorer;

impl SemanticAccuracyScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SemanticAccuracyScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseScorer for SemanticAccuracyScorer {
    fn kind(&self) -> MetricKind {
        MetricKind::SemanticAccuracy
    }

    fn score(&self, prompt: &str, response: &str) -> f64 {
        if is_too_short(response) {
            return SHORT_RESPONSE_SCORE;
        }

        let prompt_lower = prompt.to_lowercase();
        let response_lower = response.to_lowercase();
        let prompt_words: HashSet<&str> = prompt_lower.split_whitespace().collect();
        let response_words: HashSet<&str> = response_lower.split_whitespace().collect();

        let overlap = if prompt_words.is_empty() {
            0.0
        } else {
            prompt_words.intersection(&response_words).count() as f64 / prompt_words.len() as f64
        };

        // Longer answers are preferred up to 100 characters.
        let length = (response.chars().count() as f64 / 100.0).min(1.0);

        overlap * 0.6 + length * 0.4
    }

    fn simulates_judge(&self) -> bool {
        true
    }
}

/// Logical flow via sentence repetition and length variety.
pub struct CoherenceScorer;

impl CoherenceScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoherenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Score for answers that are a single sentence.
const SINGLE_SENTENCE_SCORE: f64 = 0.6;

impl ResponseScorer for CoherenceScorer {
    fn kind(&self) -> MetricKind {
        MetricKind::Coherence
    }

    fn score(&self, _prompt: &str, response: &str) -> f64 {
        if is_too_short(response) {
            return SHORT_RESPONSE_SCORE;
        }

        let parts = sentences(response);
        if parts.len() < 2 {
            return SINGLE_SENTENCE_SCORE;
        }

        let unique: HashSet<&str> = parts.iter().copied().collect();
        let repetition = unique.len() as f64 / parts.len() as f64;

        let lengths: Vec<f64> = parts
            .iter()
            .map(|s| s.split_whitespace().count() as f64)
            .collect();
        let variation = (sample_stdev(&lengths) / mean(&lengths)).min(1.0);

        (repetition * 0.6 + variation * 0.4).clamp(0.0, 1.0)
    }
}

/// Creative vocabulary, lexical diversity and figurative language.
pub struct CreativityScorer;

impl CreativityScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CreativityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseScorer for CreativityScorer {
    fn kind(&self) -> MetricKind {
        MetricKind::Creativity
    }

    fn score(&self, _prompt: &str, response: &str) -> f64 {
        if is_too_short(response) {
            return SHORT_RESPONSE_SCORE;
        }

        let lowered = response.to_lowercase();
        let creative = count_present(&lowered, &CREATIVE_WORDS) as f64;

        let words: Vec<&str> = lowered.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        let diversity = if words.is_empty() {
            0.0
        } else {
            unique.len() as f64 / words.len() as f64
        };

        let metaphors = count_present(&lowered, &METAPHOR_INDICATORS) as f64;

        ((creative / 10.0) * 0.4 + diversity * 0.4 + (metaphors / 3.0).min(1.0) * 0.2)
            .clamp(0.0, 1.0)
    }
}

/// The scorer for a text dimension, if it has one.
pub fn scorer_for(kind: MetricKind) -> Option<Box<dyn ResponseScorer>> {
    match kind {
        MetricKind::SemanticAccuracy => Some(Box::new(SemanticAccuracyScorer::new())),
        MetricKind::Coherence => Some(Box::new(CoherenceScorer::new())),
        MetricKind::Creativity => Some(Box::new(CreativityScorer::new())),
        MetricKind::Latency | MetricKind::CostEfficiency => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_short_responses_score_floor() {
        for scorer in [
            scorer_for(MetricKind::SemanticAccuracy).unwrap(),
            scorer_for(MetricKind::Coherence).unwrap(),
            scorer_for(MetricKind::Creativity).unwrap(),
        ] {
            assert_eq!(scorer.score("anything at all", "  ok.  "), SHORT_RESPONSE_SCORE);
        }
    }

    #[test]
    fn test_semantic_overlap_and_length() {
        // Prompt vocabulary {what, is, rust}; response shares "rust" and "is".
        let response = "rust is a systems language";
        let score = SemanticAccuracyScorer::new().score("What is Rust", response);
        let expected = (2.0 / 3.0) * 0.6 + (response.len() as f64 / 100.0) * 0.4;
        assert!(close(score, expected));
    }

    #[test]
    fn test_semantic_long_answer_caps_length() {
        let response = "x".repeat(250);
        let score = SemanticAccuracyScorer::new().score("unrelated words", &response);
        assert!(close(score, 0.4));
    }

    #[test]
    fn test_coherence_single_sentence() {
        let score = CoherenceScorer::new().score("", "Here is one sentence with no end");
        assert_eq!(score, SINGLE_SENTENCE_SCORE);
    }

    #[test]
    fn test_coherence_penalizes_repetition() {
        let repeated = "The cat sat. The cat sat. The cat sat.";
        // All sentences identical: 1/3 unique, zero length variation.
        assert!(close(CoherenceScorer::new().score("", repeated), 0.6 / 3.0));

        let varied = "Short one. This sentence is quite a bit longer than the first!";
        let score = CoherenceScorer::new().score("", varied);
        // lengths 2 and 10: stdev = 5.657, mean = 6, cv = 0.943
        let cv = (32.0f64).sqrt() / 6.0;
        assert!(close(score, 0.6 + 0.4 * cv));
    }

    #[test]
    fn test_creativity_components() {
        let text = "Imagine a novel city, like a garden";
        let score = CreativityScorer::new().score("", text);
        // imagine + novel; 6 unique of 7 words; one metaphor indicator
        let expected = (2.0 / 10.0) * 0.4 + (6.0 / 7.0) * 0.4 + (1.0 / 3.0) * 0.2;
        assert!(close(score, expected));
    }

    #[test]
    fn test_only_semantic_simulates_judge() {
        assert!(SemanticAccuracyScorer::new().simulates_judge());
        assert!(!CoherenceScorer::new().simulates_judge());
        assert!(!CreativityScorer::new().simulates_judge());
        assert!(scorer_for(MetricKind::Latency).is_none());
    }
}
