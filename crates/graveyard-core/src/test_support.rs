//! Shared fixtures for unit tests.

use indexmap::IndexMap;

use crate::config::GraveyardConfig;
use crate::types::ResponseRecord;

pub(crate) const SAMPLE_CONFIG: &str = include_str!("../../../config/graveyard.yaml");

pub(crate) fn sample_config() -> GraveyardConfig {
    GraveyardConfig::from_yaml(SAMPLE_CONFIG).unwrap()
}

/// Two slow, expensive, terse answers.
pub(crate) fn dead_responses() -> IndexMap<String, ResponseRecord> {
    let mut responses = IndexMap::new();
    responses.insert(
        "openai".to_string(),
        ResponseRecord::success("Here is some code.", 12_000.0, 0.03, "gpt-4o-mini"),
    );
    responses.insert(
        "groq".to_string(),
        ResponseRecord::success("Here is some code.", 14_000.0, 0.03, "llama-3.1-8b"),
    );
    responses
}

/// Fast, cheap, on-topic answers.
pub(crate) fn healthy_responses() -> IndexMap<String, ResponseRecord> {
    let text = "Rust ownership means every value has exactly one owner at a time. \
                When the owner goes out of scope the value is dropped and its memory is freed. \
                Borrowing lets code read a value through references without taking ownership of it!";
    let mut responses = IndexMap::new();
    responses.insert(
        "openai".to_string(),
        ResponseRecord::success(text, 600.0, 0.0002, "gpt-4o-mini"),
    );
    responses.insert(
        "groq".to_string(),
        ResponseRecord::success(text, 400.0, 0.0001, "llama-3.1-8b"),
    );
    responses
}

pub(crate) const HEALTHY_PROMPT: &str =
    "Explain Rust ownership: what is an owner, when is a value dropped, and how does borrowing work?";
