//! Persisted evaluation records and the JSONL results store.

use graveyard_core::{MetricsResult, ResponseRecord, RevivalSuggestion, ZombieStatus};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::RuntimeError;

/// Length of a prompt id in hex digits.
pub const PROMPT_ID_LEN: usize = 12;

/// Stable id for one evaluation of one prompt file.
pub fn prompt_id(file_name: &str, timestamp: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", file_name, timestamp).as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(PROMPT_ID_LEN);
    hex
}

/// One line of the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub prompt_id: String,
    pub file_path: String,
    pub prompt_text: String,

    /// RFC 3339 evaluation time
    pub timestamp: String,

    pub llm_responses: IndexMap<String, ResponseRecord>,
    pub metrics: MetricsResult,

    /// Null when no response could be scored
    #[serde(default)]
    pub zombie_status: Option<ZombieStatus>,

    #[serde(default)]
    pub revival_suggestions: Vec<RevivalSuggestion>,
}

impl EvaluationRecord {
    pub fn is_zombie(&self) -> bool {
        self.zombie_status.as_ref().is_some_and(|s| s.is_zombie)
    }

    pub fn total_cost(&self) -> f64 {
        self.llm_responses.values().map(|r| r.cost_usd).sum()
    }
}

/// Append-only JSONL file of [`EvaluationRecord`]s.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line, creating parent directories.
    pub fn append(&self, record: &EvaluationRecord) -> Result<(), RuntimeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        tracing::debug!(path = %self.path.display(), prompt_id = %record.prompt_id, "Record appended");
        Ok(())
    }

    /// Every record in file order. Blank lines are skipped.
    pub fn read_all(&self) -> Result<Vec<EvaluationRecord>, RuntimeError> {
        let file = fs::File::open(&self.path)?;
        let mut records = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| RuntimeError::MalformedRecord {
                line: index + 1,
                message: e.to_string(),
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

/// Aggregate view over stored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub total_prompts: usize,
    pub living_prompts: usize,
    pub zombie_prompts: usize,

    /// Records whose responses all failed
    pub unscored_prompts: usize,

    /// Zombies over scored prompts, in [0, 1]
    pub zombie_rate: f64,

    /// Mean overall score of scored prompts
    pub average_score: f64,

    pub total_cost_usd: f64,

    /// Zombie count per severity tier, in first-seen order
    pub severity_breakdown: IndexMap<String, usize>,
}

impl ResultsSummary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let mut summary = Self {
            total_prompts: records.len(),
            ..Self::default()
        };
        let mut score_sum = 0.0;

        for record in records {
            summary.total_cost_usd += record.total_cost();

            let Some(status) = &record.zombie_status else {
                summary.unscored_prompts += 1;
                continue;
            };

            score_sum += status.overall_score;
            if status.is_zombie {
                summary.zombie_prompts += 1;
                *summary
                    .severity_breakdown
                    .entry(status.severity.clone())
                    .or_insert(0) += 1;
            } else {
                summary.living_prompts += 1;
            }
        }

        let scored = summary.living_prompts + summary.zombie_prompts;
        if scored > 0 {
            summary.zombie_rate = summary.zombie_prompts as f64 / scored as f64;
            summary.average_score = score_sum / scored as f64;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graveyard_core::{MetricsFailure, RevivalPriority};
    use tempfile::TempDir;

    fn status(is_zombie: bool, score: f64, severity: &str) -> ZombieStatus {
        ZombieStatus {
            is_zombie,
            overall_score: score,
            severity: severity.to_string(),
            visual_theme: "fresh_grave".to_string(),
            revival_priority: RevivalPriority::Low,
            failed_critical_metrics: Vec::new(),
            reason: "r".to_string(),
        }
    }

    fn record(id: &str, zombie_status: Option<ZombieStatus>, cost: f64) -> EvaluationRecord {
        let mut llm_responses = IndexMap::new();
        llm_responses.insert(
            "openai".to_string(),
            ResponseRecord::success("text", 100.0, cost, "gpt-4o-mini"),
        );
        EvaluationRecord {
            prompt_id: id.to_string(),
            file_path: format!("prompts/{}.txt", id),
            prompt_text: "fix".to_string(),
            timestamp: "2026-10-18T00:00:00+00:00".to_string(),
            llm_responses,
            metrics: MetricsResult::Failed(MetricsFailure {
                error: "No valid responses to evaluate".to_string(),
                total_responses: 0,
                failed_responses: 0,
            }),
            zombie_status,
            revival_suggestions: Vec::new(),
        }
    }

    #[test]
    fn test_prompt_id_shape() {
        let id = prompt_id("fix.txt", "2026-10-18T00:00:00+00:00");
        assert_eq!(id.len(), PROMPT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, prompt_id("fix.txt", "2026-10-18T00:00:00+00:00"));
        assert_ne!(id, prompt_id("fix.txt", "2026-10-18T00:00:01+00:00"));
    }

    #[test]
    fn test_append_then_read_back() {
        let dir = TempDir::new().unwrap();
        let store = ResultsStore::new(dir.path().join("nested/results.jsonl"));

        let first = record("a", Some(status(true, 0.3, "rotting_zombie")), 0.01);
        let second = record("b", None, 0.0);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 2);

        let records = store.read_all().unwrap();
        assert_eq!(records, vec![first, second]);
        assert!(records[1].metrics.is_failed());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");
        let store = ResultsStore::new(&path);
        store.append(&record("a", None, 0.0)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"\n{not json}\n")
            .unwrap();

        match store.read_all() {
            Err(RuntimeError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected MalformedRecord, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_summary() {
        let records = vec![
            record("a", Some(status(true, 0.2, "skeletal_zombie")), 0.03),
            record("b", Some(status(true, 0.4, "rotting_zombie")), 0.02),
            record("c", Some(status(false, 0.9, "alive")), 0.001),
            record("d", Some(status(true, 0.1, "skeletal_zombie")), 0.0),
            record("e", None, 0.0),
        ];

        let summary = ResultsSummary::from_records(&records);
        assert_eq!(summary.total_prompts, 5);
        assert_eq!(summary.zombie_prompts, 3);
        assert_eq!(summary.living_prompts, 1);
        assert_eq!(summary.unscored_prompts, 1);
        assert!((summary.zombie_rate - 0.75).abs() < 1e-12);
        assert!((summary.average_score - 0.4).abs() < 1e-12);
        assert!((summary.total_cost_usd - 0.051).abs() < 1e-12);
        assert_eq!(
            summary.severity_breakdown.into_iter().collect::<Vec<_>>(),
            vec![("skeletal_zombie".to_string(), 2), ("rotting_zombie".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = ResultsSummary::from_records(&[]);
        assert_eq!(summary.total_prompts, 0);
        assert_eq!(summary.zombie_rate, 0.0);
    }
}
