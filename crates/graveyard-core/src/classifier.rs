//! Classifier: turns a metrics report into a health verdict.
//!
//! A prompt is a zombie when its overall score falls below the configured
//! threshold, or when any critical metric's raw value falls below its floor.
//! Either condition alone is enough.

use crate::config::{GraveyardConfig, SeverityLevel, ZombieConfig};
use crate::types::{MetricKind, MetricsReport, RevivalPriority, ZombieStatus};

/// Tier used when no tier is configured at all.
pub const FLOOR_SEVERITY: &str = "skeletal_zombie";
pub const FLOOR_VISUAL_THEME: &str = "heavily_decayed";

/// Reason text when nothing fired.
pub const HEALTHY_REASON: &str = "Performance within acceptable range";

/// Derives a [`ZombieStatus`] from a metrics report.
#[derive(Debug, Clone)]
pub struct ZombieClassifier {
    config: ZombieConfig,
}

impl ZombieClassifier {
    pub fn new(config: ZombieConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &GraveyardConfig) -> Self {
        Self::new(config.zombie_classification.clone())
    }

    /// Classify a scored prompt.
    ///
    /// Only scored reports are accepted; a degenerate metrics result has
    /// nothing to classify.
    pub fn classify_prompt(&self, report: &MetricsReport) -> ZombieStatus {
        let overall_score = report.overall_score();
        let below_threshold = overall_score < self.config.overall_threshold;

        let failed = self.failed_critical_metrics(report);
        let is_zombie = below_threshold || !failed.is_empty();

        let (severity, level) = self.determine_severity(overall_score);
        let reason = self.build_reason(overall_score, below_threshold, &failed, is_zombie);

        if is_zombie {
            tracing::info!(
                overall_score,
                severity = %severity,
                failed_critical = ?failed,
                "Prompt classified as zombie"
            );
        }

        ZombieStatus {
            is_zombie,
            overall_score,
            severity,
            visual_theme: level.visual_theme,
            revival_priority: level.revival_priority,
            failed_critical_metrics: failed,
            reason,
        }
    }

    /// Critical metrics present in the report whose raw value is under the
    /// floor, in configuration order and without repeats.
    fn failed_critical_metrics(&self, report: &MetricsReport) -> Vec<MetricKind> {
        let mut failed = Vec::new();
        for critical in &self.config.critical_metrics {
            let Some(score) = report.get(critical.metric) else {
                continue;
            };
            if score.value < critical.threshold && !failed.contains(&critical.metric) {
                failed.push(critical.metric);
            }
        }
        failed
    }

    /// First tier whose inclusive range holds the score, else the most
    /// severe configured tier, else the built-in floor.
    fn determine_severity(&self, score: f64) -> (String, SeverityLevel) {
        let levels = &self.config.severity_levels;

        if let Some((name, level)) = levels.iter().find(|(_, l)| l.score_range.contains(score)) {
            return (name.clone(), level.clone());
        }

        let most_severe = levels
            .iter()
            .min_by(|(_, a), (_, b)| a.score_range.min.total_cmp(&b.score_range.min));

        match most_severe {
            Some((name, level)) => {
                tracing::debug!(score, tier = %name, "No severity tier matched, using most severe");
                (name.clone(), level.clone())
            }
            None => (FLOOR_SEVERITY.to_string(), floor_level()),
        }
    }

    fn build_reason(
        &self,
        score: f64,
        below_threshold: bool,
        failed: &[MetricKind],
        is_zombie: bool,
    ) -> String {
        let mut parts = Vec::new();

        if below_threshold {
            parts.push(format!(
                "Overall performance score ({:.2}) below threshold ({:.2})",
                score, self.config.overall_threshold
            ));
        }

        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|m| m.as_str()).collect();
            parts.push(format!("Critical metrics failed: {}", names.join(", ")));
        }

        if parts.is_empty() {
            // Unreachable while is_zombie is derived from the same two checks.
            if is_zombie {
                return "Classified as zombie without a recorded cause".to_string();
            }
            return HEALTHY_REASON.to_string();
        }

        parts.join("; ")
    }
}

fn floor_level() -> SeverityLevel {
    SeverityLevel {
        score_range: crate::config::ScoreRange { min: 0.0, max: 0.0 },
        visual_theme: FLOOR_VISUAL_THEME.to_string(),
        revival_priority: RevivalPriority::High,
    }
}
