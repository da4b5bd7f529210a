//! Diagnosis of what made a prompt underperform.

use crate::types::{MetricKind, MetricsReport, ZombieStatus};

use super::technique::Technique;

/// A problem category derived from a poorly scoring dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Problem {
    LowSemanticAccuracy,
    PoorCoherence,
    HighLatency,
    HighCost,
    LowCreativity,
}

impl Problem {
    /// Fixed order used for reasoning text.
    pub const ALL: [Problem; 5] = [
        Problem::LowSemanticAccuracy,
        Problem::PoorCoherence,
        Problem::HighLatency,
        Problem::HighCost,
        Problem::LowCreativity,
    ];

    pub fn for_metric(metric: MetricKind) -> Self {
        match metric {
            MetricKind::SemanticAccuracy => Problem::LowSemanticAccuracy,
            MetricKind::Coherence => Problem::PoorCoherence,
            MetricKind::Latency => Problem::HighLatency,
            MetricKind::CostEfficiency => Problem::HighCost,
            MetricKind::Creativity => Problem::LowCreativity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Problem::LowSemanticAccuracy => "low_semantic_accuracy",
            Problem::PoorCoherence => "poor_coherence",
            Problem::HighLatency => "high_latency",
            Problem::HighCost => "high_cost",
            Problem::LowCreativity => "low_creativity",
        }
    }

    /// Human-readable description used in suggestion reasoning.
    pub fn description(&self) -> &'static str {
        match self {
            Problem::LowSemanticAccuracy => "poor relevance to the prompt",
            Problem::PoorCoherence => "lack of logical flow",
            Problem::HighLatency => "slow response times",
            Problem::HighCost => "expensive token usage",
            Problem::LowCreativity => "insufficient creative elements",
        }
    }

    /// Techniques known to address this problem.
    pub fn preferred_techniques(&self) -> &'static [Technique] {
        match self {
            Problem::LowSemanticAccuracy => &[
                Technique::ClarifyIntent,
                Technique::AddContext,
                Technique::ExampleProvision,
            ],
            Problem::PoorCoherence => &[
                Technique::StepByStepBreakdown,
                Technique::StructureSpecification,
            ],
            Problem::HighLatency => &[
                Technique::ConstraintSpecification,
                Technique::LengthGuidelines,
            ],
            Problem::HighCost => &[
                Technique::ConstraintSpecification,
                Technique::SpecifyFormat,
            ],
            Problem::LowCreativity => &[Technique::UseCaseExamples, Technique::DomainContext],
        }
    }
}

/// Active problems for one prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemAnalysis {
    active: Vec<Problem>,

    /// Carried through from the classifier for callers; not used in scoring.
    pub failed_critical_metrics: Vec<MetricKind>,
}

impl ProblemAnalysis {
    /// Flag every dimension whose category is `poor` or `zombie`.
    pub fn analyze(report: &MetricsReport, status: &ZombieStatus) -> Self {
        let flagged: Vec<Problem> = report
            .scores
            .iter()
            .filter(|(_, score)| score.category.is_problem())
            .map(|(kind, _)| Problem::for_metric(*kind))
            .collect();

        let active = Problem::ALL
            .into_iter()
            .filter(|p| flagged.contains(p))
            .collect();

        Self {
            active,
            failed_critical_metrics: status.failed_critical_metrics.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_problems(problems: &[Problem]) -> Self {
        Self {
            active: Problem::ALL
                .into_iter()
                .filter(|p| problems.contains(p))
                .collect(),
            failed_critical_metrics: Vec::new(),
        }
    }

    pub fn is_active(&self, problem: Problem) -> bool {
        self.active.contains(&problem)
    }

    /// Active problems in fixed order.
    pub fn active(&self) -> &[Problem] {
        &self.active
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    /// Whether a technique is preferred by any active problem.
    pub fn prefers(&self, technique: Technique) -> bool {
        self.active
            .iter()
            .any(|p| p.preferred_techniques().contains(&technique))
    }
}
