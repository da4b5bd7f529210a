//! Prompt rewrite techniques.
//!
//! Every technique either prepends a framing line to the prompt or appends a
//! guidance paragraph, picking one phrase from a small bank.

use rand::Rng;
use std::fmt;

use crate::types::MetricKind;

/// Where a technique places its addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// `"{addition}\n\n{prompt}"`
    Prepend,
    /// `"{prompt}\n\n{addition}"`
    Append,
}

/// The closed set of rewrite techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    AddContext,
    SpecifyFormat,
    ClarifyIntent,
    StepByStepBreakdown,
    ExampleProvision,
    ConstraintSpecification,
    DomainContext,
    AudienceSpecification,
    UseCaseExamples,
    OutputTemplate,
    StructureSpecification,
    LengthGuidelines,
}

impl Technique {
    pub const ALL: [Technique; 12] = [
        Technique::AddContext,
        Technique::SpecifyFormat,
        Technique::ClarifyIntent,
        Technique::StepByStepBreakdown,
        Technique::ExampleProvision,
        Technique::ConstraintSpecification,
        Technique::DomainContext,
        Technique::AudienceSpecification,
        Technique::UseCaseExamples,
        Technique::OutputTemplate,
        Technique::StructureSpecification,
        Technique::LengthGuidelines,
    ];

    /// Configuration name of the technique.
    pub fn as_str(&self) -> &'static str {
        match self {
            Technique::AddContext => "add_context",
            Technique::SpecifyFormat => "specify_format",
            Technique::ClarifyIntent => "clarify_intent",
            Technique::StepByStepBreakdown => "step_by_step_breakdown",
            Technique::ExampleProvision => "example_provision",
            Technique::ConstraintSpecification => "constraint_specification",
            Technique::DomainContext => "domain_context",
            Technique::AudienceSpecification => "audience_specification",
            Technique::UseCaseExamples => "use_case_examples",
            Technique::OutputTemplate => "output_template",
            Technique::StructureSpecification => "structure_specification",
            Technique::LengthGuidelines => "length_guidelines",
        }
    }

    /// Parse a configuration name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn placement(&self) -> Placement {
        match self {
            Technique::AddContext => Placement::Prepend,
            _ => Placement::Append,
        }
    }

    /// Candidate phrases for the addition.
    pub fn phrases(&self) -> &'static [&'static str; 3] {
        match self {
            Technique::AddContext => &[
                "Context: You are an expert assistant helping with this task.",
                "Background: This request is part of a larger project to improve AI responses.",
                "Setting: Please approach this as a professional consultant would.",
            ],
            Technique::SpecifyFormat => &[
                "Please format your response as a clear, structured answer.",
                "Provide your response in a well-organized format with clear sections.",
                "Structure your answer with numbered points or bullet points for clarity.",
            ],
            Technique::ClarifyIntent => &[
                "The goal is to provide a comprehensive and accurate response.",
                "Please focus on being helpful, accurate, and thorough in your answer.",
                "I'm looking for a detailed explanation that addresses all aspects of this question.",
            ],
            Technique::StepByStepBreakdown => &[
                "Please think through this step by step:",
                "Break down your response into clear steps:",
                "Approach this systematically, step by step:",
            ],
            Technique::ExampleProvision => &[
                "For example, include specific details and explanations in your response.",
                "Provide concrete examples where applicable to illustrate your points.",
                "Use examples to make your explanation clearer and more practical.",
            ],
            Technique::ConstraintSpecification => &[
                "Keep your response concise but comprehensive.",
                "Focus on the most important aspects in your response.",
                "Provide a focused answer that directly addresses the question.",
            ],
            Technique::DomainContext => &[
                "Consider this from a professional/technical perspective.",
                "Approach this with expertise in the relevant field.",
                "Provide insights based on best practices in this domain.",
            ],
            Technique::AudienceSpecification => &[
                "Explain this for someone with intermediate knowledge of the topic.",
                "Tailor your response for a professional audience.",
                "Make this accessible to someone learning about this topic.",
            ],
            Technique::UseCaseExamples => &[
                "Include practical applications and use cases in your response.",
                "Provide real-world examples of how this applies.",
                "Show how this would be used in practice.",
            ],
            Technique::OutputTemplate => &[
                "Format your response as:\n1. Overview\n2. Key Points\n3. Conclusion",
                "Structure your answer with clear headings and subpoints.",
                "Organize your response with an introduction, main content, and summary.",
            ],
            Technique::StructureSpecification => &[
                "Ensure your response has a logical flow from start to finish.",
                "Organize your thoughts clearly with smooth transitions between ideas.",
                "Present information in a well-structured, easy-to-follow manner.",
            ],
            Technique::LengthGuidelines => &[
                "Provide a response of moderate length - thorough but not excessive.",
                "Keep your answer comprehensive yet concise.",
                "Aim for a complete but efficiently worded response.",
            ],
        }
    }

    /// Rewrite a prompt with one randomly chosen phrase.
    pub fn apply<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> String {
        let phrases = self.phrases();
        let addition = phrases[rng.random_range(0..phrases.len())];
        match self.placement() {
            Placement::Prepend => format!("{}\n\n{}", addition, prompt),
            Placement::Append => format!("{}\n\n{}", prompt, addition),
        }
    }

    /// Baseline expected improvement per metric.
    pub fn base_improvements(&self) -> &'static [(MetricKind, f64)] {
        use MetricKind::*;
        match self {
            Technique::AddContext => &[(SemanticAccuracy, 0.15), (Coherence, 0.10)],
            Technique::SpecifyFormat => &[(Coherence, 0.20), (SemanticAccuracy, 0.10)],
            Technique::ClarifyIntent => &[(SemanticAccuracy, 0.25), (Coherence, 0.15)],
            Technique::StepByStepBreakdown => &[(Coherence, 0.30), (SemanticAccuracy, 0.10)],
            Technique::ExampleProvision => &[(SemanticAccuracy, 0.20), (Creativity, 0.15)],
            Technique::ConstraintSpecification => &[(CostEfficiency, 0.25), (Latency, 0.15)],
            Technique::DomainContext => &[(SemanticAccuracy, 0.15), (Creativity, 0.20)],
            Technique::AudienceSpecification => &[(SemanticAccuracy, 0.10), (Coherence, 0.15)],
            Technique::UseCaseExamples => &[(Creativity, 0.25), (SemanticAccuracy, 0.15)],
            Technique::OutputTemplate => &[(Coherence, 0.25), (SemanticAccuracy, 0.10)],
            Technique::StructureSpecification => &[(Coherence, 0.30), (SemanticAccuracy, 0.05)],
            Technique::LengthGuidelines => &[(CostEfficiency, 0.20), (Latency, 0.10)],
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_round_trips_every_name() {
        for technique in Technique::ALL {
            assert_eq!(Technique::parse(technique.as_str()), Some(technique));
        }
        assert_eq!(Technique::parse("summon_spirits"), None);
    }

    #[test]
    fn test_add_context_prepends() {
        let mut rng = StdRng::seed_from_u64(3);
        let rewritten = Technique::AddContext.apply("fix", &mut rng);
        assert!(rewritten.ends_with("\n\nfix"));
        assert!(Technique::AddContext
            .phrases()
            .iter()
            .any(|p| rewritten.starts_with(p)));
    }

    #[test]
    fn test_other_techniques_append() {
        let mut rng = StdRng::seed_from_u64(3);
        for technique in Technique::ALL {
            if technique == Technique::AddContext {
                continue;
            }
            let rewritten = technique.apply("fix", &mut rng);
            assert!(rewritten.starts_with("fix\n\n"), "{} did not append", technique);
            assert!(rewritten.len() > "fix".len());
        }
    }

    #[test]
    fn test_improvement_table_within_cap() {
        for technique in Technique::ALL {
            let table = technique.base_improvements();
            assert_eq!(table.len(), 2);
            assert!(table.iter().all(|(_, v)| *v > 0.0 && *v <= 0.5));
        }
    }
}
