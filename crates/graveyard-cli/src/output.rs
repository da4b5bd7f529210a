//! Terminal rendering of evaluations and summaries.

use anyhow::Result;
use clap::ValueEnum;
use graveyard_core::{MetricsResult, PromptEvaluation, RevivalSuggestion, ZombieStatus};
use graveyard_runtime::{EvaluationRecord, ProviderUsage, ResultsSummary};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// One evaluated prompt file from a live run.
pub fn print_record(record: &EvaluationRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(record)?),
        OutputFormat::Plain => {
            println!("{}", "=".repeat(60));
            println!("Prompt: {} [{}]", record.file_path, record.prompt_id);
            println!("{}", "=".repeat(60));
            for (provider, response) in &record.llm_responses {
                match &response.error {
                    Some(error) => println!("  {}: failed ({})", provider, error),
                    None => println!(
                        "  {}: {:.0}ms, ${:.4}",
                        provider, response.latency_ms, response.cost_usd
                    ),
                }
            }
            print_plain(
                &record.metrics,
                record.zombie_status.as_ref(),
                &record.revival_suggestions,
            );
        }
    }
    Ok(())
}

/// An offline evaluation.
pub fn print_evaluation(label: &str, outcome: &PromptEvaluation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Plain => {
            println!("Prompt: {}", label);
            print_plain(
                &outcome.metrics,
                outcome.zombie_status.as_ref(),
                &outcome.revival_suggestions,
            );
        }
    }
    Ok(())
}

fn print_plain(
    metrics: &MetricsResult,
    status: Option<&ZombieStatus>,
    suggestions: &[RevivalSuggestion],
) {
    let report = match metrics {
        MetricsResult::Failed(failure) => {
            println!(
                "Metrics: {} ({} of {} responses failed)",
                failure.error, failure.failed_responses, failure.total_responses
            );
            println!();
            return;
        }
        MetricsResult::Scored(report) => report,
    };

    println!("Metrics:");
    for (kind, score) in &report.scores {
        println!(
            "  {:<18} {:>12.4}  {:<10} score {:.2}",
            kind.as_str(),
            score.value,
            score.category.to_string(),
            score.normalized_score
        );
    }
    println!("  Overall score: {:.2}", report.overall_score());

    if let Some(status) = status {
        let verdict = if status.is_zombie { "ZOMBIE" } else { "ALIVE" };
        println!(
            "Status: {} ({}, priority {})",
            verdict, status.severity, status.revival_priority
        );
        println!("Reason: {}", status.reason);
    }

    if !suggestions.is_empty() {
        println!("Revival suggestions:");
        for (i, suggestion) in suggestions.iter().enumerate() {
            println!(
                "  {}. {} / {} (confidence {:.2})",
                i + 1,
                suggestion.strategy,
                suggestion.technique,
                suggestion.confidence_score
            );
            println!("     {}", suggestion.reasoning);
        }
    }
    println!();
}

pub fn print_summary(summary: &ResultsSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Plain => {
            println!("{}", "=".repeat(60));
            println!("EVALUATION SUMMARY");
            println!("{}", "=".repeat(60));
            println!("Total Prompts Evaluated: {}", summary.total_prompts);
            println!("Living Prompts: {}", summary.living_prompts);
            println!("Zombie Prompts: {}", summary.zombie_prompts);
            if summary.unscored_prompts > 0 {
                println!("Unscored Prompts: {}", summary.unscored_prompts);
            }
            println!("Zombie Rate: {:.1}%", summary.zombie_rate * 100.0);
            println!("Average Score: {:.2}", summary.average_score);
            println!("Total Cost: ${:.4}", summary.total_cost_usd);

            if !summary.severity_breakdown.is_empty() {
                println!();
                println!("Zombie Breakdown:");
                for (severity, count) in &summary.severity_breakdown {
                    println!("  {}: {}", severity, count);
                }
            }
        }
    }
    Ok(())
}

pub fn print_usage(usage: &IndexMap<String, ProviderUsage>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(usage)?),
        OutputFormat::Plain => {
            println!();
            println!("Provider usage:");
            for (provider, stats) in usage {
                println!(
                    "  {}: {} calls, {} failures, ${:.4}",
                    provider, stats.calls, stats.failures, stats.estimated_cost
                );
            }
        }
    }
    Ok(())
}
