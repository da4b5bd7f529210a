use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graveyard_core::{evaluate, GraveyardConfig, ResponseRecord};
use graveyard_runtime::{
    CredentialStore, PromptRunner, ProviderRegistry, ResponseCollector, ResultsStore,
    ResultsSummary, RuntimeConfig, RuntimeError,
};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod output;

use crate::output::OutputFormat;

/// Prompt Graveyard - find zombie prompts and suggest how to revive them
#[derive(Parser, Debug)]
#[command(name = "graveyard", author, version, about, long_about = None)]
struct Cli {
    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the configured providers with each prompt file and evaluate
    Evaluate {
        /// Configuration file (YAML or JSON)
        config: PathBuf,

        /// Prompt files, one prompt per file
        #[arg(required = true)]
        prompts: Vec<PathBuf>,

        /// Seed for judge noise and technique selection
        #[arg(long)]
        seed: Option<u64>,

        /// Results file, overriding `results_path`
        #[arg(long)]
        results: Option<PathBuf>,

        #[arg(short, long, default_value = "plain")]
        format: OutputFormat,
    },

    /// Evaluate recorded responses without calling any provider
    Score {
        config: PathBuf,

        #[arg(long)]
        prompt_file: PathBuf,

        /// JSON object of provider id to response record
        #[arg(long)]
        responses: PathBuf,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long, default_value = "plain")]
        format: OutputFormat,
    },

    /// Summarize a JSONL results file
    Summary {
        results: PathBuf,

        #[arg(short, long, default_value = "plain")]
        format: OutputFormat,
    },

    /// Load and validate a configuration file
    Validate { config: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Evaluate {
            config,
            prompts,
            seed,
            results,
            format,
        } => run_evaluate(&config, &prompts, seed, results, format).await,
        Command::Score {
            config,
            prompt_file,
            responses,
            seed,
            format,
        } => run_score(&config, &prompt_file, &responses, seed, format),
        Command::Summary { results, format } => run_summary(&results, format),
        Command::Validate { config } => run_validate(&config),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn load_config(path: &Path) -> Result<GraveyardConfig> {
    GraveyardConfig::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

async fn run_evaluate(
    config_path: &Path,
    prompts: &[PathBuf],
    seed: Option<u64>,
    results: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path)?;
    let runtime = RuntimeConfig::from_file(config_path)
        .with_context(|| format!("Failed to load provider config: {}", config_path.display()))?;

    let credentials = CredentialStore::from_env(&runtime);
    let providers = ProviderRegistry::with_defaults()
        .build_providers(&runtime, &credentials)
        .context("Failed to initialize LLM providers")?;
    if providers.is_empty() {
        return Err(RuntimeError::NoProviders)
            .with_context(|| format!("Nothing to query in {}", config_path.display()));
    }

    let runner = PromptRunner::new(&config, ResponseCollector::from_config(providers, &runtime));
    let store = ResultsStore::new(results.unwrap_or_else(|| runtime.results_path.clone()));
    let mut rng = make_rng(seed);

    let mut records = Vec::with_capacity(prompts.len());
    for path in prompts {
        let record = runner
            .evaluate_file(path, &mut rng)
            .await
            .with_context(|| format!("Failed to evaluate prompt: {}", path.display()))?;
        store
            .append(&record)
            .with_context(|| format!("Failed to write results: {}", store.path().display()))?;
        output::print_record(&record, format)?;
        records.push(record);
    }

    tracing::info!(
        count = records.len(),
        path = %store.path().display(),
        "Saved evaluation results"
    );

    output::print_summary(&ResultsSummary::from_records(&records), format)?;
    output::print_usage(&runner.collector().usage().snapshot(), format)?;
    Ok(())
}

fn run_score(
    config_path: &Path,
    prompt_file: &Path,
    responses_path: &Path,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path)?;

    let prompt = std::fs::read_to_string(prompt_file)
        .with_context(|| format!("Failed to read prompt: {}", prompt_file.display()))?;
    let prompt = prompt.trim();

    let raw = std::fs::read_to_string(responses_path)
        .with_context(|| format!("Failed to read responses: {}", responses_path.display()))?;
    let responses: IndexMap<String, ResponseRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid responses JSON: {}", responses_path.display()))?;

    let outcome = evaluate(&config, prompt, &responses, &mut make_rng(seed));
    output::print_evaluation(&prompt_file.display().to_string(), &outcome, format)
}

fn run_summary(results: &Path, format: OutputFormat) -> Result<()> {
    let records = ResultsStore::new(results)
        .read_all()
        .with_context(|| format!("Failed to read results: {}", results.display()))?;
    output::print_summary(&ResultsSummary::from_records(&records), format)
}

fn run_validate(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let runtime = RuntimeConfig::from_file(config_path)
        .with_context(|| format!("Invalid provider config: {}", config_path.display()))?;

    let enabled = runtime.enabled_providers().count();
    println!(
        "{} is valid: {} metrics, {} severity tiers, {} strategies, {} providers ({} enabled)",
        config_path.display(),
        config.evaluation_metrics.len(),
        config.zombie_classification.severity_levels.len(),
        config.revival_agent.improvement_strategies.len(),
        runtime.llm_providers.len(),
        enabled
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_evaluate() {
        let cli = Cli::try_parse_from([
            "graveyard",
            "evaluate",
            "config/graveyard.yaml",
            "a.txt",
            "b.txt",
            "--seed",
            "42",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Evaluate {
                prompts,
                seed,
                format,
                results,
                ..
            } => {
                assert_eq!(prompts.len(), 2);
                assert_eq!(seed, Some(42));
                assert_eq!(format, OutputFormat::Json);
                assert!(results.is_none());
            }
            other => panic!("Expected evaluate, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluate_requires_prompts() {
        assert!(Cli::try_parse_from(["graveyard", "evaluate", "config.yaml"]).is_err());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;
        let a: u64 = make_rng(Some(5)).random();
        let b: u64 = make_rng(Some(5)).random();
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_offline() {
        let dir = tempfile::TempDir::new().unwrap();
        let prompt = dir.path().join("fix.txt");
        let responses = dir.path().join("responses.json");
        std::fs::write(&prompt, "fix\n").unwrap();
        std::fs::write(
            &responses,
            r#"{"openai": {"response": "Here is some code.", "latency_ms": 12000, "cost_usd": 0.03, "model": "gpt-4o-mini"}}"#,
        )
        .unwrap();

        let config = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/graveyard.yaml"));
        run_score(config, &prompt, &responses, Some(1), OutputFormat::Json).unwrap();
    }

    #[test]
    fn test_validate_sample_config() {
        let config = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/graveyard.yaml"));
        run_validate(config).unwrap();
    }
}
