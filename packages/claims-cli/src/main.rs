mod cli;
mod config;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claims_evidence::{
    AnthropicModel, DiscourseSchema, ExtractionScope, FsNoteStore, LanguageModel, OpenAiModel,
    Pipeline, PipelineConfig, RateLimitedModel, RunSummary,
};

use crate::cli::{Cli, Provider};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "info,claims_evidence=debug"
    } else {
        "info,claims_evidence=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Everything fatal is checked before the pipeline writes anything.
    let config = Config::from_env().context("Failed to load configuration")?;
    let credentials = config
        .credentials_for(cli.provider, cli.model.as_deref())
        .context("Missing model credentials")?;

    let schema = match &cli.schema {
        Some(path) => DiscourseSchema::load(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?,
        None => DiscourseSchema::builtin(),
    };
    let scope = ExtractionScope::from_schema(&schema, cli.node_types.as_slice())
        .context("Invalid node type selection")?;

    let timeout = Duration::from_secs(cli.timeout_secs);
    let model: Box<dyn LanguageModel> = match cli.provider {
        Provider::Anthropic => Box::new(
            AnthropicModel::with_timeout(credentials, timeout)
                .context("Failed to create Anthropic client")?,
        ),
        Provider::Openai => Box::new(
            OpenAiModel::with_timeout(credentials, timeout)
                .context("Failed to create OpenAI client")?,
        ),
    };
    let requests_per_minute = cli.requests_per_minute.or(config.requests_per_minute);
    let model: Box<dyn LanguageModel> = match requests_per_minute {
        Some(rpm) => Box::new(
            RateLimitedModel::per_minute(model, rpm).context("Invalid requests-per-minute")?,
        ),
        None => model,
    };

    let evidence_dir = cli
        .evidence_dir
        .clone()
        .unwrap_or_else(|| cli.output_dir.join("evidence"));
    let claims_dir = cli
        .claims_dir
        .clone()
        .unwrap_or_else(|| cli.output_dir.join("claims"));
    let store = FsNoteStore::with_dirs(evidence_dir, claims_dir);

    let pipeline_config = PipelineConfig::new()
        .with_extract_max_tokens(cli.extract_max_tokens)
        .with_synthesis_max_tokens(cli.synthesis_max_tokens)
        .with_concurrency(usize::from(cli.concurrency))
        .with_collision_policy(cli.on_collision.into())
        .with_claims_file(cli.claims_file.into())
        .with_scope(scope);

    tracing::info!(
        provider = ?cli.provider,
        model = model.name(),
        csv = %cli.csv.display(),
        "Starting claims/evidence extraction"
    );

    let pipeline = Pipeline::with_config(store, model, pipeline_config);
    let summary = pipeline
        .run_path(&cli.csv, &cli.question)
        .await
        .with_context(|| format!("Extraction failed for {}", cli.csv.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Extraction complete".bright_green().bold());
    println!(
        "  Rows: {} total, {} processed, {} skipped",
        summary.rows_total,
        summary.rows_processed.to_string().green(),
        summary.rows_skipped.to_string().yellow()
    );
    println!(
        "  Evidence files: {} ({} items)",
        summary.evidence_files_written.to_string().green(),
        summary.evidence_items
    );
    if summary.citekey_collisions > 0 {
        println!(
            "  Citekey collisions: {}",
            summary.citekey_collisions.to_string().yellow()
        );
    }
    println!(
        "  Claims: {}",
        summary.claims_synthesized.to_string().green()
    );
    if let Some(file) = &summary.claims_file {
        println!("  Claims file: {}", file.bright_cyan());
    }

    if !summary.unresolved_references.is_empty() {
        println!(
            "{}",
            format!(
                "  {} claim reference(s) point at missing evidence:",
                summary.unresolved_count()
            )
            .yellow()
        );
        for unresolved in &summary.unresolved_references {
            println!(
                "    claim {}: {} ({:?})",
                unresolved.claim_index + 1,
                unresolved.reference,
                unresolved.reason
            );
        }
    }
}
