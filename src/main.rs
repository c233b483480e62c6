use anyhow::Context;
use clap::Parser;
use lead_enricher::batch::{run_batch, BatchReport};
use lead_enricher::cli::Cli;
use lead_enricher::config::Config;
use lead_enricher::csv_io::{load_leads, write_enriched};
use lead_enricher::enrichment::LeadEnricher;
use lead_enricher::lookup::{ContactLookup, HunterClient};
use lead_enricher::model_client::{ModelQueryClient, OpenAiCompatBackend};
use lead_enricher::strategy::AiStrategy;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the enrichment run.
///
/// Reads and validates the input leads, loads configuration, runs the
/// waterfall over them with bounded concurrency, then writes the enriched CSV
/// and logs the batch summary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "lead_enricher=debug"
    } else {
        "lead_enricher=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Nothing to enrich means no credentials are needed either
    let loaded = load_leads(&cli.input)?;
    if loaded.leads.is_empty() {
        tracing::warn!("No valid leads found in {}", cli.input.display());
        return Ok(());
    }

    // Load configuration
    let config = Config::from_env()?.with_hunter_api_key(cli.hunter_api_key.clone());

    // One pooled client for every outbound call
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let backend = OpenAiCompatBackend::new(
        http.clone(),
        &config.model_base_url,
        &config.model_api_key,
        &config.model,
    );
    let advisor = AiStrategy::new(ModelQueryClient::new(Arc::new(backend)));
    let lookup = HunterClient::new(http, &config.hunter_base_url, config.hunter_api_key.clone());
    if !lookup.is_enabled() {
        tracing::warn!("No Hunter.io API key found; using AI-generated email patterns only");
    }

    let enricher = LeadEnricher::new(
        Arc::new(advisor),
        Arc::new(lookup),
        cli.concurrency,
        cli.rate_limit_delay,
    );

    let report = run_batch(&enricher, &loaded.leads).await;

    write_enriched(&cli.output, &report.leads)?;
    log_summary(&report, loaded.skipped);

    if let Some(path) = &cli.stats_json {
        write_stats_json(path, &report)?;
    }

    Ok(())
}

fn log_summary(report: &BatchReport, skipped: usize) {
    let stats = &report.stats;
    tracing::info!(
        "Processed {} leads in {:.1}s | Completed: {} ({:.1}%) | Partial: {} | Skipped rows: {}",
        stats.total_leads,
        report.duration_secs(),
        stats.completed,
        stats.completion_rate() * 100.0,
        stats.partial,
        skipped
    );
    tracing::info!(
        "Avg confidence: {:.2} | Total cost: ${:.4} | Cost per lead: ${:.4}",
        stats.avg_confidence,
        stats.total_cost,
        stats.cost_per_lead
    );
}

fn write_stats_json(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
    tracing::info!("Run summary written to {}", path.display());
    Ok(())
}
