use crate::enrichment::DEFAULT_MAX_CONCURRENCY;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Async AI-powered lead enrichment
#[derive(Debug, Parser)]
#[command(name = "lead-enricher", version)]
pub struct Cli {
    /// Path to input CSV with leads (first_name, last_name, company[, email])
    pub input: PathBuf,

    /// Path to write enriched CSV
    pub output: PathBuf,

    /// Hunter.io API key; the lookup step is skipped without one
    #[arg(long, env = "HUNTER_API_KEY", hide_env_values = true)]
    pub hunter_api_key: Option<String>,

    /// Max concurrent enrichment tasks
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Delay in seconds after each lead, to respect upstream rate limits
    #[arg(long, default_value = "0", value_parser = parse_delay)]
    pub rate_limit_delay: Duration,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub stats_json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_concurrency(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("concurrency must be a positive integer, got '{}'", raw)),
    }
}

fn parse_delay(raw: &str) -> Result<Duration, String> {
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| format!("rate limit delay must be a non-negative number of seconds, got '{}'", raw))
}
