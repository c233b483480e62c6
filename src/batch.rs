use crate::enrichment::LeadEnricher;
use crate::models::{EnrichedLead, EnrichmentStats, EnrichmentStatus, LeadInput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

/// Outcome of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per input lead, in input order. Written to the result sink,
    /// not to the run summary.
    #[serde(skip)]
    pub leads: Vec<EnrichedLead>,
    pub stats: EnrichmentStats,
}

impl BatchReport {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Runs the waterfall over `leads` and reduces the results.
pub async fn run_batch(enricher: &LeadEnricher, leads: &[LeadInput]) -> BatchReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    let enriched = async {
        tracing::info!(
            "Starting enrichment of {} leads (concurrency {})",
            leads.len(),
            enricher.max_concurrency()
        );
        enricher.enrich_many(leads).await
    }
    .instrument(tracing::info_span!("batch", %run_id))
    .await;
    let stats = calculate_stats(&enriched);

    BatchReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        leads: enriched,
        stats,
    }
}

/// Pure reduction over finished leads.
pub fn calculate_stats(leads: &[EnrichedLead]) -> EnrichmentStats {
    let total = leads.len();
    let completed = leads
        .iter()
        .filter(|lead| lead.enrichment_status == EnrichmentStatus::Completed)
        .count();
    let confidence_sum: f64 = leads.iter().map(EnrichedLead::confidence_score).sum();
    let total_cost: f64 = leads.iter().map(|lead| lead.estimated_cost).sum();

    let (avg_confidence, cost_per_lead) = if total == 0 {
        (0.0, 0.0)
    } else {
        (confidence_sum / total as f64, total_cost / total as f64)
    };

    EnrichmentStats {
        total_leads: total,
        completed,
        partial: total - completed,
        avg_confidence,
        total_cost,
        cost_per_lead,
    }
}
