/// Waterfall enrichment for a single lead
///
/// Sources are consulted cheapest/most-authoritative first:
/// 1. Ask the advisor for a strategy note (logged only)
/// 2. Directory lookup (when configured and no email is known)
/// 3. Model-generated email patterns (when still no email)
/// 4. Model-guessed LinkedIn profile (always)
/// 5. Finalize status and confidence
/// 6. Pace the batch
///
/// Source failures degrade to "no signal"; `enrich` itself never fails.
use crate::lookup::ContactLookup;
use crate::models::{DataSource, EnrichedLead, LeadInput};
use crate::strategy::{extract_domain, LeadAdvisor};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Weight applied to the directory's own confidence.
pub const LOOKUP_WEIGHT: f64 = 0.4;
/// Flat bonus for a model-generated email.
pub const EMAIL_PATTERN_BONUS: f64 = 0.3;
/// Flat bonus for a model-guessed profile.
pub const LINKEDIN_BONUS: f64 = 0.3;

/// Estimated cost of a successful directory lookup, USD.
pub const LOOKUP_COST: f64 = 0.01;
/// Estimated cost of one usable model-generated signal, USD.
pub const MODEL_SIGNAL_COST: f64 = 0.0001;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

pub struct LeadEnricher {
    advisor: Arc<dyn LeadAdvisor>,
    lookup: Arc<dyn ContactLookup>,
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
    pacing_delay: Duration,
}

impl LeadEnricher {
    /// `max_concurrency` below 1 is raised to 1.
    pub fn new(
        advisor: Arc<dyn LeadAdvisor>,
        lookup: Arc<dyn ContactLookup>,
        max_concurrency: usize,
        pacing_delay: Duration,
    ) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            advisor,
            lookup,
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            pacing_delay,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs the waterfall for one lead.
    ///
    /// Waits for a permit first, so at most `max_concurrency` leads are in flight.
    pub async fn enrich(&self, lead: &LeadInput) -> EnrichedLead {
        let mut enriched = EnrichedLead::from(lead);
        let name = lead.full_name();

        // The semaphore is never closed; a closed pool would only drop the bound.
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::error!("Concurrency gate closed; enriching {} unbounded", name);
                None
            }
        };

        tracing::info!("Enriching lead: {} ({})", name, lead.company);

        // Step 1: advisory strategy
        let strategy = self.advisor.get_enrichment_strategy(lead).await;
        tracing::debug!("Strategy for {}: {}", name, strategy);

        // Step 2: directory lookup
        if self.lookup.is_enabled() && !enriched.has_email() {
            let domain = extract_domain(&lead.company);
            match self.lookup.find_email(lead, &domain).await {
                Ok(Some(found)) => {
                    enriched.email = Some(found.email);
                    if found.phone.is_some() {
                        enriched.phone = found.phone;
                    }
                    enriched.add_confidence(found.confidence * LOOKUP_WEIGHT);
                    enriched.with_source(DataSource::HunterIo);
                    enriched.estimated_cost += LOOKUP_COST;
                    tracing::info!("Hunter.io email found for {}", name);
                }
                Ok(None) => {
                    tracing::debug!("Hunter.io had no email for {}", name);
                }
                Err(e) => {
                    tracing::warn!("Hunter.io lookup failed for {}: {}", name, e);
                }
            }
        }

        // Step 3: generated email patterns
        if !enriched.has_email() {
            let patterns = self.advisor.generate_email_patterns(lead).await;
            if let Some(first) = patterns.into_iter().next() {
                enriched.email = Some(first);
                enriched.add_confidence(EMAIL_PATTERN_BONUS);
                enriched.with_source(DataSource::AiGenerated);
                enriched.estimated_cost += MODEL_SIGNAL_COST;
                tracing::info!("AI-generated email pattern used for {}", name);
            }
        }

        // Step 4: profile guess, independent of the email outcome
        if let Some(profile) = self.advisor.find_linkedin(lead).await {
            enriched.linkedin_url = Some(profile.url);
            enriched.title = profile.title;
            enriched.add_confidence(LINKEDIN_BONUS);
            enriched.with_source(DataSource::AiLinkedin);
            enriched.estimated_cost += MODEL_SIGNAL_COST;
            tracing::info!("LinkedIn profile inferred for {}", name);
        }

        // Step 5: finalize
        enriched.finalize();
        tracing::info!(
            "Finished {}: status={} confidence={:.2} sources=[{}]",
            name,
            enriched.enrichment_status,
            enriched.confidence_score(),
            enriched.data_sources_joined()
        );

        // Step 6: pacing, still holding the permit
        if !self.pacing_delay.is_zero() {
            tokio::time::sleep(self.pacing_delay).await;
        }

        enriched
    }

    /// Enriches every lead concurrently (bounded by the permit pool).
    ///
    /// Output order matches input order.
    pub async fn enrich_many(&self, leads: &[LeadInput]) -> Vec<EnrichedLead> {
        join_all(leads.iter().map(|lead| self.enrich(lead))).await
    }
}
