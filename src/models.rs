use crate::errors::AppError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

// ============ Input ============

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

/// Basic `local@domain.tld` syntax check.
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// A sparse contact record as read from the record source.
///
/// Identity fields are trimmed and non-empty; `email`, when present, passed
/// [`is_valid_email`]. Construct through [`LeadInput::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeadInput {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: Option<String>,
}

impl LeadInput {
    pub fn new(
        first_name: &str,
        last_name: &str,
        company: &str,
        email: Option<&str>,
    ) -> Result<Self, AppError> {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) if is_valid_email(e) => Some(e.to_string()),
            Some(e) => {
                return Err(AppError::Validation(format!("invalid email format: {}", e)));
            }
            None => None,
        };

        Ok(Self {
            first_name: required("first_name", first_name)?,
            last_name: required("last_name", last_name)?,
            company: required("company", company)?,
            email,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(cleaned.to_string())
}

// ============ Signals ============

/// Result of a directory lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupMatch {
    pub email: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    /// E.164-normalized phone, when the directory returned a usable one.
    pub phone: Option<String>,
}

/// A guessed professional profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedinProfile {
    pub url: String,
    pub title: Option<String>,
}

// ============ Output ============

/// Provenance tag for a contributed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    HunterIo,
    AiGenerated,
    AiLinkedin,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::HunterIo => "Hunter.io",
            DataSource::AiGenerated => "AI-Generated",
            DataSource::AiLinkedin => "AI-LinkedIn",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrichmentStatus {
    #[default]
    Pending,
    Partial,
    Completed,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::Pending => "pending",
            EnrichmentStatus::Partial => "partial",
            EnrichmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead after (or during) one pass of the waterfall.
///
/// Confidence only grows and never leaves `[0, 1]`; each source appears in
/// `data_sources` at most once, in the order it first contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedLead {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub title: Option<String>,
    confidence_score: f64,
    data_sources: Vec<DataSource>,
    pub enrichment_status: EnrichmentStatus,
    /// Estimated spend on upstream calls for this lead, in USD.
    pub estimated_cost: f64,
}

impl From<&LeadInput> for EnrichedLead {
    fn from(lead: &LeadInput) -> Self {
        Self {
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            company: lead.company.clone(),
            email: lead.email.clone(),
            phone: None,
            linkedin_url: None,
            title: None,
            confidence_score: 0.0,
            data_sources: Vec::new(),
            enrichment_status: EnrichmentStatus::Pending,
            estimated_cost: 0.0,
        }
    }
}

impl EnrichedLead {
    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Adds to the confidence score. Negative or non-finite deltas are ignored.
    pub fn add_confidence(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.confidence_score = (self.confidence_score + delta).min(1.0);
        }
    }

    /// Records a contributing source once.
    pub fn with_source(&mut self, source: DataSource) -> &mut Self {
        if !self.data_sources.contains(&source) {
            self.data_sources.push(source);
        }
        self
    }

    /// Sets the terminal status: completed iff an email is present.
    pub fn finalize(&mut self) {
        self.confidence_score = self.confidence_score.clamp(0.0, 1.0);
        self.enrichment_status = if self.has_email() {
            EnrichmentStatus::Completed
        } else {
            EnrichmentStatus::Partial
        };
    }

    pub fn data_sources_joined(&self) -> String {
        self.data_sources
            .iter()
            .map(DataSource::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============ Statistics ============

/// Aggregate figures over one finished batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub total_leads: usize,
    pub completed: usize,
    pub partial: usize,
    pub avg_confidence: f64,
    pub total_cost: f64,
    pub cost_per_lead: f64,
}

impl EnrichmentStats {
    pub fn completion_rate(&self) -> f64 {
        if self.total_leads == 0 {
            0.0
        } else {
            self.completed as f64 / self.total_leads as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_input_trims_and_validates() {
        let lead = LeadInput::new("  Ada ", "Lovelace", " Analytical Engines ", Some(" ada@ae.com "))
            .unwrap();
        assert_eq!(lead.first_name, "Ada");
        assert_eq!(lead.company, "Analytical Engines");
        assert_eq!(lead.email.as_deref(), Some("ada@ae.com"));
    }

    #[test]
    fn test_lead_input_rejects_blank_identity() {
        assert!(LeadInput::new("", "Brown", "NoName", None).is_err());
        assert!(LeadInput::new("Alice", "   ", "NoName", None).is_err());
        assert!(LeadInput::new("Alice", "Brown", "", None).is_err());
    }

    #[test]
    fn test_lead_input_email_handling() {
        let blank = LeadInput::new("A", "B", "C", Some("  ")).unwrap();
        assert!(blank.email.is_none());
        assert!(LeadInput::new("A", "B", "C", Some("not-an-email")).is_err());
        assert!(LeadInput::new("A", "B", "C", Some("a@b")).is_err());
    }

    #[test]
    fn test_sources_deduplicated_in_insertion_order() {
        let lead = LeadInput::new("A", "B", "C", None).unwrap();
        let mut enriched = EnrichedLead::from(&lead);
        enriched
            .with_source(DataSource::AiLinkedin)
            .with_source(DataSource::HunterIo)
            .with_source(DataSource::AiLinkedin);
        assert_eq!(
            enriched.data_sources(),
            &[DataSource::AiLinkedin, DataSource::HunterIo]
        );
        assert_eq!(enriched.data_sources_joined(), "AI-LinkedIn, Hunter.io");
    }

    #[test]
    fn test_confidence_clamped_and_monotonic() {
        let lead = LeadInput::new("A", "B", "C", None).unwrap();
        let mut enriched = EnrichedLead::from(&lead);
        enriched.add_confidence(0.4);
        enriched.add_confidence(-0.3);
        enriched.add_confidence(f64::NAN);
        assert!((enriched.confidence_score() - 0.4).abs() < 1e-9);
        enriched.add_confidence(0.9);
        assert_eq!(enriched.confidence_score(), 1.0);
    }

    #[test]
    fn test_finalize_sets_status_from_email() {
        let lead = LeadInput::new("A", "B", "C", None).unwrap();
        let mut enriched = EnrichedLead::from(&lead);
        assert_eq!(enriched.enrichment_status, EnrichmentStatus::Pending);
        enriched.finalize();
        assert_eq!(enriched.enrichment_status, EnrichmentStatus::Partial);

        enriched.email = Some("a@c.com".into());
        enriched.finalize();
        assert_eq!(enriched.enrichment_status, EnrichmentStatus::Completed);
    }

    #[test]
    fn test_completion_rate_of_empty_batch() {
        let stats = EnrichmentStats {
            total_leads: 0,
            completed: 0,
            partial: 0,
            avg_confidence: 0.0,
            total_cost: 0.0,
            cost_per_lead: 0.0,
        };
        assert_eq!(stats.completion_rate(), 0.0);
    }
}
