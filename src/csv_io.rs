//! Record source and result sink for comma-separated files.

use crate::errors::{AppError, ResultExt};
use crate::models::{EnrichedLead, LeadInput};
use serde::Deserialize;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["first_name", "last_name", "company"];

pub const OUTPUT_COLUMNS: [&str; 10] = [
    "first_name",
    "last_name",
    "company",
    "email",
    "phone",
    "linkedin_url",
    "title",
    "confidence_score",
    "data_sources",
    "enrichment_status",
];

#[derive(Debug, Deserialize)]
struct LeadRow {
    first_name: Option<String>,
    last_name: Option<String>,
    company: Option<String>,
    email: Option<String>,
}

/// Leads that passed validation plus the number of rows dropped.
#[derive(Debug, Default)]
pub struct LoadedLeads {
    pub leads: Vec<LeadInput>,
    pub skipped: usize,
}

/// Reads and validates leads. Invalid rows are skipped with a warning; a
/// missing required column fails the whole load.
pub fn load_leads(path: impl AsRef<Path>) -> Result<LoadedLeads, AppError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "{} is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut loaded = LoadedLeads::default();
    for (index, row) in reader.deserialize::<LeadRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping unreadable row {}: {}", line, e);
                loaded.skipped += 1;
                continue;
            }
        };

        match LeadInput::new(
            row.first_name.as_deref().unwrap_or(""),
            row.last_name.as_deref().unwrap_or(""),
            row.company.as_deref().unwrap_or(""),
            row.email.as_deref(),
        ) {
            Ok(lead) => loaded.leads.push(lead),
            Err(e) => {
                tracing::warn!("Skipping invalid row {} {:?}: {}", line, row, e);
                loaded.skipped += 1;
            }
        }
    }

    tracing::info!(
        "Loaded {} leads from {} ({} skipped)",
        loaded.leads.len(),
        path.display(),
        loaded.skipped
    );
    Ok(loaded)
}

/// Writes enriched leads with the fixed output columns.
pub fn write_enriched(path: impl AsRef<Path>, leads: &[EnrichedLead]) -> Result<(), AppError> {
    let path = path.as_ref();
    // A rejected batch leaves no file behind.
    if let Some(lead) = leads.iter().find(|lead| {
        [&lead.first_name, &lead.last_name, &lead.company]
            .iter()
            .any(|field| field.trim().is_empty())
    }) {
        return Err(AppError::InternalError(format!(
            "enriched lead is missing an identity field: {:?}",
            lead
        )));
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(OUTPUT_COLUMNS)?;
    for lead in leads {
        let confidence = format!("{:.2}", lead.confidence_score());
        let sources = lead.data_sources_joined();
        writer.write_record([
            lead.first_name.as_str(),
            lead.last_name.as_str(),
            lead.company.as_str(),
            lead.email.as_deref().unwrap_or(""),
            lead.phone.as_deref().unwrap_or(""),
            lead.linkedin_url.as_deref().unwrap_or(""),
            lead.title.as_deref().unwrap_or(""),
            confidence.as_str(),
            sources.as_str(),
            lead.enrichment_status.as_str(),
        ])?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} enriched leads to {}", leads.len(), path.display());
    Ok(())
}
