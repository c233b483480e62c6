use std::path::PathBuf;
use uuid::Uuid;

use lead_enricher::csv_io::{load_leads, write_enriched, OUTPUT_COLUMNS};
use lead_enricher::errors::AppError;
use lead_enricher::models::{DataSource, EnrichedLead, LeadInput};

/// Scratch file in the system temp dir, removed on drop.
struct TempFile(PathBuf);

impl TempFile {
    fn with_contents(contents: &str) -> Self {
        let file = Self::empty();
        std::fs::write(&file.0, contents).unwrap();
        file
    }

    fn empty() -> Self {
        Self(std::env::temp_dir().join(format!("lead-enricher-{}.csv", Uuid::new_v4())))
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn load_filters_invalid_rows() {
    let input = TempFile::with_contents(
        "first_name,last_name,company\nAlice,Smith,Wonderland Inc\n,Brown,NoName\n",
    );

    let loaded = load_leads(&input.0).unwrap();

    assert_eq!(loaded.leads.len(), 1);
    assert_eq!(loaded.leads[0].first_name, "Alice");
    assert_eq!(loaded.skipped, 1);
}

#[test]
fn load_validates_optional_email_and_ignores_extra_columns() {
    let input = TempFile::with_contents(
        "first_name,last_name,company,email,notes\n\
         Ada,Lovelace,Analytical Engines,ada@ae.com,vip\n\
         Grace,Hopper,Compilers Corp,,\n\
         Alan,Turing,Bletchley,not-an-email,\n\
         \"  Edsger \",Dijkstra,  Eindhoven ,,\n",
    );

    let loaded = load_leads(&input.0).unwrap();

    assert_eq!(loaded.skipped, 1);
    let names: Vec<&str> = loaded.leads.iter().map(|l| l.first_name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Grace", "Edsger"]);
    assert_eq!(loaded.leads[0].email.as_deref(), Some("ada@ae.com"));
    assert!(loaded.leads[1].email.is_none());
    assert_eq!(loaded.leads[2].company, "Eindhoven");
}

#[test]
fn load_skips_ragged_rows() {
    let input = TempFile::with_contents(
        "first_name,last_name,company\nAlice,Smith,Wonderland Inc\nBob,Builder\n",
    );

    let loaded = load_leads(&input.0).unwrap();

    assert_eq!(loaded.leads.len(), 1);
    assert_eq!(loaded.skipped, 1);
}

#[test]
fn load_requires_identity_columns() {
    let input = TempFile::with_contents("first_name,company\nAlice,Wonderland Inc\n");

    match load_leads(&input.0) {
        Err(AppError::Validation(msg)) => assert!(msg.contains("last_name")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn load_missing_file_is_an_error() {
    let missing = TempFile::empty();
    assert!(load_leads(&missing.0).is_err());
}

#[test]
fn write_uses_fixed_columns() {
    let lead = LeadInput::new("Alice", "Smith", "Wonderland Inc", None).unwrap();
    let mut enriched = EnrichedLead::from(&lead);
    enriched.email = Some("alice@wonderlandinc.com".into());
    enriched.linkedin_url = Some("https://linkedin.com/in/alice".into());
    enriched.title = Some("Explorer".into());
    enriched.add_confidence(0.3);
    enriched.add_confidence(0.3);
    enriched
        .with_source(DataSource::AiGenerated)
        .with_source(DataSource::AiLinkedin);
    enriched.finalize();

    let output = TempFile::empty();
    write_enriched(&output.0, &[enriched]).unwrap();

    let contents = std::fs::read_to_string(&output.0).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next().unwrap(), OUTPUT_COLUMNS.join(","));
    assert_eq!(
        lines.next().unwrap(),
        "Alice,Smith,Wonderland Inc,alice@wonderlandinc.com,,https://linkedin.com/in/alice,\
         Explorer,0.60,\"AI-Generated, AI-LinkedIn\",completed"
    );
    assert!(lines.next().is_none());
}

#[test]
fn write_rejects_lead_without_identity() {
    let lead = LeadInput::new("Alice", "Smith", "Wonderland Inc", None).unwrap();
    let mut enriched = EnrichedLead::from(&lead);
    enriched.company = String::new();

    let valid = EnrichedLead::from(&lead);

    let output = TempFile::empty();
    assert!(matches!(
        write_enriched(&output.0, &[valid, enriched]),
        Err(AppError::InternalError(_))
    ));
    assert!(!output.0.exists());
}
