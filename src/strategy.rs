//! Model-backed advice for a single lead: a strategy note, ranked email
//! guesses and a profile guess. None of these fail; a misbehaving model
//! degrades to "no signal".

use crate::extract::{extract_json_array, extract_json_object};
use crate::model_client::ModelQueryClient;
use crate::models::{LeadInput, LinkedinProfile};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_STRATEGY: &str = "Use standard email patterns and LinkedIn search";

const STRATEGY_MAX_TOKENS: u32 = 100;
const GUESS_MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.3;

/// The advisory signals the waterfall consumes.
#[async_trait]
pub trait LeadAdvisor: Send + Sync {
    /// Free-text strategy note. Informational only.
    async fn get_enrichment_strategy(&self, lead: &LeadInput) -> String;

    /// Candidate addresses, most likely first. Empty means no candidates.
    async fn generate_email_patterns(&self, lead: &LeadInput) -> Vec<String>;

    async fn find_linkedin(&self, lead: &LeadInput) -> Option<LinkedinProfile>;
}

/// Guesses a company's web domain: lowercase, drop spaces, commas and periods, add `.com`.
///
/// Not verified against anything.
pub fn extract_domain(company: &str) -> String {
    let domain: String = company
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '.'))
        .collect();
    format!("{}.com", domain)
}

#[derive(Debug, Deserialize)]
struct ProfileGuess {
    url: Option<String>,
    title: Option<String>,
}

impl ProfileGuess {
    /// Keeps the guess only if its URL is an absolute http(s) URL.
    fn into_profile(self) -> Option<LinkedinProfile> {
        let url = self.url?.trim().to_string();
        let parsed = url::Url::parse(&url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return None;
        }
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Some(LinkedinProfile { url, title })
    }
}

/// [`LeadAdvisor`] backed by a generative model.
#[derive(Clone)]
pub struct AiStrategy {
    client: ModelQueryClient,
}

impl AiStrategy {
    pub fn new(client: ModelQueryClient) -> Self {
        Self { client }
    }

    fn strategy_prompt(lead: &LeadInput) -> String {
        format!(
            "You are a B2B data enrichment expert. Analyze this lead and suggest the best strategy \
             to find their contact information:\n\n\
             Lead Information:\n\
             - Name: {} {}\n\
             - Company: {}\n\n\
             Provide a one-sentence strategy focusing on the most likely sources for accurate data.",
            lead.first_name, lead.last_name, lead.company
        )
    }

    fn email_patterns_prompt(lead: &LeadInput) -> String {
        format!(
            "Generate the 3 most likely email addresses for this person:\n\n\
             Name: {} {}\n\
             Company: {}\n\
             Domain: {}\n\n\
             Return ONLY a JSON array of email addresses, ordered by likelihood. Example format:\n\
             [\"firstname.lastname@domain.com\", \"firstnamelastname@domain.com\", \"flastname@domain.com\"]",
            lead.first_name,
            lead.last_name,
            lead.company,
            extract_domain(&lead.company)
        )
    }

    fn linkedin_prompt(lead: &LeadInput) -> String {
        format!(
            "Generate the most likely LinkedIn profile URL for this person:\n\n\
             Name: {} {}\n\
             Company: {}\n\n\
             Return ONLY a JSON object with this format:\n\
             {{\"url\": \"https://www.linkedin.com/in/firstname-lastname\", \"title\": \"likely job title\"}}",
            lead.first_name, lead.last_name, lead.company
        )
    }
}

#[async_trait]
impl LeadAdvisor for AiStrategy {
    async fn get_enrichment_strategy(&self, lead: &LeadInput) -> String {
        match self
            .client
            .ask(&Self::strategy_prompt(lead), STRATEGY_MAX_TOKENS, TEMPERATURE)
            .await
        {
            Ok(Some(strategy)) => strategy,
            Ok(None) => DEFAULT_STRATEGY.to_string(),
            Err(e) => {
                tracing::warn!("AI strategy generation failed: {}", e);
                DEFAULT_STRATEGY.to_string()
            }
        }
    }

    async fn generate_email_patterns(&self, lead: &LeadInput) -> Vec<String> {
        let content = match self
            .client
            .ask(&Self::email_patterns_prompt(lead), GUESS_MAX_TOKENS, TEMPERATURE)
            .await
        {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("AI email pattern generation failed: {}", e);
                return Vec::new();
            }
        };

        match extract_json_array::<Vec<String>>(&content) {
            Some(candidates) => candidates
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            None => {
                tracing::warn!(
                    "AI email pattern output for {} was not a JSON array",
                    lead.full_name()
                );
                Vec::new()
            }
        }
    }

    async fn find_linkedin(&self, lead: &LeadInput) -> Option<LinkedinProfile> {
        let content = match self
            .client
            .ask(&Self::linkedin_prompt(lead), GUESS_MAX_TOKENS, TEMPERATURE)
            .await
        {
            Ok(content) => content?,
            Err(e) => {
                tracing::warn!("AI LinkedIn discovery failed: {}", e);
                return None;
            }
        };

        let profile = extract_json_object::<ProfileGuess>(&content).and_then(ProfileGuess::into_profile);
        if profile.is_none() {
            tracing::warn!(
                "AI LinkedIn output for {} had no usable profile URL",
                lead.full_name()
            );
        }
        profile
    }
}
