use crate::errors::AppError;
use crate::models::{LeadInput, LookupMatch};
use crate::retry::{retry_async, RetryPolicy};
use async_trait::async_trait;
use moka::future::Cache;
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Score assumed when the directory omits one (0-100 scale).
const DEFAULT_SCORE: f64 = 50.0;

/// Directory lookup by name + domain.
#[async_trait]
pub trait ContactLookup: Send + Sync {
    /// `false` means the lookup step is skipped entirely.
    fn is_enabled(&self) -> bool;

    async fn find_email(
        &self,
        lead: &LeadInput,
        domain: &str,
    ) -> Result<Option<LookupMatch>, AppError>;
}

/// Lookup that is never configured.
pub struct DisabledLookup;

#[async_trait]
impl ContactLookup for DisabledLookup {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn find_email(&self, _: &LeadInput, _: &str) -> Result<Option<LookupMatch>, AppError> {
        Ok(None)
    }
}

// ============ Hunter.io ============

#[derive(Debug, Deserialize)]
struct HunterResponse {
    data: Option<HunterEmailData>,
}

#[derive(Debug, Deserialize)]
struct HunterEmailData {
    email: Option<String>,
    score: Option<f64>,
    phone_number: Option<String>,
}

impl HunterEmailData {
    fn into_match(self) -> Option<LookupMatch> {
        let email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())?;
        let confidence = (self.score.unwrap_or(DEFAULT_SCORE) / 100.0).clamp(0.0, 1.0);
        let phone = self.phone_number.as_deref().and_then(normalize_phone);
        Some(LookupMatch {
            email,
            confidence,
            phone,
        })
    }
}

/// Normalizes a phone number to E.164, assuming US numbering when no country code is given.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() < 7 {
        return None;
    }
    match phonenumber::parse(Some(CountryId::US), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            Some(number.format().mode(Mode::E164).to_string())
        }
        Ok(_) => {
            tracing::debug!("Discarding invalid phone number from lookup: {}", raw);
            None
        }
        Err(e) => {
            tracing::debug!("Failed to parse phone '{}': {:?}", raw, e);
            None
        }
    }
}

/// Client for the Hunter.io email-finder endpoint.
///
/// Without an API key the client is disabled and never touches the network.
#[derive(Clone)]
pub struct HunterClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
    cache: Cache<String, Option<LookupMatch>>,
}

impl HunterClient {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            retry: RetryPolicy::default(),
            // One batch run; entries only need to outlive it.
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10_000)
                .build(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn cache_key(lead: &LeadInput, domain: &str) -> String {
        format!(
            "{}|{}|{}",
            lead.first_name.to_lowercase(),
            lead.last_name.to_lowercase(),
            domain.to_lowercase()
        )
    }

    async fn fetch(
        &self,
        api_key: &str,
        lead: &LeadInput,
        domain: &str,
    ) -> Result<Option<LookupMatch>, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/email-finder", self.base_url),
            &[
                ("domain", domain),
                ("first_name", lead.first_name.as_str()),
                ("last_name", lead.last_name.as_str()),
                ("api_key", api_key),
            ],
        )
        .map_err(|e| AppError::Validation(format!("Failed to build Hunter URL: {}", e)))?;

        tracing::debug!(
            "Hunter URL: {}/email-finder?domain={}&first_name={}&last_name={}&api_key=[REDACTED]",
            self.base_url,
            domain,
            lead.first_name,
            lead.last_name
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Hunter request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body: error_text,
            });
        }

        // A body that arrives but does not parse is not a transport problem.
        let body: HunterResponse = response.json().await.map_err(|e| {
            AppError::Validation(format!("Failed to parse Hunter response: {}", e))
        })?;

        Ok(body.data.and_then(HunterEmailData::into_match))
    }
}

#[async_trait]
impl ContactLookup for HunterClient {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn find_email(
        &self,
        lead: &LeadInput,
        domain: &str,
    ) -> Result<Option<LookupMatch>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        // Concurrent misses on the same key share one upstream fetch; errors are not cached.
        let key = Self::cache_key(lead, domain);
        self.cache
            .try_get_with(key, async {
                tracing::debug!("Hunter cache miss for {}", lead.full_name());
                retry_async(
                    &self.retry,
                    "hunter_email_finder",
                    AppError::is_transient,
                    |_| self.fetch(api_key, lead, domain),
                )
                .await
            })
            .await
            .map_err(|shared| {
                Arc::try_unwrap(shared)
                    .unwrap_or_else(|shared| AppError::ExternalApiError(shared.to_string()))
            })
    }
}
