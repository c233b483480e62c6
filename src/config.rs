use crate::errors::AppError;
use std::time::Duration;

const DEFAULT_MODEL_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_HUNTER_BASE_URL: &str = "https://api.hunter.io/v2";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub model_api_key: String,
    pub model_base_url: String,
    pub model: String,
    pub hunter_base_url: String,
    pub hunter_api_key: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Self {
            model_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| AppError::Config("OPENAI_API_KEY environment variable required".into()))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        return Err(AppError::Config("OPENAI_API_KEY cannot be empty".into()));
                    }
                    Ok(key)
                })?,
            model_base_url: http_url_var("OPENAI_BASE_URL", DEFAULT_MODEL_BASE_URL)?,
            model: std::env::var("ENRICH_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            hunter_base_url: http_url_var("HUNTER_BASE_URL", DEFAULT_HUNTER_BASE_URL)?,
            hunter_api_key: std::env::var("HUNTER_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            http_timeout: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config("HTTP_TIMEOUT_SECS must be a positive integer".into())
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model base URL: {}", config.model_base_url);
        tracing::debug!("Model: {}", config.model);
        tracing::debug!("Hunter base URL: {}", config.hunter_base_url);
        if config.hunter_api_key.is_some() {
            tracing::info!("Hunter.io API key detected");
        }

        Ok(config)
    }

    /// Overrides the lookup credential, e.g. from a CLI flag. Blank keys disable the lookup.
    pub fn with_hunter_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self.hunter_api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        self
    }
}

fn http_url_var(name: &str, default: &str) -> Result<String, AppError> {
    let url = std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::Config(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            model_api_key: "sk-test".into(),
            model_base_url: DEFAULT_MODEL_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            hunter_base_url: DEFAULT_HUNTER_BASE_URL.into(),
            hunter_api_key: Some("from-env".into()),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    #[test]
    fn test_cli_key_overrides_env_key() {
        let config = base().with_hunter_api_key(Some("from-flag".into()));
        assert_eq!(config.hunter_api_key.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_blank_cli_key_disables_lookup() {
        let config = base().with_hunter_api_key(Some("   ".into()));
        assert!(config.hunter_api_key.is_none());
    }

    #[test]
    fn test_absent_cli_key_keeps_env_key() {
        let config = base().with_hunter_api_key(None);
        assert_eq!(config.hunter_api_key.as_deref(), Some("from-env"));
    }
}
