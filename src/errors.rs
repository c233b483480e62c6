use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Error interacting with an external API (model backend or lookup service).
    ExternalApiError(String),
    /// The external API answered, but with a non-success status.
    UpstreamStatus {
        /// HTTP status code returned by the upstream.
        status: u16,
        /// Response body (or a placeholder when unreadable).
        body: String,
    },
    /// Invalid input (bad lead row, malformed email, missing column).
    Validation(String),
    /// Missing or malformed configuration.
    Config(String),
    /// Filesystem error.
    Io(std::io::Error),
    /// Tabular read/write error.
    Csv(csv::Error),
    /// Contract violation inside the crate.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, rate limiting and 5xx responses are transient;
    /// validation and configuration problems never are.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::ExternalApiError(_) => true,
            AppError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            AppError::WithContext { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::UpstreamStatus { status, body } => {
                write!(f, "Upstream returned status {}: {}", status, body)
            }
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
            AppError::Csv(e) => write!(f, "CSV error: {}", e),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Csv(e) => Some(e),
            AppError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::UpstreamStatus {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => AppError::ExternalApiError(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AppError::ExternalApiError("connection reset".into()).is_transient());
        assert!(AppError::UpstreamStatus {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(AppError::UpstreamStatus {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!AppError::UpstreamStatus {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!AppError::Validation("bad row".into()).is_transient());
    }

    #[test]
    fn test_context_wraps_and_preserves_transience() {
        let err: Result<(), AppError> = Err(AppError::ExternalApiError("timeout".into()));
        let wrapped = err.context("lookup failed").unwrap_err();
        assert_eq!(wrapped.to_string(), "lookup failed: External API error: timeout");
        assert!(wrapped.is_transient());
    }
}
