//! Best-effort structured extraction from free-form model output.
//!
//! Models wrap JSON in prose or markdown fences, or truncate it. These helpers
//! take the span from the first opening delimiter to the last closing one and
//! parse it; anything that does not parse yields `None`.

use serde::de::DeserializeOwned;

/// Extracts the first `[` .. last `]` span and deserializes it.
pub fn extract_json_array<T: DeserializeOwned>(text: &str) -> Option<T> {
    extract_between(text, '[', ']')
}

/// Extracts the first `{` .. last `}` span and deserializes it.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    extract_between(text, '{', '}')
}

fn extract_between<T: DeserializeOwned>(text: &str, open: char, close: char) -> Option<T> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Discarding unparseable model output: {}", e);
            None
        }
    }
}
