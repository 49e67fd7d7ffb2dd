//! Instellar client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid host {host}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("Invalid path segment: \"{0}\"")]
    InvalidPathSegment(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Build an API error from a non-success response body.
    ///
    /// The message is taken from the first of `errors`, `error` or `message`
    /// found in a JSON body, falling back to the raw body text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| extract_message(&value))
            .unwrap_or_else(|| body.trim().to_string());

        let message = if message.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("no response body")
                .to_string()
        } else {
            message
        };

        ClientError::Api { status, message }
    }

    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn extract_message(value: &serde_json::Value) -> Option<String> {
    for key in ["errors", "error", "message"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) => return Some(s.clone()),
            Some(serde_json::Value::Null) | None => {}
            Some(other) => return Some(other.to_string()),
        }
    }
    None
}

pub type Result<T> = std::result::Result<T, ClientError>;
