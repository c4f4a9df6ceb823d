//! Error handling for the mutual-aid client

use serde::Deserialize;
use thiserror::Error;

/// Failures talking to the API or persisting client state
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure: offline, CORS, aborted fetch
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `detail` is the server's message when it sent one
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Browser storage unavailable or rejected the write
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Text for an inline error line: the server's detail if present, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server { detail, .. } if !detail.is_empty() => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Client-side checks that run before any request is sent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Enter how much you can afford (0 is ok).")]
    InvalidAffordability,

    #[error("Donations are limited to ${max:.0} at a time.")]
    DonationTooLarge { max: f64 },

    #[error("Please keep the description under {max} characters.")]
    TextTooLong { max: usize },
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extract the message from a FastAPI-style `{"detail": ...}` body.
///
/// `detail` is either a string or, for request validation failures,
/// a list of `{"msg": ...}` objects.
pub fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(entries) => entries
            .iter()
            .find_map(|entry| entry.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
