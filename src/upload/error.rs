use serde::Deserialize;
use thiserror::Error;

/// Shown whenever no better detail is available.
pub const FALLBACK_MESSAGE: &str = "Upload failed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Rejected locally before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The service could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a failure status.
    #[error("{0}")]
    Server(String),
}

impl UploadError {
    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Validation(message) | UploadError::Server(message) => message.clone(),
            UploadError::Network(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(error: reqwest::Error) -> Self {
        UploadError::Network(error.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<serde_json::Value>,
}

/// Pulls a readable message out of a failure response body.
///
/// Tried in order: the `error` field of a JSON object, the raw body text,
/// then [`FALLBACK_MESSAGE`].
pub fn server_error_message(body: &[u8]) -> String {
    if let Ok(payload) = serde_json::from_slice::<ErrorPayload>(body) {
        return match payload.error {
            Some(serde_json::Value::String(message)) if !message.trim().is_empty() => message,
            _ => FALLBACK_MESSAGE.to_string(),
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return format!("{}: {}", FALLBACK_MESSAGE, text);
    }

    FALLBACK_MESSAGE.to_string()
}
