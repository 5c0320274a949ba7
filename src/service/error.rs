//! Errors from the remote agent service

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got an answer
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The answer could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials could not be obtained or used
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Anything else, mostly from test backends
    #[error("{0}")]
    Other(String),
}

/// Error envelope returned by the service
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl ServiceError {
    /// Build an API error from a status and raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.code {
                Some(code) => format!("{}: {}", code, envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        ServiceError::Api { status, message }
    }
}
