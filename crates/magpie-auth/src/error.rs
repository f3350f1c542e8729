use std::fmt;

/// The one failure kind every flow in this crate raises.
///
/// The message carries the failing operation, the HTTP status line (code and
/// reason phrase), and the raw response body where one exists, so callers
/// can log it verbatim and decide whether to retry or fall back to another
/// provider.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct OAuthLoginError {
    message: String,
}

pub type Result<T> = std::result::Result<T, OAuthLoginError>;

impl OAuthLoginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn http_status(op: &str, status: reqwest::StatusCode, body: &str) -> Self {
        Self::new(format!("{op}: unexpected status {status}: {body}"))
    }

    pub fn missing_field(op: &str, field: &str, body: &str) -> Self {
        Self::new(format!("{op}: reply carries no {field}: {body}"))
    }

    pub fn malformed(op: &str, detail: impl fmt::Display) -> Self {
        Self::new(format!("{op}: malformed reply: {detail}"))
    }

    /// Wraps the underlying OAuth1 engine's own failure reason.
    pub fn engine(reason: impl fmt::Display) -> Self {
        Self::new(format!("oauth1 engine: {reason}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for OAuthLoginError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("http transport: {err}"))
    }
}

impl From<serde_json::Error> for OAuthLoginError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("json decode: {err}"))
    }
}
