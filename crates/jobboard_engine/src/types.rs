use std::fmt;

use thiserror::Error;

/// A failed page fetch. `message` is safe to show to the user; details
/// belong in the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error carrying the standard user-facing message for `kind`.
    pub fn from_kind(kind: FailureKind) -> Self {
        let message = kind.user_message();
        Self::new(kind, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Parse,
    Network,
}

impl FailureKind {
    pub fn user_message(&self) -> String {
        match self {
            FailureKind::InvalidUrl => "Job feed address is invalid".to_string(),
            FailureKind::HttpStatus(code) if *code >= 500 => format!("Server error ({code})"),
            FailureKind::HttpStatus(code) => format!("Request failed ({code})"),
            FailureKind::Timeout => "Request timed out".to_string(),
            FailureKind::TooLarge { .. } => "Response too large".to_string(),
            FailureKind::Parse => "Unexpected response from server".to_string(),
            FailureKind::Network => "Network error".to_string(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Parse => write!(f, "malformed page payload"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
