pub mod client;
pub mod credential;
pub mod openai;
pub mod types;

pub use client::*;
pub use credential::*;
pub use openai::*;
pub use types::*;

use thiserror::Error;

/// Failure reported by a single transport call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Completion API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    /// Rate limiting and network failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429,
            Self::Network(_) => true,
            Self::MalformedResponse(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Unrecoverable completion failure after retries and fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Completion API error: {message}")]
    Api { status: Option<u16>, message: String },
}

impl From<TransportError> for CompletionError {
    fn from(err: TransportError) -> Self {
        Self::Api {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(TransportError::Status {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(TransportError::Network("reset".into()).is_retryable());
        assert!(!TransportError::Status {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        assert!(!TransportError::Status {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!TransportError::MalformedResponse("eof".into()).is_retryable());
    }

    #[test]
    fn network_error_has_no_status() {
        let err: CompletionError = TransportError::Network("refused".into()).into();
        assert_eq!(
            err,
            CompletionError::Api {
                status: None,
                message: "Network error: refused".into()
            }
        );
    }
}
