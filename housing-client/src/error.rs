//! Error types for the housing API client.

use housing_common::{ErrorKind, FieldError};

/// Message shown when the API could not be reached at all.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The API answered with an error envelope.
    #[error("{message}")]
    Api {
        /// Absent when the error did not come from a housing route.
        kind: Option<ErrorKind>,
        status: u16,
        message: String,
        details: Vec<FieldError>,
    },

    /// No answer from the API.
    #[error("{}", NETWORK_MESSAGE)]
    Network,

    /// A request was refused because another one is still running.
    #[error("A submission is already in progress")]
    Busy,

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api { kind, .. } => *kind,
            ClientError::Network => Some(ErrorKind::ServiceUnavailable),
            ClientError::Busy | ClientError::Unexpected(_) => None,
        }
    }

    /// Whether asking again later might work.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network | ClientError::Busy)
            || self.kind().is_some_and(|k| k.is_transient())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
