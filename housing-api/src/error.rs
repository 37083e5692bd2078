//! Error types for the housing API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use housing_common::{ErrorBody, ErrorKind, FieldError, ValidationErrors};

/// Message returned whenever the prediction service cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "Prediction service is unavailable. Please ensure the service is running.";

/// A classified request failure.
///
/// Upstream failures are classified exactly once, where the outbound call is
/// made, and then travel unchanged to the response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    #[error("{}", UNAVAILABLE_MESSAGE)]
    ServiceUnavailable,

    #[error("Prediction service error: {0}")]
    Internal(String),
}

impl Error {
    /// Validation failure for a body that could not be read as JSON at all.
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::new(vec![FieldError::new(
            "body",
            reason,
        )]))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            Error::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let body = match self {
            Error::Validation(errors) => ErrorBody {
                error: "Validation failed".to_string(),
                kind: Some(kind),
                details: errors.into_inner(),
            },
            other => ErrorBody {
                error: other.to_string(),
                kind: Some(kind),
                details: Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
