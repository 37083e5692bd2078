//! Housing API client.
//!
//! Validates form input with the shared feature schema before anything is
//! sent, so obviously invalid input never costs a round trip.

pub mod api;
pub mod error;
pub mod form;

pub use api::{ApiClient, PredictionBackend, DEFAULT_BASE_URL};
pub use error::{ClientError, Result};
pub use form::{field_label, proximity_choices, FormInput, PredictionForm, SubmissionState};
