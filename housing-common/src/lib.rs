//! Housing Common Types
//!
//! Feature schema, validation rules and wire envelopes shared by the housing
//! API server and its clients.

pub mod api;
pub mod features;
pub mod schema;

pub use api::{
    timestamp_now, ApiSuccess, ErrorBody, ErrorKind, ModelStatus, PredictionResult,
    ServiceHealth, TrainingReport,
};
pub use features::{HousingFeatures, OceanProximity};
pub use schema::{validate, FieldError, FieldKind, FieldRule, ValidationErrors, FIELDS};
