//! Response envelopes exchanged between the housing API and its callers.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::features::HousingFeatures;
use crate::schema::FieldError;

/// Current time as an RFC 3339 string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A price prediction for one set of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_price: f64,
    /// The features exactly as submitted.
    pub input: HousingFeatures,
    /// When the response was produced, not when the upstream answered.
    pub timestamp: String,
}

/// Model metadata as reported by the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    #[serde(alias = "modelLoaded")]
    pub loaded: bool,
    pub feature_columns: Vec<String>,
    pub valid_ocean_proximity: Vec<String>,
}

/// Liveness of the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    #[serde(alias = "mlServiceHealthy")]
    pub healthy: bool,
    #[serde(alias = "mlServiceUrl")]
    pub service_url: String,
}

/// Outcome of a retraining run. The metrics are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub metrics: serde_json::Value,
    pub timestamp: String,
}

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input violated the feature schema.
    Validation,
    /// The prediction service answered with an error status.
    UpstreamRejected,
    /// The prediction service could not be reached or timed out.
    ServiceUnavailable,
    /// The outbound call could not be built, or its answer understood.
    Internal,
}

impl ErrorKind {
    /// Whether trying the same request again later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::ServiceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::UpstreamRejected => write!(f, "upstream_rejected"),
            ErrorKind::ServiceUnavailable => write!(f, "service_unavailable"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Absent on responses not produced by the housing routes (e.g. 404s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::OceanProximity;

    #[test]
    fn test_prediction_result_serialization() {
        let result = PredictionResult {
            predicted_price: 452600.0,
            input: HousingFeatures {
                longitude: -122.26,
                latitude: 37.84,
                housing_median_age: 50,
                total_rooms: 2239,
                total_bedrooms: 455,
                population: 990,
                households: 419,
                median_income: 1.9911,
                ocean_proximity: OceanProximity::NearBay,
            },
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(ApiSuccess::new(result).with_message("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"]["predictedPrice"], 452600.0);
        assert_eq!(json["data"]["input"]["total_rooms"], 2239);
    }

    #[test]
    fn test_model_status_accepts_legacy_name() {
        let status: ModelStatus = serde_json::from_str(
            r#"{"modelLoaded": true, "featureColumns": ["a"], "validOceanProximity": ["INLAND"]}"#,
        )
        .unwrap();
        assert!(status.loaded);
        assert_eq!(status.feature_columns, vec!["a".to_string()]);
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorBody {
            error: "boom".to_string(),
            kind: Some(ErrorKind::ServiceUnavailable),
            details: vec![],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"boom","kind":"service_unavailable"}"#);
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_only_unavailability_is_transient() {
        assert!(ErrorKind::ServiceUnavailable.is_transient());
        assert!(!ErrorKind::UpstreamRejected.is_transient());
        assert!(!ErrorKind::Validation.is_transient());
    }
}
