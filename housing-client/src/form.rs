//! Prediction form: raw user input, pre-submission validation and the
//! submission lifecycle.
//!
//! Validation runs the same [`housing_common::validate`] the server runs, so
//! anything the form lets through is accepted by the server's schema and
//! anything it blocks would have been rejected there too.

use std::collections::HashMap;

use housing_common::schema::{rule, FIELDS};
use housing_common::{
    validate, FieldKind, HousingFeatures, OceanProximity, PredictionResult, ValidationErrors,
};
use serde_json::{Map, Number, Value};
use tokio::sync::watch;

use crate::api::PredictionBackend;
use crate::error::{ClientError, Result};

/// Field values exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    values: HashMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from an existing set of features.
    pub fn from_features(features: &HousingFeatures) -> Self {
        let mut input = Self::new();
        if let Ok(Value::Object(map)) = serde_json::to_value(features) {
            for (field, value) in map {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                input.set(&field, text);
            }
        }
        input
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.values.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Build the untyped payload the schema validates.
    ///
    /// Blank fields are left out. Numeric text becomes a JSON number; text
    /// that is not numeric is kept as a string so it fails as a type mismatch.
    /// Choice fields are passed through untouched, surrounding spaces included.
    pub fn to_payload(&self) -> Value {
        let mut payload = Map::new();

        for rule in FIELDS.iter() {
            let Some(raw) = self.get(rule.name).filter(|s| !s.trim().is_empty()) else {
                continue;
            };

            let value = match rule.kind {
                FieldKind::Enumeration => Value::String(raw.to_string()),
                FieldKind::Real | FieldKind::Integer => {
                    let text = raw.trim();
                    parse_number(text).unwrap_or_else(|| Value::String(text.to_string()))
                }
            };
            payload.insert(rule.name.to_string(), value);
        }

        Value::Object(payload)
    }
}

/// Label shown next to a form field.
pub fn field_label(field: &str) -> Option<&'static str> {
    rule(field).map(|rule| rule.label)
}

/// `(wire value, label)` pairs for the ocean proximity picker.
pub fn proximity_choices() -> Vec<(&'static str, &'static str)> {
    OceanProximity::ALL
        .into_iter()
        .map(|p| (p.as_str(), p.label()))
        .collect()
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Where a submission currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    /// Blocked before dispatch; the form is idle again, showing these errors.
    Invalid(ValidationErrors),
    Submitting,
    Succeeded(PredictionResult),
    Failed(String),
}

impl SubmissionState {
    /// A submission is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            SubmissionState::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Drives one form through validation and submission.
///
/// State changes are published on a watch channel; see [`Self::subscribe`].
pub struct PredictionForm<B> {
    backend: B,
    state: watch::Sender<SubmissionState>,
}

impl<B: PredictionBackend> PredictionForm<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self { backend, state }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Validate `input` and, if it passes, send it for prediction.
    ///
    /// Returns the state the submission ended in. Fails only with
    /// [`ClientError::Busy`] when another submission is still in flight.
    pub async fn submit(&self, input: &FormInput) -> Result<SubmissionState> {
        let accepted = self.state.send_if_modified(|state| {
            if state.is_busy() {
                false
            } else {
                *state = SubmissionState::Validating;
                true
            }
        });
        if !accepted {
            return Err(ClientError::Busy);
        }
        let in_flight = InFlight::new(&self.state);

        let features = match validate(&input.to_payload()) {
            Ok(features) => features,
            Err(errors) => {
                tracing::debug!("Form blocked: {}", errors);
                return Ok(in_flight.settle(SubmissionState::Invalid(errors)));
            }
        };

        self.transition(SubmissionState::Submitting);

        let outcome = match self.backend.predict(&features).await {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(e) => {
                tracing::warn!("Prediction request failed: {}", e);
                SubmissionState::Failed(e.to_string())
            }
        };

        Ok(in_flight.settle(outcome))
    }

    /// Clear any result, error or validation messages.
    ///
    /// A submission whose future is dropped before it finishes puts the form
    /// back to idle on its own.
    pub fn reset(&self) {
        self.transition(SubmissionState::Idle);
    }

    fn transition(&self, next: SubmissionState) -> SubmissionState {
        self.state.send_replace(next.clone());
        next
    }
}

/// Returns the form to idle if a submission is dropped before it settles.
struct InFlight<'a> {
    state: &'a watch::Sender<SubmissionState>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<SubmissionState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, next: SubmissionState) -> SubmissionState {
        self.settled = true;
        self.state.send_replace(next.clone());
        next
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Submission abandoned before completion");
            self.state.send_replace(SubmissionState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use housing_common::timestamp_now;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct StubBackend {
        fail: bool,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubBackend {
        fn ok() -> Self {
            Self {
                fail: false,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PredictionBackend for StubBackend {
        async fn predict(&self, features: &HousingFeatures) -> Result<PredictionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ClientError::Network);
            }
            Ok(PredictionResult {
                predicted_price: 452600.0,
                input: features.clone(),
                timestamp: timestamp_now(),
            })
        }
    }

    fn filled() -> FormInput {
        FormInput::new()
            .with("longitude", "-122.26")
            .with("latitude", "37.84")
            .with("housing_median_age", "50")
            .with("total_rooms", "2239")
            .with("total_bedrooms", "455")
            .with("population", "990")
            .with("households", "419")
            .with("median_income", "1.9911")
            .with("ocean_proximity", "NEAR BAY")
    }

    #[test]
    fn test_payload_conversion() {
        let payload = filled()
            .with("population", " abc ")
            .with("households", "   ")
            .to_payload();
        assert_eq!(payload["total_rooms"], 2239);
        assert_eq!(payload["median_income"], 1.9911);
        assert_eq!(payload["population"], "abc");
        assert!(payload.get("households").is_none());
    }

    #[test]
    fn test_padded_choice_is_not_normalized() {
        let input = filled().with("ocean_proximity", " NEAR BAY ");
        let payload = input.to_payload();
        assert_eq!(payload["ocean_proximity"], " NEAR BAY ");

        let errors = validate(&payload).unwrap_err();
        assert!(errors
            .for_field("ocean_proximity")
            .unwrap()
            .starts_with("Ocean proximity must be one of"));
    }

    #[test]
    fn test_prefill_round_trips() {
        let features = validate(&filled().to_payload()).unwrap();
        let input = FormInput::from_features(&features);
        assert_eq!(input.get("ocean_proximity"), Some("NEAR BAY"));
        assert_eq!(validate(&input.to_payload()).unwrap(), features);
    }

    #[tokio::test]
    async fn test_valid_submission_succeeds() {
        let form = PredictionForm::new(StubBackend::ok());
        let state = form.submit(&filled()).await.unwrap();

        let result = state.result().unwrap();
        assert_eq!(result.input.ocean_proximity, OceanProximity::NearBay);
        assert_eq!(form.state(), state);
    }

    #[tokio::test]
    async fn test_invalid_input_is_blocked_before_dispatch() {
        let form = PredictionForm::new(StubBackend::ok());
        let mut input = filled().with("total_rooms", "2239.5");
        input.clear("latitude");

        let state = form.submit(&input).await.unwrap();
        let errors = state.errors().unwrap();
        assert_eq!(errors.for_field("latitude"), Some("Latitude is required"));
        assert_eq!(errors.for_field("total_rooms"), Some("Total rooms must be an integer"));
        assert_eq!(form.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_then_reset() {
        let form = PredictionForm::new(StubBackend {
            fail: true,
            ..StubBackend::ok()
        });

        let state = form.submit(&filled()).await.unwrap();
        assert_eq!(
            state.error_message(),
            Some("Network error. Please check your connection.")
        );

        form.reset();
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_second_submission_refused_while_in_flight() {
        let form = Arc::new(PredictionForm::new(StubBackend {
            delay: Duration::from_millis(200),
            ..StubBackend::ok()
        }));
        let mut rx = form.subscribe();

        let first = {
            let form = form.clone();
            tokio::spawn(async move { form.submit(&filled()).await })
        };

        rx.wait_for(|s| *s == SubmissionState::Submitting)
            .await
            .unwrap();
        assert!(matches!(
            form.submit(&filled()).await,
            Err(ClientError::Busy)
        ));

        let finished = first.await.unwrap().unwrap();
        assert!(finished.result().is_some());
        assert_eq!(form.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_submission_frees_the_form() {
        let form = PredictionForm::new(StubBackend {
            delay: Duration::from_secs(5),
            ..StubBackend::ok()
        });
        let mut rx = form.subscribe();

        {
            let input = filled();
            let pending = form.submit(&input);
            tokio::pin!(pending);
            tokio::select! {
                _ = &mut pending => panic!("submission should still be in flight"),
                _ = rx.wait_for(|s| *s == SubmissionState::Submitting) => {}
            }
        }

        assert_eq!(form.state(), SubmissionState::Idle);
        let next = form.submit(&filled().with("latitude", "91")).await.unwrap();
        assert!(next.errors().is_some());
    }

    #[test]
    fn test_picker_labels_come_from_shared_tables() {
        assert_eq!(field_label("median_income"), Some("Median income"));
        assert_eq!(field_label("rooms"), None);

        let choices = proximity_choices();
        assert_eq!(choices.len(), OceanProximity::ALL.len());
        assert!(choices.contains(&("<1H OCEAN", "<1H Ocean")));
    }
}
