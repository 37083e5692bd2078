//! The housing feature constraint table and the validator built on it.
//!
//! Both the API server and the form client validate with [`validate`], so the
//! two can never disagree about what a valid request looks like. The table is
//! the single place where fields, kinds, bounds and messages are declared.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::features::{HousingFeatures, OceanProximity};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Real,
    Integer,
    /// One of [`OceanProximity::ALL`], matched exactly.
    Enumeration,
}

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    fn admits_above(&self, value: f64) -> bool {
        match *self {
            Bound::Inclusive(limit) => value >= limit,
            Bound::Exclusive(limit) => value > limit,
        }
    }

    fn admits_below(&self, value: f64) -> bool {
        match *self {
            Bound::Inclusive(limit) => value <= limit,
            Bound::Exclusive(limit) => value < limit,
        }
    }
}

/// A range limit together with the message shown when it is violated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub bound: Bound,
    /// Appended to the field label, e.g. "must be positive".
    pub message: &'static str,
}

/// Declaration of a single accepted field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    /// Wire name of the field.
    pub name: &'static str,
    /// Human label used as the subject of error messages.
    pub label: &'static str,
    pub kind: FieldKind,
    pub min: Option<Limit>,
    pub max: Option<Limit>,
}

const fn limit(bound: Bound, message: &'static str) -> Option<Limit> {
    Some(Limit { bound, message })
}

/// Every accepted field, in declaration order.
pub static FIELDS: [FieldRule; 9] = [
    FieldRule {
        name: "longitude",
        label: "Longitude",
        kind: FieldKind::Real,
        min: limit(Bound::Inclusive(-180.0), "must be between -180 and 180"),
        max: limit(Bound::Inclusive(180.0), "must be between -180 and 180"),
    },
    FieldRule {
        name: "latitude",
        label: "Latitude",
        kind: FieldKind::Real,
        min: limit(Bound::Inclusive(-90.0), "must be between -90 and 90"),
        max: limit(Bound::Inclusive(90.0), "must be between -90 and 90"),
    },
    FieldRule {
        name: "housing_median_age",
        label: "Housing median age",
        kind: FieldKind::Integer,
        min: limit(Bound::Inclusive(0.0), "must be positive"),
        max: limit(Bound::Inclusive(200.0), "seems unrealistic"),
    },
    FieldRule {
        name: "total_rooms",
        label: "Total rooms",
        kind: FieldKind::Integer,
        min: limit(Bound::Exclusive(0.0), "must be positive"),
        max: None,
    },
    FieldRule {
        name: "total_bedrooms",
        label: "Total bedrooms",
        kind: FieldKind::Integer,
        min: limit(Bound::Inclusive(0.0), "cannot be negative"),
        max: None,
    },
    FieldRule {
        name: "population",
        label: "Population",
        kind: FieldKind::Integer,
        min: limit(Bound::Inclusive(0.0), "cannot be negative"),
        max: None,
    },
    FieldRule {
        name: "households",
        label: "Households",
        kind: FieldKind::Integer,
        min: limit(Bound::Exclusive(0.0), "must be positive"),
        max: None,
    },
    FieldRule {
        name: "median_income",
        label: "Median income",
        kind: FieldKind::Real,
        min: limit(Bound::Exclusive(0.0), "must be positive"),
        max: limit(Bound::Inclusive(20.0), "seems unrealistic"),
    },
    FieldRule {
        name: "ocean_proximity",
        label: "Ocean proximity",
        kind: FieldKind::Enumeration,
        min: None,
        max: None,
    },
];

/// Wire names of all fields, in declaration order.
pub fn feature_columns() -> Vec<&'static str> {
    FIELDS.iter().map(|rule| rule.name).collect()
}

/// Look up the rule for a wire field name.
pub fn rule(name: &str) -> Option<&'static FieldRule> {
    FIELDS.iter().find(|rule| rule.name == name)
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in one payload, in field declaration order.
///
/// Never empty when returned from [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// First message reported for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

enum Checked {
    Number(f64),
    Proximity(OceanProximity),
}

/// Validate an untyped payload against [`FIELDS`].
///
/// All fields are checked; the error lists every failing field once, with the
/// first failed check for that field.
pub fn validate(payload: &Value) -> Result<HousingFeatures, ValidationErrors> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationErrors(vec![FieldError::new(
            "body",
            "Request body must be a JSON object",
        )]));
    };

    let mut errors = Vec::new();
    let mut numbers: Vec<(&'static str, f64)> = Vec::with_capacity(FIELDS.len());
    let mut proximity = None;

    for rule in FIELDS.iter() {
        match check_field(rule, object) {
            Ok(Checked::Number(n)) => numbers.push((rule.name, n)),
            Ok(Checked::Proximity(p)) => proximity = Some(p),
            Err(message) => errors.push(FieldError::new(rule.name, message)),
        }
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    let number = |name: &str| {
        numbers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .unwrap_or_default()
    };
    let ocean_proximity = proximity.ok_or_else(|| {
        ValidationErrors(vec![FieldError::new(
            "ocean_proximity",
            "Ocean proximity is required",
        )])
    })?;

    Ok(HousingFeatures {
        longitude: number("longitude"),
        latitude: number("latitude"),
        housing_median_age: number("housing_median_age") as i64,
        total_rooms: number("total_rooms") as i64,
        total_bedrooms: number("total_bedrooms") as i64,
        population: number("population") as i64,
        households: number("households") as i64,
        median_income: number("median_income"),
        ocean_proximity,
    })
}

fn check_field(rule: &FieldRule, object: &Map<String, Value>) -> Result<Checked, String> {
    let value = match object.get(rule.name) {
        None | Some(Value::Null) => return Err(format!("{} is required", rule.label)),
        Some(value) => value,
    };

    match rule.kind {
        FieldKind::Enumeration => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("{} must be a string", rule.label))?;
            OceanProximity::parse(text).map(Checked::Proximity).ok_or_else(|| {
                let allowed: Vec<&str> = OceanProximity::ALL.iter().map(|p| p.as_str()).collect();
                format!("{} must be one of: {}", rule.label, allowed.join(", "))
            })
        }
        FieldKind::Real | FieldKind::Integer => {
            let n = value
                .as_f64()
                .ok_or_else(|| format!("{} must be a number", rule.label))?;
            if rule.kind == FieldKind::Integer && (n.fract() != 0.0 || n.abs() > MAX_SAFE_INTEGER) {
                return Err(format!("{} must be an integer", rule.label));
            }
            if let Some(min) = rule.min {
                if !min.bound.admits_above(n) {
                    return Err(format!("{} {}", rule.label, min.message));
                }
            }
            if let Some(max) = rule.max {
                if !max.bound.admits_below(n) {
                    return Err(format!("{} {}", rule.label, max.message));
                }
            }
            Ok(Checked::Number(n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "longitude": -122.26,
            "latitude": 37.84,
            "housing_median_age": 50,
            "total_rooms": 2239,
            "total_bedrooms": 455,
            "population": 990,
            "households": 419,
            "median_income": 1.9911,
            "ocean_proximity": "NEAR BAY"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut payload = valid_payload();
        payload[field] = value;
        payload
    }

    fn message_for(payload: &Value, field: &str) -> Option<String> {
        validate(payload)
            .err()
            .and_then(|e| e.for_field(field).map(str::to_string))
    }

    #[test]
    fn test_valid_payload() {
        let features = validate(&valid_payload()).unwrap();
        assert_eq!(features.longitude, -122.26);
        assert_eq!(features.total_rooms, 2239);
        assert_eq!(features.ocean_proximity, OceanProximity::NearBay);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for rule in FIELDS.iter() {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(rule.name);
            let errors = validate(&payload).unwrap_err();
            assert_eq!(errors.len(), 1, "field {}", rule.name);
            assert_eq!(errors.errors()[0].field, rule.name);
            assert_eq!(
                errors.errors()[0].message,
                format!("{} is required", rule.label)
            );
        }
    }

    #[test]
    fn test_null_is_missing() {
        assert_eq!(
            message_for(&with("population", Value::Null), "population").as_deref(),
            Some("Population is required")
        );
    }

    #[test]
    fn test_longitude_bounds_are_inclusive() {
        assert!(validate(&with("longitude", json!(-180))).is_ok());
        assert!(validate(&with("longitude", json!(180))).is_ok());
        assert_eq!(
            message_for(&with("longitude", json!(-181)), "longitude").as_deref(),
            Some("Longitude must be between -180 and 180")
        );
        assert!(validate(&with("longitude", json!(181))).is_err());
    }

    #[test]
    fn test_latitude_bounds() {
        assert!(validate(&with("latitude", json!(90))).is_ok());
        assert!(validate(&with("latitude", json!(-90.5))).is_err());
    }

    #[test]
    fn test_median_income_bounds() {
        assert!(validate(&with("median_income", json!(20))).is_ok());
        assert_eq!(
            message_for(&with("median_income", json!(20.0001)), "median_income").as_deref(),
            Some("Median income seems unrealistic")
        );
        assert_eq!(
            message_for(&with("median_income", json!(0)), "median_income").as_deref(),
            Some("Median income must be positive")
        );
    }

    #[test]
    fn test_ocean_proximity_is_case_sensitive() {
        assert_eq!(
            message_for(&with("ocean_proximity", json!("near bay")), "ocean_proximity").as_deref(),
            Some("Ocean proximity must be one of: NEAR BAY, INLAND, ISLAND, NEAR OCEAN, <1H OCEAN")
        );
        assert!(validate(&with("ocean_proximity", json!("<1H OCEAN"))).is_ok());
        assert_eq!(
            message_for(&with("ocean_proximity", json!(3)), "ocean_proximity").as_deref(),
            Some("Ocean proximity must be a string")
        );
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        assert_eq!(
            message_for(&with("total_rooms", json!(2239.5)), "total_rooms").as_deref(),
            Some("Total rooms must be an integer")
        );
        let features = validate(&with("total_rooms", json!(2239.0))).unwrap();
        assert_eq!(features.total_rooms, 2239);
    }

    #[test]
    fn test_type_mismatch_wins_over_range() {
        assert_eq!(
            message_for(&with("households", json!("-5")), "households").as_deref(),
            Some("Households must be a number")
        );
        assert_eq!(
            message_for(&with("households", json!(0)), "households").as_deref(),
            Some("Households must be positive")
        );
    }

    #[test]
    fn test_all_violations_reported_in_declaration_order() {
        let payload = json!({
            "longitude": 200,
            "latitude": "north",
            "housing_median_age": 201,
            "total_rooms": 0,
            "total_bedrooms": -1,
            "population": -1,
            "households": 1.5,
            "median_income": -2,
        });
        let errors = validate(&payload).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, feature_columns());
        assert_eq!(
            errors.for_field("housing_median_age"),
            Some("Housing median age seems unrealistic")
        );
        assert_eq!(errors.for_field("total_bedrooms"), Some("Total bedrooms cannot be negative"));
    }

    #[test]
    fn test_non_object_payload() {
        let errors = validate(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "body");
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        assert!(validate(&with("median_house_value", json!(1))).is_ok());
    }

    #[test]
    fn test_feature_columns_order() {
        assert_eq!(
            feature_columns(),
            vec![
                "longitude",
                "latitude",
                "housing_median_age",
                "total_rooms",
                "total_bedrooms",
                "population",
                "households",
                "median_income",
                "ocean_proximity",
            ]
        );
        assert_eq!(rule("households").map(|r| r.kind), Some(FieldKind::Integer));
    }
}
