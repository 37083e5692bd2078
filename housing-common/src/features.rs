//! Housing feature types accepted by the prediction pipeline.

use serde::{Deserialize, Serialize};

/// Distance class of a block group relative to the ocean.
///
/// The wire values are matched exactly: no case folding or trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OceanProximity {
    #[serde(rename = "NEAR BAY")]
    NearBay,
    #[serde(rename = "INLAND")]
    Inland,
    #[serde(rename = "ISLAND")]
    Island,
    #[serde(rename = "NEAR OCEAN")]
    NearOcean,
    #[serde(rename = "<1H OCEAN")]
    LessThanOneHourOcean,
}

impl OceanProximity {
    /// All variants in their canonical order.
    pub const ALL: [OceanProximity; 5] = [
        OceanProximity::NearBay,
        OceanProximity::Inland,
        OceanProximity::Island,
        OceanProximity::NearOcean,
        OceanProximity::LessThanOneHourOcean,
    ];

    /// The exact wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OceanProximity::NearBay => "NEAR BAY",
            OceanProximity::Inland => "INLAND",
            OceanProximity::Island => "ISLAND",
            OceanProximity::NearOcean => "NEAR OCEAN",
            OceanProximity::LessThanOneHourOcean => "<1H OCEAN",
        }
    }

    /// Parse a wire value. Case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    /// Human-readable label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            OceanProximity::NearBay => "Near Bay",
            OceanProximity::Inland => "Inland",
            OceanProximity::Island => "Island",
            OceanProximity::NearOcean => "Near Ocean",
            OceanProximity::LessThanOneHourOcean => "<1H Ocean",
        }
    }
}

impl std::fmt::Display for OceanProximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated set of block-group features.
///
/// Only [`crate::schema::validate`] should be used to build one from
/// untrusted input; the serde impls exist for the wire and for tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingFeatures {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: i64,
    pub total_rooms: i64,
    pub total_bedrooms: i64,
    pub population: i64,
    pub households: i64,
    pub median_income: f64,
    pub ocean_proximity: OceanProximity,
}
