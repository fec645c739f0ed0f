#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Venue zone, density tier and reading types.
//!
//! Defines the TOML schema for venue layouts and the plain types the
//! density classifier and heatmap builder work with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A fixed cell of the monitored venue grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    /// Unique zone identifier (e.g., `"z1ha"`).
    pub zone_id: String,
    /// Unique display name (e.g., `"Z1HA"`). Readings are keyed by this.
    pub zone_name: String,
    /// Column, counted from the left edge starting at 0.
    pub x_coord: u32,
    /// Row, counted from the top edge starting at 0.
    pub y_coord: u32,
}

/// Discrete crowd density classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DensityTier {
    /// Below 2.0
    Low,
    /// 2.0 to 5.0 inclusive
    Medium,
    /// Above 5.0
    High,
}

impl DensityTier {
    /// Returns all tiers from least to most crowded.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Display label and color token for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierDescriptor {
    /// Human-readable label, e.g. `"High Density"`.
    pub label: &'static str,
    /// Hex color token, e.g. `"#F44336"`.
    pub color: &'static str,
}

impl TierDescriptor {
    /// Descriptor for a zone that has no reading.
    pub const UNKNOWN: Self = Self {
        label: "Unknown",
        color: "#9E9E9E",
    };
}

/// An occupancy metric reported for one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityReading {
    /// Name of the zone this reading belongs to.
    pub zone_name: String,
    /// Occupancy metric. Unbounded; sample data spans roughly 1.0 to 6.6.
    pub value: f64,
}

impl DensityReading {
    /// Creates a reading.
    #[must_use]
    pub fn new(zone_name: impl Into<String>, value: f64) -> Self {
        Self {
            zone_name: zone_name.into(),
            value,
        }
    }
}

/// Where a zone sits relative to the grid border.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZonePosition {
    /// On two borders at once.
    Corner,
    /// On exactly one border.
    Edge,
    /// Not on any border.
    Interior,
}

/// Event metadata shown on dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventInfo {
    /// Event name.
    pub name: String,
    /// Event date (free text, typically ISO 8601).
    pub date: String,
    /// Venue display name.
    pub venue: String,
}

/// A venue layout, deserialized from TOML.
///
/// ```toml
/// id = "biec"
/// name = "Bangalore International Exhibition Centre"
/// columns = 5
/// rows = 4
///
/// [event]
/// name = "Agentic AI Day"
/// date = "2025-07-26"
/// venue = "BIEC"
///
/// [[zones]]
/// zone_id = "z1ha"
/// zone_name = "Z1HA"
/// x_coord = 0
/// y_coord = 0
///
/// [readings]
/// Z1HA = 2.95
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueLayout {
    /// Unique venue identifier.
    pub id: String,
    /// Human-readable venue name.
    pub name: String,
    /// Grid width.
    pub columns: u32,
    /// Grid height.
    pub rows: u32,
    /// Event held at the venue, if configured.
    #[serde(default)]
    pub event: Option<EventInfo>,
    /// Zones of the grid.
    #[serde(default)]
    pub zones: Vec<Zone>,
    /// Sample density readings keyed by zone name.
    #[serde(default)]
    pub readings: BTreeMap<String, f64>,
}
