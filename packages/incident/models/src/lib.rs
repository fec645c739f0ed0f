#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident category set, identity and report types.
//!
//! These types are shared by the incident registry, the HTTP API and the
//! assistant prompt builder. An [`IncidentDraft`] is what a reporting form
//! submits; an [`Incident`] is what the registry stores once the draft has
//! been validated and stamped with an identity and a report time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Category of a reported incident.
///
/// Parsing is ASCII case-insensitive, so dashboards may pass `"medical"` or
/// `"MEDICAL"` interchangeably.
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
#[strum(ascii_case_insensitive)]
#[non_exhaustive]
pub enum IncidentCategory {
    /// Injury, illness or any situation needing first aid
    Medical,
    /// Crowd panic, stampede risk or distress
    Panic,
    /// Lost person or lost item
    Lost,
    /// Threats, fights, suspicious behavior or unauthorized access
    Security,
}

impl IncidentCategory {
    /// Returns all variants of this enum in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Medical, Self::Panic, Self::Lost, Self::Security]
    }
}

/// Registry-assigned identity of an incident.
///
/// Distinct from every display field so two reports with identical
/// content are still separate incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(Uuid);

impl IncidentId {
    /// Generates a fresh random identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for IncidentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for IncidentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// An incident report as submitted by a reporting form, before validation.
///
/// The category is kept as raw text so the registry can reject values
/// outside the closed category set with a dedicated error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDraft {
    /// Category name, e.g. `"Medical"`.
    #[serde(rename = "type", default)]
    pub category: String,
    /// Free-text description. Required.
    #[serde(default)]
    pub description: String,
    /// Free-text location, e.g. `"Gate 2"`.
    #[serde(default)]
    pub location: Option<String>,
    /// Name of a media file attached by the reporting client. The file
    /// itself stays with the client.
    #[serde(default)]
    pub media_ref: Option<String>,
}

impl IncidentDraft {
    /// Creates a draft with a category and description and no location or
    /// media.
    #[must_use]
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            location: None,
            media_ref: None,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the attached media reference.
    #[must_use]
    pub fn with_media_ref(mut self, media_ref: impl Into<String>) -> Self {
        self.media_ref = Some(media_ref.into());
        self
    }
}

/// An active incident held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Registry-assigned identity.
    pub id: IncidentId,
    /// Category, fixed for the incident's lifetime.
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    /// When the incident was recorded.
    pub reported_at: DateTime<Utc>,
    /// Free-text location, if given.
    pub location: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Name of the attached media file, if any.
    pub media_ref: Option<String>,
}

impl Incident {
    /// Returns the local wall-clock time of the report as `HH:MM`.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.reported_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

/// Number of active incidents in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: IncidentCategory,
    /// Active incidents in it.
    pub count: usize,
}

/// Totals over the active incident set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    /// Total active incidents.
    pub total: usize,
    /// One entry per category in [`IncidentCategory::all`] order, zero
    /// counts included.
    pub by_category: Vec<CategoryCount>,
}

impl IncidentSummary {
    /// Returns the count for a single category.
    #[must_use]
    pub fn count(&self, category: IncidentCategory) -> usize {
        self.by_category
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}
