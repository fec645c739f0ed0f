#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crowd safety server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the registry and density types to allow independent evolution of
//! the API contract.

use chrono::{DateTime, Utc};
use crowd_guard_density_models::{DensityTier, TierDescriptor, ZonePosition};
use crowd_guard_incident_models::{Incident, IncidentCategory, IncidentId};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// The monitored event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Identifier of the venue layout in use.
    pub venue_id: String,
    /// Event name.
    pub name: String,
    /// Event date.
    pub date: String,
    /// Venue display name.
    pub venue: String,
}

/// An incident category the reporting form may offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// Category name, as accepted by `POST /api/incidents`.
    pub name: IncidentCategory,
}

/// An active incident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncident {
    /// Unique incident ID.
    pub id: IncidentId,
    /// Incident category.
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    /// When the incident was reported (ISO 8601).
    pub reported_at: DateTime<Utc>,
    /// Server-local report time as `HH:MM`.
    pub time: String,
    /// Free-text location.
    pub location: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Attached media file name.
    pub media_ref: Option<String>,
}

impl From<Incident> for ApiIncident {
    fn from(incident: Incident) -> Self {
        Self {
            time: incident.time_label(),
            id: incident.id,
            category: incident.category,
            reported_at: incident.reported_at,
            location: incident.location,
            description: incident.description,
            media_ref: incident.media_ref,
        }
    }
}

/// Query parameters for the incidents endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentQueryParams {
    /// Only return incidents of this category.
    pub category: Option<String>,
}

/// Response to a successful `POST /api/incidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIncident {
    /// Identity assigned by the registry.
    pub id: IncidentId,
}

/// A venue zone with its grid features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZone {
    /// Unique zone identifier.
    pub zone_id: String,
    /// Display name.
    pub zone_name: String,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Corner, edge or interior.
    pub position: ZonePosition,
    /// Distance from the grid centre, in cells.
    pub distance_from_center: f64,
}

/// A density tier with its display label and color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTier {
    /// The tier. Absent for zones without a reading.
    pub tier: Option<DensityTier>,
    /// Display label.
    pub label: String,
    /// Hex color token.
    pub color: String,
}

impl ApiTier {
    /// Builds an API tier from a tier and its descriptor.
    #[must_use]
    pub fn new(tier: Option<DensityTier>, descriptor: TierDescriptor) -> Self {
        Self {
            tier,
            label: descriptor.label.to_string(),
            color: descriptor.color.to_string(),
        }
    }
}

/// Query parameters for the classify endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyParams {
    /// The reading to classify.
    pub value: f64,
}

/// One zone of the heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeatmapCell {
    /// Zone display name.
    pub zone_name: String,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Current reading, if any.
    pub value: Option<f64>,
    /// Classification of `value`.
    #[serde(flatten)]
    pub tier: ApiTier,
}

/// Number of zones per tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTierSummary {
    /// Low density zones.
    pub low: usize,
    /// Medium density zones.
    pub medium: usize,
    /// High density zones.
    pub high: usize,
    /// Zones without a reading.
    pub unknown: usize,
}

/// A zone ranked by reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHotspot {
    /// Zone display name.
    pub zone_name: String,
    /// Current reading.
    pub value: f64,
    /// Tier of `value`.
    pub tier: DensityTier,
}

/// Full heatmap response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeatmap {
    /// Grid width.
    pub columns: u32,
    /// Grid height.
    pub rows: u32,
    /// Row-major cells; `None` where the grid has no zone.
    pub layout: Vec<Vec<Option<ApiHeatmapCell>>>,
    /// Tier counts.
    pub summary: ApiTierSummary,
    /// Most crowded zones first.
    pub hotspots: Vec<ApiHotspot>,
}

/// Query parameters for the heatmap endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQueryParams {
    /// Maximum number of hotspots to return.
    pub hotspots: Option<usize>,
}

/// Request body for `POST /api/assistant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    /// Session to continue. A new session is created when absent or
    /// unknown.
    pub session_id: Option<String>,
    /// `admin`, `responder` or `invitee` (`user` is accepted too).
    pub user_type: Option<String>,
    /// The user's message.
    pub query: Option<String>,
}

/// Response body for `POST /api/assistant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    /// Session the reply belongs to. Send it back to continue the
    /// conversation.
    pub session_id: String,
    /// Assistant reply text.
    pub reply: String,
    /// Whether the reply is the offline fallback.
    pub degraded: bool,
}
