#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory registry of active incident reports.
//!
//! The [`IncidentRegistry`] is the only owner of the incident list. Reports
//! enter through [`IncidentRegistry::record`], leave through
//! [`IncidentRegistry::resolve`], and are never edited in between.
//! Iteration always follows insertion order so dashboards render a stable
//! list.
//!
//! The registry itself is not synchronized. Callers sharing it between
//! threads wrap it in a `RwLock` so that `record`/`resolve` are serialized
//! and readers see a consistent snapshot.

use chrono::{DateTime, Utc};
use crowd_guard_incident_models::{
    CategoryCount, Incident, IncidentCategory, IncidentDraft, IncidentId, IncidentSummary,
};
use thiserror::Error;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncidentError {
    /// A required field was missing or malformed.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The category is outside the supported category set.
    #[error("Unknown incident category: {category:?}")]
    InvalidCategory {
        /// The category text as submitted.
        category: String,
    },

    /// No active incident has this identity.
    #[error("No active incident with id {id}")]
    NotFound {
        /// The identity that was looked up.
        id: IncidentId,
    },
}

/// Insertion-ordered set of active incidents.
#[derive(Debug, Default, Clone)]
pub struct IncidentRegistry {
    incidents: Vec<Incident>,
}

impl IncidentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            incidents: Vec::new(),
        }
    }

    /// Creates a registry seeded with the given drafts, recorded in order
    /// with the current time.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure. Nothing is kept in that case.
    pub fn seeded<I>(drafts: I) -> Result<Self, IncidentError>
    where
        I: IntoIterator<Item = IncidentDraft>,
    {
        let mut registry = Self::new();
        for draft in drafts {
            registry.record(draft)?;
        }
        Ok(registry)
    }

    /// Validates a draft and appends it as a new active incident stamped
    /// with the current time.
    ///
    /// # Errors
    ///
    /// * [`IncidentError::InvalidCategory`] if the category is unknown
    /// * [`IncidentError::Validation`] if the description is blank
    pub fn record(&mut self, draft: IncidentDraft) -> Result<IncidentId, IncidentError> {
        self.record_at(draft, Utc::now())
    }

    /// Same as [`Self::record`] with an explicit report time.
    ///
    /// # Errors
    ///
    /// * [`IncidentError::InvalidCategory`] if the category is unknown
    /// * [`IncidentError::Validation`] if the description is blank
    pub fn record_at(
        &mut self,
        draft: IncidentDraft,
        reported_at: DateTime<Utc>,
    ) -> Result<IncidentId, IncidentError> {
        let incident = validate(draft, reported_at)?;
        let id = incident.id;

        log::info!(
            "Recorded {} incident {id} at {}",
            incident.category,
            incident.location.as_deref().unwrap_or("unknown location")
        );

        self.incidents.push(incident);
        Ok(id)
    }

    /// Removes an incident from the active set and returns it.
    ///
    /// Resolving the same identity twice fails the second time.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::NotFound`] if `id` is not active.
    pub fn resolve(&mut self, id: IncidentId) -> Result<Incident, IncidentError> {
        let idx = self
            .incidents
            .iter()
            .position(|i| i.id == id)
            .ok_or(IncidentError::NotFound { id })?;

        // Order-preserving.
        let incident = self.incidents.remove(idx);
        log::info!("Resolved {} incident {id}", incident.category);
        Ok(incident)
    }

    /// Returns the active incidents in a category, in insertion order.
    ///
    /// Matching is case-insensitive. An empty or unknown category yields
    /// an empty list rather than an error.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Incident> {
        let Ok(category) = category.trim().parse::<IncidentCategory>() else {
            log::debug!("No incidents for unknown category {category:?}");
            return Vec::new();
        };

        self.incidents
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }

    /// Returns every active incident in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Incident] {
        &self.incidents
    }

    /// Looks up an active incident by identity.
    #[must_use]
    pub fn get(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Number of active incidents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    /// Whether the active set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Counts active incidents per category.
    #[must_use]
    pub fn summary(&self) -> IncidentSummary {
        let by_category = IncidentCategory::all()
            .iter()
            .map(|&category| CategoryCount {
                category,
                count: self
                    .incidents
                    .iter()
                    .filter(|i| i.category == category)
                    .count(),
            })
            .collect();

        IncidentSummary {
            total: self.incidents.len(),
            by_category,
        }
    }
}

/// Turns a draft into an incident or reports why it can't be recorded.
fn validate(draft: IncidentDraft, reported_at: DateTime<Utc>) -> Result<Incident, IncidentError> {
    let category = draft
        .category
        .trim()
        .parse::<IncidentCategory>()
        .map_err(|_| IncidentError::InvalidCategory {
            category: draft.category.clone(),
        })?;

    let description = draft.description.trim();
    if description.is_empty() {
        return Err(IncidentError::Validation {
            field: "description",
            message: "must not be empty".to_string(),
        });
    }

    Ok(Incident {
        id: IncidentId::new(),
        category,
        reported_at,
        location: non_blank(draft.location),
        description: description.to_string(),
        media_ref: non_blank(draft.media_ref),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 26, hour, minute, 0).unwrap()
    }

    #[test]
    fn record_appends_one_incident_with_fields_intact() {
        let mut registry = IncidentRegistry::new();
        let before = registry.len();

        let id = registry
            .record(
                IncidentDraft::new("Medical", "Attendee fainted near the stage")
                    .with_location("Gate 2")
                    .with_media_ref("IMG_0042.jpg"),
            )
            .unwrap();

        assert_eq!(registry.len(), before + 1);
        assert!(!id.to_string().is_empty());

        let stored = &registry.all()[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.category, IncidentCategory::Medical);
        assert_eq!(stored.description, "Attendee fainted near the stage");
        assert_eq!(stored.location.as_deref(), Some("Gate 2"));
        assert_eq!(stored.media_ref.as_deref(), Some("IMG_0042.jpg"));
    }

    #[test]
    fn record_stamps_the_given_time() {
        let mut registry = IncidentRegistry::new();
        let id = registry
            .record_at(IncidentDraft::new("Panic", "Crowd surge"), at(10, 30))
            .unwrap();
        assert_eq!(registry.get(id).unwrap().reported_at, at(10, 30));
    }

    #[test]
    fn empty_description_is_rejected_without_side_effects() {
        let mut registry = IncidentRegistry::new();
        registry
            .record(IncidentDraft::new("Lost", "Blue backpack"))
            .unwrap();
        let snapshot = registry.all().to_vec();

        for description in ["", "   \n\t"] {
            let err = registry
                .record(IncidentDraft::new("Medical", description))
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    IncidentError::Validation {
                        field: "description",
                        ..
                    }
                ),
                "unexpected error: {err:?}"
            );
        }

        assert_eq!(registry.all(), snapshot.as_slice());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut registry = IncidentRegistry::new();
        let err = registry
            .record(IncidentDraft::new("Fire", "Smoke near food court"))
            .unwrap_err();
        assert_eq!(
            err,
            IncidentError::InvalidCategory {
                category: "Fire".to_string()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn category_is_checked_before_description() {
        let mut registry = IncidentRegistry::new();
        let err = registry.record(IncidentDraft::new("", "")).unwrap_err();
        assert!(matches!(err, IncidentError::InvalidCategory { .. }));
    }

    #[test]
    fn resolve_removes_once_then_reports_not_found() {
        let mut registry = IncidentRegistry::new();
        let id = registry
            .record(IncidentDraft::new("Security", "Fence breach"))
            .unwrap();

        let resolved = registry.resolve(id).unwrap();
        assert_eq!(resolved.id, id);
        assert!(registry.all().iter().all(|i| i.id != id));

        assert_eq!(registry.resolve(id), Err(IncidentError::NotFound { id }));
    }

    #[test]
    fn resolve_unknown_id_fails() {
        let mut registry = IncidentRegistry::new();
        let id = IncidentId::new();
        assert_eq!(registry.resolve(id), Err(IncidentError::NotFound { id }));
    }

    #[test]
    fn resolve_preserves_order_of_remaining_incidents() {
        let mut registry = IncidentRegistry::new();
        let a = registry.record(IncidentDraft::new("Medical", "a")).unwrap();
        let b = registry.record(IncidentDraft::new("Panic", "b")).unwrap();
        let c = registry.record(IncidentDraft::new("Lost", "c")).unwrap();

        registry.resolve(a).unwrap();

        let ids: Vec<IncidentId> = registry.all().iter().map(|i| i.id).collect();
        assert_eq!(ids, [b, c]);
    }

    #[test]
    fn by_category_filters_in_insertion_order() {
        let mut registry = IncidentRegistry::new();
        let t1 = registry
            .record_at(IncidentDraft::new("Medical", "first"), at(10, 15))
            .unwrap();
        registry
            .record_at(IncidentDraft::new("Panic", "second"), at(10, 30))
            .unwrap();
        let t3 = registry
            .record_at(IncidentDraft::new("Medical", "third"), at(11, 10))
            .unwrap();

        let medical: Vec<IncidentId> = registry
            .by_category("Medical")
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(medical, [t1, t3]);

        assert_eq!(registry.by_category("medical").len(), 2);
    }

    #[test]
    fn by_category_is_permissive() {
        let mut registry = IncidentRegistry::new();
        registry
            .record(IncidentDraft::new("Medical", "Sprained ankle"))
            .unwrap();

        assert!(registry.by_category("").is_empty());
        assert!(registry.by_category("Weather").is_empty());
        assert!(registry.by_category("Lost").is_empty());
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let mut registry = IncidentRegistry::new();
        let id = registry
            .record(
                IncidentDraft::new("Lost", "Wallet")
                    .with_location("  ")
                    .with_media_ref(""),
            )
            .unwrap();
        let incident = registry.get(id).unwrap();
        assert_eq!(incident.location, None);
        assert_eq!(incident.media_ref, None);
    }

    #[test]
    fn summary_reports_every_category() {
        let registry = IncidentRegistry::seeded([
            IncidentDraft::new("Medical", "a").with_location("Gate 2"),
            IncidentDraft::new("Panic", "b").with_location("Main Stage"),
            IncidentDraft::new("Security", "c").with_location("VIP Area"),
            IncidentDraft::new("Medical", "d").with_location("Stands"),
        ])
        .unwrap();

        let summary = registry.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_category.len(), IncidentCategory::all().len());
        assert_eq!(summary.count(IncidentCategory::Medical), 2);
        assert_eq!(summary.count(IncidentCategory::Panic), 1);
        assert_eq!(summary.count(IncidentCategory::Lost), 0);
        assert_eq!(summary.count(IncidentCategory::Security), 1);
    }

    #[test]
    fn seeded_stops_at_first_invalid_draft() {
        let err = IncidentRegistry::seeded([
            IncidentDraft::new("Medical", "ok"),
            IncidentDraft::new("Medical", ""),
        ])
        .unwrap_err();
        assert!(matches!(err, IncidentError::Validation { .. }));
    }
}
