//! Venue layouts: built-in registry and TOML loading.
//!
//! Built-in venues are `(id, toml_content)` pairs embedded via
//! `include_str!`. Adding a venue means adding a TOML file under `venues/`
//! and an entry here. Deployments with their own floor plan load a TOML
//! file at startup instead.

use std::path::Path;

use crowd_guard_density_models::{DensityReading, EventInfo, VenueLayout};

use crate::{DensityError, ZoneGrid, classify};

/// Identifier of the venue used when none is configured.
pub const DEFAULT_VENUE_ID: &str = "biec";

/// Embedded TOML venue definitions.
const VENUE_TOMLS: &[(&str, &str)] = &[("biec", include_str!("../venues/biec.toml"))];

/// A loaded venue: validated zone grid, event metadata and sample readings.
#[derive(Debug, Clone)]
pub struct Venue {
    /// Unique venue identifier.
    pub id: String,
    /// Human-readable venue name.
    pub name: String,
    /// Event held at the venue.
    pub event: EventInfo,
    /// Validated zone grid.
    pub grid: ZoneGrid,
    /// Sample readings shipped with the layout, ordered by zone name.
    pub sample_readings: Vec<DensityReading>,
}

impl TryFrom<VenueLayout> for Venue {
    type Error = DensityError;

    fn try_from(layout: VenueLayout) -> Result<Self, Self::Error> {
        let grid = ZoneGrid::new(layout.columns, layout.rows, layout.zones)?;

        let sample_readings = layout
            .readings
            .into_iter()
            .map(|(zone_name, value)| {
                if grid.zone_by_name(&zone_name).is_none() {
                    return Err(DensityError::Layout {
                        message: format!("sample reading for unknown zone {zone_name}"),
                    });
                }
                classify(value)?;
                Ok(DensityReading { zone_name, value })
            })
            .collect::<Result<Vec<_>, DensityError>>()?;

        let event = layout.event.unwrap_or_else(|| EventInfo {
            name: layout.name.clone(),
            date: String::new(),
            venue: layout.name.clone(),
        });

        Ok(Self {
            id: layout.id,
            name: layout.name,
            event,
            grid,
            sample_readings,
        })
    }
}

/// Parses and validates a venue from TOML text.
///
/// # Errors
///
/// Returns [`DensityError::Toml`] for malformed TOML,
/// [`DensityError::Layout`] if the zone grid is invalid or a sample reading
/// names an unknown zone, and [`DensityError::InvalidReading`] for a
/// non-finite sample reading.
pub fn parse(toml_str: &str) -> Result<Venue, DensityError> {
    let layout: VenueLayout = toml::from_str(toml_str)?;
    Venue::try_from(layout)
}

/// Reads, parses and validates a venue TOML file.
///
/// # Errors
///
/// Returns [`DensityError::Io`] if the file can't be read, otherwise the
/// same errors as [`parse`].
pub fn load(path: &Path) -> Result<Venue, DensityError> {
    log::info!("Loading venue layout from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let venue = parse(&contents)?;
    log::info!(
        "Loaded venue {} with {} zones",
        venue.id,
        venue.grid.zones().len()
    );
    Ok(venue)
}

/// Returns the IDs of all built-in venues.
#[must_use]
pub fn builtin_ids() -> Vec<&'static str> {
    VENUE_TOMLS.iter().map(|(id, _)| *id).collect()
}

/// Loads a built-in venue by ID.
///
/// # Errors
///
/// Returns [`DensityError::UnknownVenue`] if no built-in venue has this ID,
/// or a parse error if the embedded TOML is invalid.
pub fn builtin(id: &str) -> Result<Venue, DensityError> {
    let (_, toml_str) = VENUE_TOMLS
        .iter()
        .find(|(venue_id, _)| venue_id.eq_ignore_ascii_case(id))
        .ok_or_else(|| DensityError::UnknownVenue { id: id.to_string() })?;
    parse(toml_str)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crowd_guard_density_models::DensityTier;

    use super::*;

    #[test]
    fn all_builtin_venues_parse() {
        for id in builtin_ids() {
            let venue = builtin(id).unwrap_or_else(|e| panic!("venue {id}: {e}"));
            assert_eq!(venue.id, id);
            assert!(!venue.grid.zones().is_empty(), "venue {id} has no zones");
        }
    }

    #[test]
    fn builtin_ids_are_unique() {
        let ids = builtin_ids();
        let unique: BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn default_venue_is_a_full_five_by_four_grid() {
        let venue = builtin(DEFAULT_VENUE_ID).unwrap();
        assert_eq!(venue.grid.columns(), 5);
        assert_eq!(venue.grid.rows(), 4);
        assert_eq!(venue.grid.zones().len(), 20);
        assert!(venue.grid.layout().iter().flatten().all(Option::is_some));
        assert_eq!(venue.event.date, "2025-07-26");
    }

    #[test]
    fn every_default_zone_has_a_sample_reading() {
        let venue = builtin(DEFAULT_VENUE_ID).unwrap();
        assert_eq!(venue.sample_readings.len(), 20);
        for reading in &venue.sample_readings {
            assert!(
                venue.grid.zone_by_name(&reading.zone_name).is_some(),
                "reading for unknown zone {}",
                reading.zone_name
            );
        }
    }

    #[test]
    fn default_samples_match_reference_tiers() {
        let venue = builtin(DEFAULT_VENUE_ID).unwrap();
        let tier_of = |name: &str| {
            let reading = venue
                .sample_readings
                .iter()
                .find(|r| r.zone_name == name)
                .unwrap();
            classify(reading.value).unwrap()
        };
        assert_eq!(tier_of("Z1HC"), DensityTier::High);
        assert_eq!(tier_of("Z2HE"), DensityTier::Low);
        assert_eq!(tier_of("Z3HA"), DensityTier::Medium);
    }

    #[test]
    fn builtin_lookup_ignores_case_and_rejects_unknown() {
        assert!(builtin("BIEC").is_ok());
        assert!(matches!(
            builtin("atlantis"),
            Err(DensityError::UnknownVenue { .. })
        ));
    }

    #[test]
    fn parse_reports_layout_errors() {
        let err = parse(
            r#"
            id = "bad"
            name = "Bad"
            columns = 1
            rows = 1

            [[zones]]
            zone_id = "a"
            zone_name = "A"
            x_coord = 3
            y_coord = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DensityError::Layout { .. }));
    }

    #[test]
    fn parse_fills_event_from_venue_name() {
        let venue = parse(
            r#"
            id = "hall"
            name = "Main Hall"
            columns = 1
            rows = 1
            "#,
        )
        .unwrap();
        assert_eq!(venue.event.venue, "Main Hall");
        assert!(venue.sample_readings.is_empty());
    }

    #[test]
    fn non_finite_sample_reading_is_rejected() {
        for value in ["nan", "inf", "-inf"] {
            let err = parse(&format!(
                r#"
                id = "hall"
                name = "Main Hall"
                columns = 1
                rows = 1

                [[zones]]
                zone_id = "a"
                zone_name = "A"
                x_coord = 0
                y_coord = 0

                [readings]
                A = {value}
                "#
            ))
            .unwrap_err();
            assert!(
                matches!(err, DensityError::InvalidReading { .. }),
                "{value}: {err:?}"
            );
        }
    }

    #[test]
    fn sample_reading_for_unknown_zone_is_rejected() {
        let err = parse(
            r#"
            id = "hall"
            name = "Main Hall"
            columns = 1
            rows = 1

            [[zones]]
            zone_id = "a"
            zone_name = "A"
            x_coord = 0
            y_coord = 0

            [readings]
            B = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DensityError::Layout { message } if message.contains('B')));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("/definitely/not/a/venue.toml")).unwrap_err();
        assert!(matches!(err, DensityError::Io(_)));
    }
}
