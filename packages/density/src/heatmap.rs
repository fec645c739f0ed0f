//! Heatmap assembly: zone grid plus current readings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crowd_guard_density_models::{DensityReading, DensityTier, TierDescriptor, Zone, ZonePosition};

use crate::{DensityError, ZoneGrid, classify, describe};

/// One zone of the heatmap with its current reading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCell {
    /// The zone.
    pub zone: Zone,
    /// Where the zone sits relative to the grid border.
    pub position: ZonePosition,
    /// Distance from the grid centre, in cells.
    pub distance_from_center: f64,
    /// Current reading, if the source reported one for this zone.
    pub reading: Option<f64>,
    /// Tier of the reading.
    pub tier: Option<DensityTier>,
    /// Label and color to render. [`TierDescriptor::UNKNOWN`] without a
    /// reading.
    pub descriptor: TierDescriptor,
}

/// Number of zones per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSummary {
    /// Zones classified low.
    pub low: usize,
    /// Zones classified medium.
    pub medium: usize,
    /// Zones classified high.
    pub high: usize,
    /// Zones without a reading.
    pub unknown: usize,
}

/// A classified snapshot of the whole venue.
#[derive(Debug, Clone)]
pub struct Heatmap {
    columns: u32,
    rows: u32,
    /// One cell per zone, in grid configuration order.
    cells: Vec<HeatmapCell>,
}

impl Heatmap {
    /// Classifies `readings` against the zones of `grid`.
    ///
    /// Readings for zones the grid doesn't know are logged and ignored. If
    /// a zone is reported more than once the last reading wins.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::InvalidReading`] if any reading for a known
    /// zone is NaN or infinite.
    pub fn build(grid: &ZoneGrid, readings: &[DensityReading]) -> Result<Self, DensityError> {
        let mut by_zone: BTreeMap<&str, f64> = BTreeMap::new();
        for reading in readings {
            if grid.zone_by_name(&reading.zone_name).is_none() {
                log::warn!(
                    "Ignoring density reading for unknown zone {}",
                    reading.zone_name
                );
                continue;
            }
            by_zone.insert(reading.zone_name.as_str(), reading.value);
        }

        let cells = grid
            .zones()
            .iter()
            .map(|zone| -> Result<HeatmapCell, DensityError> {
                let reading = by_zone.get(zone.zone_name.as_str()).copied();
                let tier = reading.map(classify).transpose()?;
                Ok(HeatmapCell {
                    zone: zone.clone(),
                    position: grid.position(zone),
                    distance_from_center: grid.distance_from_center(zone),
                    reading,
                    tier,
                    descriptor: tier.map_or(TierDescriptor::UNKNOWN, describe),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cells,
        })
    }

    /// Grid width.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Grid height.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// All cells in grid configuration order.
    #[must_use]
    pub fn cells(&self) -> &[HeatmapCell] {
        &self.cells
    }

    /// Looks up the cell of a zone by name.
    #[must_use]
    pub fn cell(&self, zone_name: &str) -> Option<&HeatmapCell> {
        self.cells.iter().find(|c| c.zone.zone_name == zone_name)
    }

    /// Returns the cells row by row, top to bottom, with `None` where the
    /// grid has no zone.
    #[must_use]
    pub fn layout(&self) -> Vec<Vec<Option<&HeatmapCell>>> {
        let mut grid: Vec<Vec<Option<&HeatmapCell>>> = (0..self.rows)
            .map(|_| (0..self.columns).map(|_| None).collect())
            .collect();

        for cell in &self.cells {
            let (x, y) = (cell.zone.x_coord as usize, cell.zone.y_coord as usize);
            grid[y][x] = Some(cell);
        }

        grid
    }

    /// Counts zones per tier.
    #[must_use]
    pub fn summary(&self) -> TierSummary {
        let mut summary = TierSummary::default();
        for cell in &self.cells {
            match cell.tier {
                Some(DensityTier::Low) => summary.low += 1,
                Some(DensityTier::Medium) => summary.medium += 1,
                Some(DensityTier::High) => summary.high += 1,
                None => summary.unknown += 1,
            }
        }
        summary
    }

    /// Returns up to `limit` zones with readings, most crowded first.
    ///
    /// Equal readings are ordered by zone name.
    #[must_use]
    pub fn hotspots(&self, limit: usize) -> Vec<&HeatmapCell> {
        let mut ranked: Vec<&HeatmapCell> =
            self.cells.iter().filter(|c| c.reading.is_some()).collect();

        ranked.sort_by(|a, b| {
            let (a_value, b_value) = (a.reading.unwrap_or(0.0), b.reading.unwrap_or(0.0));
            b_value
                .partial_cmp(&a_value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.zone.zone_name.cmp(&b.zone.zone_name))
        });
        ranked.truncate(limit);
        ranked
    }
}
