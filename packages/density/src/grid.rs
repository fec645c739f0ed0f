//! Validated venue zone grid.

use std::collections::{BTreeMap, BTreeSet};

use crowd_guard_density_models::{Zone, ZonePosition};

use crate::DensityError;

/// A rectangular grid of zones.
///
/// Construction checks that every zone lies inside the grid and that zone
/// IDs, zone names and cells are all unique. Cells without a zone are
/// allowed.
#[derive(Debug, Clone)]
pub struct ZoneGrid {
    columns: u32,
    rows: u32,
    zones: Vec<Zone>,
    /// (x, y) -> index into `zones`
    cells: BTreeMap<(u32, u32), usize>,
    /// zone name -> index into `zones`
    by_name: BTreeMap<String, usize>,
}

impl ZoneGrid {
    /// Builds a grid from its dimensions and zones.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::Layout`] if a dimension is zero, a zone lies
    /// outside the grid, or a zone ID, name or cell is used twice.
    pub fn new(columns: u32, rows: u32, zones: Vec<Zone>) -> Result<Self, DensityError> {
        if columns == 0 || rows == 0 {
            return Err(layout_error(format!(
                "grid must be at least 1x1, got {columns}x{rows}"
            )));
        }

        let mut cells = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        let mut ids = BTreeSet::new();

        for (idx, zone) in zones.iter().enumerate() {
            if zone.zone_id.is_empty() || zone.zone_name.is_empty() {
                return Err(layout_error(format!(
                    "zone at ({}, {}) has an empty id or name",
                    zone.x_coord, zone.y_coord
                )));
            }
            if zone.x_coord >= columns || zone.y_coord >= rows {
                return Err(layout_error(format!(
                    "zone {} at ({}, {}) is outside the {columns}x{rows} grid",
                    zone.zone_name, zone.x_coord, zone.y_coord
                )));
            }
            if !ids.insert(zone.zone_id.clone()) {
                return Err(layout_error(format!("duplicate zone id {}", zone.zone_id)));
            }
            if by_name.insert(zone.zone_name.clone(), idx).is_some() {
                return Err(layout_error(format!(
                    "duplicate zone name {}",
                    zone.zone_name
                )));
            }
            if let Some(&other) = cells.get(&(zone.x_coord, zone.y_coord)) {
                let other: &Zone = &zones[other];
                return Err(layout_error(format!(
                    "zones {} and {} share cell ({}, {})",
                    other.zone_name, zone.zone_name, zone.x_coord, zone.y_coord
                )));
            }
            cells.insert((zone.x_coord, zone.y_coord), idx);
        }

        Ok(Self {
            columns,
            rows,
            zones,
            cells,
            by_name,
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

    /// All zones in configuration order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns the zone occupying a cell, if any.
    #[must_use]
    pub fn zone_at(&self, x: u32, y: u32) -> Option<&Zone> {
        self.cells.get(&(x, y)).map(|&idx| &self.zones[idx])
    }

    /// Looks up a zone by its display name.
    #[must_use]
    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.by_name.get(name).map(|&idx| &self.zones[idx])
    }

    /// Returns the grid row by row, top to bottom, with `None` for empty
    /// cells.
    #[must_use]
    pub fn layout(&self) -> Vec<Vec<Option<&Zone>>> {
        (0..self.rows)
            .map(|y| (0..self.columns).map(|x| self.zone_at(x, y)).collect())
            .collect()
    }

    /// Classifies where a zone sits relative to the grid border.
    ///
    /// A single-row or single-column grid has no interior.
    #[must_use]
    pub const fn position(&self, zone: &Zone) -> ZonePosition {
        let on_x_border = zone.x_coord == 0 || zone.x_coord + 1 == self.columns;
        let on_y_border = zone.y_coord == 0 || zone.y_coord + 1 == self.rows;

        match (on_x_border, on_y_border) {
            (true, true) => ZonePosition::Corner,
            (true, false) | (false, true) => ZonePosition::Edge,
            (false, false) => ZonePosition::Interior,
        }
    }

    /// Euclidean distance from the zone's cell to the geometric centre of
    /// the grid, in cells.
    #[must_use]
    pub fn distance_from_center(&self, zone: &Zone) -> f64 {
        let center_x = f64::from(self.columns - 1) / 2.0;
        let center_y = f64::from(self.rows - 1) / 2.0;
        let dx = f64::from(zone.x_coord) - center_x;
        let dy = f64::from(zone.y_coord) - center_y;
        dx.hypot(dy)
    }
}

fn layout_error(message: String) -> DensityError {
    DensityError::Layout { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, x: u32, y: u32) -> Zone {
        Zone {
            zone_id: name.to_lowercase(),
            zone_name: name.to_string(),
            x_coord: x,
            y_coord: y,
        }
    }

    fn three_by_three() -> ZoneGrid {
        let mut zones = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                zones.push(zone(&format!("Z{x}{y}"), x, y));
            }
        }
        ZoneGrid::new(3, 3, zones).unwrap()
    }

    #[test]
    fn rejects_shared_cells() {
        let err = ZoneGrid::new(2, 2, vec![zone("A", 0, 0), zone("B", 0, 0)]).unwrap_err();
        assert!(matches!(err, DensityError::Layout { .. }), "{err}");
        assert!(err.to_string().contains("share cell"));
    }

    #[test]
    fn rejects_zones_outside_bounds() {
        let err = ZoneGrid::new(2, 2, vec![zone("A", 2, 0)]).unwrap_err();
        assert!(err.to_string().contains("outside"));
        assert!(ZoneGrid::new(2, 2, vec![zone("A", 0, 2)]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids_and_names() {
        let mut dup_id = zone("B", 1, 0);
        dup_id.zone_id = "a".to_string();
        assert!(ZoneGrid::new(2, 1, vec![zone("A", 0, 0), dup_id]).is_err());

        let mut dup_name = zone("A", 1, 0);
        dup_name.zone_id = "other".to_string();
        assert!(ZoneGrid::new(2, 1, vec![zone("A", 0, 0), dup_name]).is_err());
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(ZoneGrid::new(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn layout_is_row_major_with_gaps() {
        let grid = ZoneGrid::new(3, 2, vec![zone("A", 0, 0), zone("B", 2, 1)]).unwrap();
        let layout = grid.layout();

        assert_eq!(layout.len(), 2);
        assert!(layout.iter().all(|row| row.len() == 3));
        assert_eq!(layout[0][0].map(|z| z.zone_name.as_str()), Some("A"));
        assert_eq!(layout[1][2].map(|z| z.zone_name.as_str()), Some("B"));
        assert!(layout[0][1].is_none());
    }

    #[test]
    fn lookups_find_configured_zones() {
        let grid = three_by_three();
        assert_eq!(grid.zone_at(1, 2).unwrap().zone_name, "Z12");
        assert_eq!(grid.zone_by_name("Z21").unwrap().x_coord, 2);
        assert!(grid.zone_by_name("nope").is_none());
        assert!(grid.zone_at(5, 5).is_none());
    }

    #[test]
    fn positions_follow_the_border() {
        let grid = three_by_three();
        assert_eq!(
            grid.position(grid.zone_at(0, 0).unwrap()),
            ZonePosition::Corner
        );
        assert_eq!(
            grid.position(grid.zone_at(2, 2).unwrap()),
            ZonePosition::Corner
        );
        assert_eq!(
            grid.position(grid.zone_at(1, 0).unwrap()),
            ZonePosition::Edge
        );
        assert_eq!(
            grid.position(grid.zone_at(1, 1).unwrap()),
            ZonePosition::Interior
        );
    }

    #[test]
    fn distance_is_measured_from_grid_center() {
        let grid = three_by_three();
        let center = grid.zone_at(1, 1).unwrap();
        let corner = grid.zone_at(0, 0).unwrap();
        assert!(grid.distance_from_center(center).abs() < f64::EPSILON);
        assert!((grid.distance_from_center(corner) - 2.0_f64.sqrt()).abs() < 1e-9);
    }
}
