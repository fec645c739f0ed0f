#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crowd density classification, venue zone grids and heatmap assembly.
//!
//! The classifier in [`classifier`] is a pure function over fixed
//! thresholds. Everything else is built around injected data: a venue
//! layout (embedded TOML or a file on disk, see [`venue`]) and a
//! [`source::ReadingSource`] that produces the current readings, either
//! from a static table or from a remote prediction endpoint.

pub mod classifier;
pub mod grid;
pub mod heatmap;
pub mod source;
pub mod venue;

pub use classifier::{classify, describe, legend};
pub use grid::ZoneGrid;
pub use heatmap::{Heatmap, HeatmapCell, TierSummary};
pub use venue::Venue;

use thiserror::Error;

/// Errors that can occur while classifying readings or loading venues.
#[derive(Debug, Error)]
pub enum DensityError {
    /// A reading was NaN or infinite.
    #[error("Invalid density reading: {value}")]
    InvalidReading {
        /// The offending value.
        value: f64,
    },

    /// The zone layout breaks a grid invariant.
    #[error("Invalid zone layout: {message}")]
    Layout {
        /// Description of the violated invariant.
        message: String,
    },

    /// No built-in venue has this identifier.
    #[error("Unknown venue: {id}")]
    UnknownVenue {
        /// The requested venue identifier.
        id: String,
    },

    /// Venue TOML could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A venue file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request to a reading source failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A reading source answered with an error.
    #[error("Reading source error: {message}")]
    Upstream {
        /// Description of what went wrong.
        message: String,
    },
}
