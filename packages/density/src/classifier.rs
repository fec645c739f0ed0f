//! Density tier classification.
//!
//! Thresholds are fixed: above [`HIGH_THRESHOLD`] is high, below
//! [`MEDIUM_THRESHOLD`] is low, and both boundaries belong to the medium
//! tier. Every finite value lands in exactly one tier.

use crowd_guard_density_models::{DensityTier, TierDescriptor};

use crate::DensityError;

/// Lowest value classified as [`DensityTier::Medium`].
pub const MEDIUM_THRESHOLD: f64 = 2.0;

/// Highest value classified as [`DensityTier::Medium`]. Anything above is
/// [`DensityTier::High`].
pub const HIGH_THRESHOLD: f64 = 5.0;

/// Classifies an occupancy reading.
///
/// Negative values classify as [`DensityTier::Low`].
///
/// # Errors
///
/// Returns [`DensityError::InvalidReading`] for NaN or infinite input.
pub fn classify(value: f64) -> Result<DensityTier, DensityError> {
    if !value.is_finite() {
        return Err(DensityError::InvalidReading { value });
    }

    Ok(if value > HIGH_THRESHOLD {
        DensityTier::High
    } else if value >= MEDIUM_THRESHOLD {
        DensityTier::Medium
    } else {
        DensityTier::Low
    })
}

/// Returns the display label and color token for a tier.
#[must_use]
pub const fn describe(tier: DensityTier) -> TierDescriptor {
    match tier {
        DensityTier::Low => TierDescriptor {
            label: "Low Density",
            color: "#4CAF50",
        },
        DensityTier::Medium => TierDescriptor {
            label: "Medium Density",
            color: "#FF9800",
        },
        DensityTier::High => TierDescriptor {
            label: "High Density",
            color: "#F44336",
        },
    }
}

/// Returns every tier with its descriptor, least crowded first.
#[must_use]
pub const fn legend() -> [(DensityTier, TierDescriptor); 3] {
    [
        (DensityTier::Low, describe(DensityTier::Low)),
        (DensityTier::Medium, describe(DensityTier::Medium)),
        (DensityTier::High, describe(DensityTier::High)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_medium() {
        assert_eq!(classify(2.0).unwrap(), DensityTier::Medium);
        assert_eq!(classify(5.0).unwrap(), DensityTier::Medium);
        assert_eq!(classify(5.0001).unwrap(), DensityTier::High);
        assert_eq!(classify(1.9999).unwrap(), DensityTier::Low);
    }

    #[test]
    fn sample_values_partition_into_tiers() {
        for value in [-3.0, 0.0, 1.0, 1.29, 1.89, 1.98] {
            assert_eq!(classify(value).unwrap(), DensityTier::Low, "{value}");
        }
        for value in [2.03, 2.17, 2.95, 3.19, 4.99] {
            assert_eq!(classify(value).unwrap(), DensityTier::Medium, "{value}");
        }
        for value in [5.32, 6.55, 1000.0] {
            assert_eq!(classify(value).unwrap(), DensityTier::High, "{value}");
        }
    }

    #[test]
    fn reference_zone_readings() {
        let expected = [
            ("Z1HC", 5.32, DensityTier::High),
            ("Z2HE", 1.89, DensityTier::Low),
            ("Z3HA", 2.17, DensityTier::Medium),
        ];
        for (zone, value, tier) in expected {
            assert_eq!(classify(value).unwrap(), tier, "{zone}");
        }
    }

    #[test]
    fn non_finite_readings_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                classify(value),
                Err(DensityError::InvalidReading { .. })
            ));
        }
    }

    #[test]
    fn classification_is_deterministic() {
        for value in [1.5, 2.0, 3.3, 5.0, 5.1] {
            assert_eq!(classify(value).unwrap(), classify(value).unwrap());
        }
    }

    #[test]
    fn every_tier_has_a_distinct_descriptor() {
        let legend = legend();
        assert_eq!(legend.len(), DensityTier::all().len());
        for (i, (tier, descriptor)) in legend.iter().enumerate() {
            assert_eq!(*tier, DensityTier::all()[i]);
            assert_eq!(*descriptor, describe(*tier));
            assert_ne!(*descriptor, TierDescriptor::UNKNOWN);
        }
        assert_eq!(describe(DensityTier::High).label, "High Density");
        assert_eq!(describe(DensityTier::Low).color, "#4CAF50");
    }
}
