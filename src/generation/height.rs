use bevy::log::debug;

use super::Block;
use crate::config::*;
use crate::error::ConfigError;
use crate::poly::{Kernel, Segment};

/// Piecewise constant distance to height mapping.
///
/// Band `i` covers distances in `(thresholds[i-1], thresholds[i]]`, band 0
/// starts at zero. Anything beyond the last threshold maps to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightBands {
    pub thresholds: Vec<f64>,
    pub heights: Vec<f64>,
}

impl HeightBands {
    pub fn new(thresholds: impl Into<Vec<f64>>, heights: impl Into<Vec<f64>>) -> Self {
        Self { thresholds: thresholds.into(), heights: heights.into() }
    }

    pub fn height_at(&self, distance: f64) -> f64 {
        self.thresholds
            .iter()
            .position(|&r| distance <= r)
            .and_then(|i| self.heights.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn validate(&self, class: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidBands { class, reason: reason.to_string() })
        };
        if self.thresholds.is_empty() {
            return invalid("no bands");
        }
        if self.thresholds.len() != self.heights.len() {
            return invalid("thresholds and heights differ in length");
        }
        if self.thresholds.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return invalid("thresholds must be positive");
        }
        if self.thresholds.windows(2).any(|w| w[1] <= w[0]) {
            return invalid("thresholds must be strictly increasing");
        }
        if self.heights.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return invalid("heights must be non-negative");
        }
        if self.heights.windows(2).any(|w| w[1] > w[0]) {
            return invalid("heights must not grow with distance");
        }
        Ok(())
    }
}

/// One road hierarchy level as seen by the classifier.
#[derive(Debug, Clone, Copy)]
pub struct RoadClass<'a> {
    pub name: &'static str,
    pub segments: &'a [Segment],
    pub bands: &'a HeightBands,
    pub active: bool,
}

impl RoadClass<'_> {
    /// Height contributed by this class for a block, 0 when inactive.
    pub fn height_for(&self, block: &Block, kernel: &Kernel) -> f64 {
        if !self.active {
            return 0.0;
        }
        kernel
            .nearest_distance(block.centroid(), self.segments)
            .map_or(0.0, |d| self.bands.height_at(d))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightParams {
    pub primary: HeightBands,
    pub coarse: HeightBands,
    pub fine: HeightBands,
    pub weights: [f64; 3],
    pub active: [bool; 3],
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            primary: HeightBands::new(PRIMARY_BANDS, PRIMARY_HEIGHTS),
            coarse: HeightBands::new(COARSE_BANDS, COARSE_HEIGHTS),
            fine: HeightBands::new(FINE_BANDS, FINE_HEIGHTS),
            weights: CLASS_WEIGHTS,
            active: [true; 3],
        }
    }
}

impl HeightParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.primary.validate("primary")?;
        self.coarse.validate("coarse")?;
        self.fine.validate("fine")?;
        validate_weights(&self.weights)
    }

    /// Binds the three road line sets to their bands, in primary, coarse, fine order.
    pub fn road_classes<'a>(
        &'a self,
        primary: &'a [Segment],
        coarse: &'a [Segment],
        fine: &'a [Segment],
    ) -> [RoadClass<'a>; 3] {
        [
            RoadClass { name: "primary", segments: primary, bands: &self.primary, active: self.active[0] },
            RoadClass { name: "coarse", segments: coarse, bands: &self.coarse, active: self.active[1] },
            RoadClass { name: "fine", segments: fine, bands: &self.fine, active: self.active[2] },
        ]
    }
}

fn validate_weights(weights: &[f64; 3]) -> Result<(), ConfigError> {
    for (name, w) in ["primary_weight", "coarse_weight", "fine_weight"].into_iter().zip(*weights) {
        ConfigError::within(name, w, 0.0, f64::MAX)?;
    }
    Ok(())
}

/// Weighted sum of the per class heights of one block.
pub fn classify(block: &Block, classes: &[RoadClass; 3], weights: &[f64; 3], kernel: &Kernel) -> f64 {
    classes
        .iter()
        .zip(weights)
        .map(|(class, w)| class.height_for(block, kernel) * w)
        .sum()
}

/// Classify every block, in order.
///
/// Malformed bands of an active class, bad weights and an active class
/// without segments are rejected before any block is looked at.
pub fn classify_all(
    blocks: &[Block],
    classes: &[RoadClass; 3],
    weights: &[f64; 3],
    kernel: &Kernel,
) -> Result<Vec<f64>, ConfigError> {
    validate_weights(weights)?;
    for class in classes.iter().filter(|c| c.active) {
        class.bands.validate(class.name)?;
        if class.segments.is_empty() {
            return Err(ConfigError::EmptyRoadClass(class.name));
        }
    }
    let heights: Vec<f64> = blocks.iter().map(|b| classify(b, classes, weights, kernel)).collect();
    debug!("classified {} blocks", heights.len());
    Ok(heights)
}
