// block layout and massing generation pipeline
use bevy::math::DVec2;

use crate::config::*;
use crate::error::ConfigError;
use crate::poly::utils::{edges, ensure_ccw, polygon_area, polygon_centroid, simplify};
use crate::poly::{Kernel, Polygon, Segment};

pub mod height;
pub mod massing;
pub mod pipeline;
pub mod setback;
pub mod subdivision;

/// A planar region under subdivision.
///
/// Immutable: area, centroid and the edge relations are computed once from the
/// boundary, a changed boundary is a new `Block`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    polygon: Polygon,
    area: f64,
    centroid: DVec2,
    edges: Vec<Segment>,
    // first edge that keeps clear of edge i by more than the tolerance
    opposite: Vec<Option<usize>>,
}

impl Block {
    /// Normalises the ring (ccw, no repeated or collinear vertices).
    /// Returns `None` for rings whose area is below tolerance.
    pub fn new(polygon: &[DVec2], kernel: &Kernel) -> Option<Block> {
        let ring = ensure_ccw(&simplify(polygon, kernel.tolerance));
        if ring.len() < 3 {
            return None;
        }
        let area = polygon_area(&ring);
        if area < kernel.tolerance {
            return None;
        }
        let centroid = polygon_centroid(&ring, area);
        let edges = edges(&ring);
        let opposite = (0..edges.len())
            .map(|i| {
                (0..edges.len()).find(|&j| edges[i].min_distance_to(&edges[j]) > kernel.tolerance)
            })
            .collect();

        Some(Block { polygon: ring, area, centroid, edges, opposite })
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn centroid(&self) -> DVec2 {
        self.centroid
    }

    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    pub fn opposite(&self, edge: usize) -> Option<usize> {
        self.opposite.get(edge).copied().flatten()
    }

    pub fn is_quad(&self) -> bool {
        self.edges.len() == 4
    }

    /// Index of the first longest edge.
    pub fn longest_edge(&self) -> usize {
        let mut best = 0;
        for (i, e) in self.edges.iter().enumerate() {
            if e.length() > self.edges[best].length() {
                best = i;
            }
        }
        best
    }

    pub fn edge_length_ratio(&self) -> f64 {
        let (min, max) = self
            .edges
            .iter()
            .map(Segment::length)
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), l| (lo.min(l), hi.max(l)));
        max / min
    }
}

/// Which stage a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Subdivision,
    Setback,
    Massing,
}

/// A recoverable failure, the offending block or footprint was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub index: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, index: Option<usize>, message: impl Into<String>) -> Self {
        Self { stage, index, message: message.into() }
    }
}

/// Parameters for one subdivision pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassParams {
    pub area_threshold: f64,
    pub distance_cutoff: f64,
    pub amplification: f64,
    pub center_jitter: f64,
    /// far quads drop the longer half of one crossing line
    pub eliminate_narrow_end: bool,
}

impl PassParams {
    pub fn coarse() -> Self {
        Self {
            area_threshold: COARSE_AREA_THRESHOLD,
            distance_cutoff: COARSE_DISTANCE_CUTOFF,
            amplification: COARSE_AMPLIFICATION,
            center_jitter: COARSE_CENTER_JITTER,
            eliminate_narrow_end: false,
        }
    }

    pub fn fine() -> Self {
        Self {
            area_threshold: FINE_AREA_THRESHOLD,
            distance_cutoff: FINE_DISTANCE_CUTOFF,
            amplification: FINE_AMPLIFICATION,
            center_jitter: FINE_CENTER_JITTER,
            eliminate_narrow_end: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("area_threshold", self.area_threshold)?;
        ConfigError::within("distance_cutoff", self.distance_cutoff, 0.0, f64::MAX)?;
        // amplification of 1 would zero the near threshold
        ConfigError::within("amplification", self.amplification, 0.0, 0.99)?;
        ConfigError::within("center_jitter", self.center_jitter, 0.0, f64::MAX)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubdivisionParams {
    pub coarse: PassParams,
    pub fine: PassParams,
    pub length_ratio: f64,
    pub split_jitter: f64,
    pub max_iterations: usize,
}

impl Default for SubdivisionParams {
    fn default() -> Self {
        Self {
            coarse: PassParams::coarse(),
            fine: PassParams::fine(),
            length_ratio: LENGTH_RATIO,
            split_jitter: SPLIT_JITTER,
            max_iterations: MAX_PASS_ITERATIONS,
        }
    }
}

impl SubdivisionParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.coarse.validate()?;
        self.fine.validate()?;
        ConfigError::within("length_ratio", self.length_ratio, 1.0, f64::MAX)?;
        ConfigError::within("split_jitter", self.split_jitter, 0.0, 0.5)?;
        ConfigError::positive("max_iterations", self.max_iterations as f64)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetbackParams {
    pub width_a: f64,
    pub width_b: f64,
    pub width_other: f64,
    pub pedestrian_offset: f64,
    pub extension: f64,
}

impl Default for SetbackParams {
    fn default() -> Self {
        Self {
            width_a: ROAD_A_HALF_WIDTH,
            width_b: ROAD_B_HALF_WIDTH,
            width_other: ROAD_OTHER_HALF_WIDTH,
            pedestrian_offset: PEDESTRIAN_OFFSET,
            extension: SETBACK_EXTENSION,
        }
    }
}

impl SetbackParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("width_a", self.width_a)?;
        ConfigError::positive("width_b", self.width_b)?;
        ConfigError::positive("width_other", self.width_other)?;
        ConfigError::within("pedestrian_offset", self.pedestrian_offset, 0.0, f64::MAX)?;
        ConfigError::positive("extension", self.extension)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MassingParams {
    /// building coverage per tier: low, mid, high
    pub densities: [f64; 3],
    pub tower_ratio: f64,
    pub floor_height: f64,
    pub border_width: f64,
    pub base_floors: u32,
    pub primary_adjacency: f64,
    pub secondary_adjacency: f64,
    pub tower_extension: f64,
}

impl Default for MassingParams {
    fn default() -> Self {
        Self {
            densities: TIER_DENSITIES,
            tower_ratio: TOWER_RATIO,
            floor_height: FLOOR_HEIGHT,
            border_width: BORDER_WIDTH,
            base_floors: HIGH_TIER_BASE_FLOORS,
            primary_adjacency: PRIMARY_ADJACENCY,
            secondary_adjacency: SECONDARY_ADJACENCY,
            tower_extension: TOWER_EXTENSION,
        }
    }
}

impl MassingParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, density) in ["low_density", "mid_density", "high_density"].into_iter().zip(self.densities) {
            ConfigError::positive(name, density)?;
            ConfigError::within(name, density, 0.0, 1.0)?;
        }
        ConfigError::within("tower_ratio", self.tower_ratio, 0.0, 1.0)?;
        ConfigError::positive("floor_height", self.floor_height)?;
        ConfigError::within("border_width", self.border_width, 0.0, f64::MAX)?;
        ConfigError::positive("base_floors", self.base_floors as f64)?;
        ConfigError::positive("primary_adjacency", self.primary_adjacency)?;
        ConfigError::positive("secondary_adjacency", self.secondary_adjacency)?;
        ConfigError::positive("tower_extension", self.tower_extension)?;
        Ok(())
    }
}
