use bevy::log::{debug, info};
use bevy::math::DVec2;

use super::height::{classify_all, HeightParams};
use super::massing::{generate_all, BlockMassing};
use super::setback::{apply_setbacks, SetbackResult};
use super::subdivision::{subdivide, Subdivision};
use super::{Block, Diagnostic, MassingParams, SetbackParams, SubdivisionParams};
use crate::config::*;
use crate::error::ConfigError;
use crate::poly::{Kernel, Polygon, Segment};

/// The site to generate on: its boundary and the primary road network.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInput {
    pub boundary: Polygon,
    pub primary_roads: Vec<Segment>,
}

/// Density scalar to FAR, `clamp(density * scale, min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarMapping {
    pub scale: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for FarMapping {
    fn default() -> Self {
        Self { scale: FAR_SCALE, min: FAR_MIN, max: FAR_MAX }
    }
}

impl FarMapping {
    pub fn far(&self, density: f64) -> f64 {
        (density * self.scale).clamp(self.min, self.max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("far_scale", self.scale)?;
        ConfigError::positive("far_min", self.min)?;
        ConfigError::within("far_max", self.max, self.min, f64::MAX)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub seed: u64,
    pub tolerance: f64,
    pub subdivision: SubdivisionParams,
    pub setback: SetbackParams,
    pub height: HeightParams,
    pub far: FarMapping,
    pub massing: MassingParams,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: INITIAL_SEED,
            tolerance: TOLERANCE,
            subdivision: SubdivisionParams::default(),
            setback: SetbackParams::default(),
            height: HeightParams::default(),
            far: FarMapping::default(),
            massing: MassingParams::default(),
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("tolerance", self.tolerance)?;
        self.subdivision.validate()?;
        self.setback.validate()?;
        self.height.validate()?;
        self.far.validate()?;
        self.massing.validate()?;
        Ok(())
    }
}

/// Everything generated for one site, lists are order correlated with `blocks`.
#[derive(Debug, Clone)]
pub struct District {
    pub site: SiteInput,
    pub subdivision: Subdivision,
    pub setbacks: SetbackResult,
    pub heights: Vec<f64>,
    pub fars: Vec<f64>,
    pub massing: Vec<BlockMassing>,
    pub diagnostics: Vec<Diagnostic>,
}

impl District {
    /// The setback blocks that massing was generated on.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.setbacks.blocks.iter().map(|b| &b.block)
    }

    pub fn pedestrian_outlines(&self) -> impl Iterator<Item = &Polygon> {
        self.setbacks.blocks.iter().filter_map(|b| b.pedestrian_outline.as_ref())
    }

    pub fn building_count(&self) -> usize {
        self.massing.iter().map(|m| m.buildings.len()).sum()
    }
}

/// Run subdivision, setbacks, height classification and massing for a site.
pub fn generate_district(site: &SiteInput, params: &GenerationParams) -> Result<District, ConfigError> {
    params.validate()?;
    if site.primary_roads.is_empty() {
        return Err(ConfigError::EmptyRoadClass("primary"));
    }
    let kernel = Kernel::new(params.tolerance);
    if Block::new(&site.boundary, &kernel).is_none() {
        return Err(ConfigError::DegenerateBoundary);
    }

    let subdivision = subdivide(&site.boundary, &site.primary_roads, &params.subdivision, params.seed, &kernel)?;
    let setbacks = apply_setbacks(
        &subdivision.blocks,
        &site.primary_roads,
        &subdivision.coarse_lines,
        &site.boundary,
        &params.setback,
        &kernel,
    )?;
    let blocks: Vec<Block> = setbacks.blocks.iter().map(|b| b.block.clone()).collect();

    // generated line sets can come out empty on small sites
    let mut height = params.height.clone();
    let generated = [("coarse", &subdivision.coarse_lines), ("fine", &subdivision.fine_lines)];
    for (active, (name, lines)) in height.active.iter_mut().skip(1).zip(generated) {
        if *active && lines.is_empty() {
            debug!("no {} lines generated, class disabled", name);
            *active = false;
        }
    }
    let classes = height.road_classes(&site.primary_roads, &subdivision.coarse_lines, &subdivision.fine_lines);
    let heights = classify_all(&blocks, &classes, &height.weights, &kernel)?;
    let fars: Vec<f64> = heights.iter().map(|h| params.far.far(*h)).collect();

    let massing = generate_all(
        &blocks,
        &fars,
        &params.massing,
        &site.primary_roads,
        &subdivision.coarse_lines,
        &kernel,
    )?;

    let diagnostics: Vec<Diagnostic> = subdivision
        .diagnostics
        .iter()
        .chain(&setbacks.diagnostics)
        .chain(massing.iter().flat_map(|m| &m.diagnostics))
        .cloned()
        .collect();

    let district = District {
        site: site.clone(),
        subdivision,
        setbacks,
        heights,
        fars,
        massing,
        diagnostics,
    };
    info!(
        "generated {} blocks and {} buildings, {} diagnostics",
        district.setbacks.blocks.len(),
        district.building_count(),
        district.diagnostics.len()
    );
    Ok(district)
}

/// Rectangular demo site crossed by two primary roads.
pub fn demo_site(width: f64, depth: f64) -> SiteInput {
    let boundary = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(width, 0.0),
        DVec2::new(width, depth),
        DVec2::new(0.0, depth),
    ];
    let overshoot = 10.0;
    let primary_roads = vec![
        Segment::new(DVec2::new(-overshoot, depth * 0.5), DVec2::new(width + overshoot, depth * 0.5)),
        Segment::new(DVec2::new(width * 0.4, -overshoot), DVec2::new(width * 0.4, depth + overshoot)),
    ];
    debug!("demo site {} x {}", width, depth);
    SiteInput { boundary, primary_roads }
}
