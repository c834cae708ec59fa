use bevy::log::{debug, warn};
use bevy::math::DVec2;

use super::{Block, Diagnostic, SetbackParams, Stage};
use crate::error::ConfigError;
use crate::poly::utils::{edges, polygon_area};
use crate::poly::{Kernel, Polygon, Segment};

/// Road class an edge belongs to, decided by endpoint coincidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    A,
    B,
    Other,
}

#[derive(Debug, Clone)]
pub struct SetbackBlock {
    /// position of the source block in the input list
    pub index: usize,
    pub block: Block,
    pub pedestrian_outline: Option<Polygon>,
}

#[derive(Debug, Clone, Default)]
pub struct SetbackResult {
    pub blocks: Vec<SetbackBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SetbackParams {
    pub fn width(&self, class: EdgeClass) -> f64 {
        match class {
            EdgeClass::A => self.width_a,
            EdgeClass::B => self.width_b,
            EdgeClass::Other => self.width_other,
        }
    }
}

pub fn classify_edge(edge: &Segment, road_a: &[Segment], road_b: &[Segment], kernel: &Kernel) -> EdgeClass {
    if kernel.lies_on(edge, road_a) {
        EdgeClass::A
    } else if kernel.lies_on(edge, road_b) {
        EdgeClass::B
    } else {
        EdgeClass::Other
    }
}

/// Both side offsets of every block edge, lengthened so they cross the block.
pub fn edge_cutters(
    block: &Block,
    road_a: &[Segment],
    road_b: &[Segment],
    params: &SetbackParams,
    kernel: &Kernel,
) -> Vec<Segment> {
    block
        .edges()
        .iter()
        .flat_map(|edge| {
            let distance = params.width(classify_edge(edge, road_a, road_b, kernel)) + params.pedestrian_offset;
            [edge.translated(distance), edge.translated(-distance)].map(|l| l.extended(params.extension))
        })
        .collect()
}

/// Edges of the site boundary grown and shrunk by the primary half width.
pub fn boundary_cutters(boundary: &[DVec2], width: f64, kernel: &Kernel) -> Vec<Segment> {
    [kernel.inset(boundary, width), kernel.outset(boundary, width)]
        .into_iter()
        .flatten()
        .flat_map(|ring| edges(&ring))
        .collect()
}

/// Pull every block back from its roads and derive the pedestrian outlines.
///
/// Blocks whose split leaves nothing usable are dropped with a diagnostic,
/// `SetbackBlock::index` points back into `blocks`.
pub fn apply_setbacks(
    blocks: &[Block],
    road_a: &[Segment],
    road_b: &[Segment],
    boundary: &[DVec2],
    params: &SetbackParams,
    kernel: &Kernel,
) -> Result<SetbackResult, ConfigError> {
    params.validate()?;
    if Block::new(boundary, kernel).is_none() {
        return Err(ConfigError::DegenerateBoundary);
    }

    let site_cutters = boundary_cutters(boundary, params.width_a, kernel);
    let mut result = SetbackResult::default();

    for (index, block) in blocks.iter().enumerate() {
        let mut cutters = edge_cutters(block, road_a, road_b, params, kernel);
        cutters.extend_from_slice(&site_cutters);

        let fragments = match kernel.split(block.polygon(), &cutters) {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!("setback split failed for block {}: {}", index, err);
                result
                    .diagnostics
                    .push(Diagnostic::new(Stage::Setback, Some(index), format!("split failed: {err}")));
                continue;
            }
        };

        // keep the largest fragment, the rest are offset slivers
        let kept = fragments
            .iter()
            .max_by(|a, b| polygon_area(a).total_cmp(&polygon_area(b)))
            .and_then(|largest| Block::new(largest, kernel));
        let Some(kept) = kept else {
            result
                .diagnostics
                .push(Diagnostic::new(Stage::Setback, Some(index), "setback left no usable fragment"));
            continue;
        };

        let pedestrian_outline = kernel.inset(kept.polygon(), params.pedestrian_offset);
        if pedestrian_outline.is_none() {
            result
                .diagnostics
                .push(Diagnostic::new(Stage::Setback, Some(index), "pedestrian outline collapsed"));
        }

        result.blocks.push(SetbackBlock { index, block: kept, pedestrian_outline });
    }

    debug!("setbacks kept {} of {} blocks", result.blocks.len(), blocks.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<DVec2> {
        vec![DVec2::new(x0, y0), DVec2::new(x1, y0), DVec2::new(x1, y1), DVec2::new(x0, y1)]
    }

    fn params() -> SetbackParams {
        SetbackParams {
            width_a: 10.0,
            width_b: 6.0,
            width_other: 4.0,
            pedestrian_offset: 2.0,
            extension: 10.0,
        }
    }

    #[test]
    fn edges_are_classified_a_before_b() {
        let kernel = Kernel::default();
        let road = [Segment::new(DVec2::new(-50.0, 0.0), DVec2::new(150.0, 0.0))];
        let edge = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0));
        assert_eq!(classify_edge(&edge, &road, &road, &kernel), EdgeClass::A);
        assert_eq!(classify_edge(&edge, &[], &road, &kernel), EdgeClass::B);
        assert_eq!(classify_edge(&edge, &[], &[], &kernel), EdgeClass::Other);
    }

    #[test]
    fn block_is_pulled_back_by_class_width() {
        let kernel = Kernel::default();
        let site = rect(-100.0, -100.0, 200.0, 300.0);
        let block = Block::new(&rect(0.0, 0.0, 100.0, 100.0), &kernel).unwrap();
        let road_a = [Segment::new(DVec2::new(-100.0, 0.0), DVec2::new(200.0, 0.0))];
        let road_b = [Segment::new(DVec2::new(0.0, -100.0), DVec2::new(0.0, 300.0))];

        let result = apply_setbacks(&[block], &road_a, &road_b, &site, &params(), &kernel).unwrap();
        assert_eq!(result.blocks.len(), 1);
        let kept = &result.blocks[0];
        assert_eq!(kept.index, 0);

        // bottom 10 + 2, left 6 + 2, top and right 4 + 2
        let expected = (100.0 - 8.0 - 6.0) * (100.0 - 12.0 - 6.0);
        assert_abs_diff_eq!(kept.block.area(), expected, epsilon = 1e-6);

        let outline = kept.pedestrian_outline.as_ref().unwrap();
        assert_abs_diff_eq!(polygon_area(outline), (86.0 - 4.0) * (82.0 - 4.0), epsilon = 1e-6);
    }

    #[test]
    fn degenerate_boundary_is_rejected() {
        let kernel = Kernel::default();
        let line = vec![DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(20.0, 0.0)];
        let err = apply_setbacks(&[], &[], &[], &line, &params(), &kernel).unwrap_err();
        assert_eq!(err, ConfigError::DegenerateBoundary);
    }

    #[test]
    fn tiny_block_loses_its_pedestrian_outline() {
        let kernel = Kernel::default();
        let site = rect(-100.0, -100.0, 200.0, 200.0);
        let block = Block::new(&rect(0.0, 0.0, 16.0, 16.0), &kernel).unwrap();
        let tight = SetbackParams { pedestrian_offset: 1.0, ..params() };
        // 5 units off every side leaves a 6 x 6 core, a 1 unit walk still fits
        let result = apply_setbacks(&[block.clone()], &[], &[], &site, &tight, &kernel).unwrap();
        assert_abs_diff_eq!(result.blocks[0].block.area(), 36.0, epsilon = 1e-6);
        assert!(result.blocks[0].pedestrian_outline.is_some());

        let wide = SetbackParams { pedestrian_offset: 3.5, width_other: 1.0, ..params() };
        // 4.5 off every side leaves 7 x 7, a 3.5 walk collapses it
        let result = apply_setbacks(&[block], &[], &[], &site, &wide, &kernel).unwrap();
        assert_abs_diff_eq!(result.blocks[0].block.area(), 49.0, epsilon = 1e-6);
        assert!(result.blocks[0].pedestrian_outline.is_none());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn site_boundary_pulls_blocks_back() {
        let kernel = Kernel::default();
        let site = rect(0.0, 0.0, 100.0, 100.0);
        let cutters = boundary_cutters(&site, 10.0, &kernel);
        assert_eq!(cutters.len(), 8);

        // the block is the whole site, only its bottom edge is a primary road
        let block = Block::new(&site, &kernel).unwrap();
        let road_a = [Segment::new(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0))];
        let result = apply_setbacks(&[block], &road_a, &[], &site, &params(), &kernel).unwrap();
        let kept = &result.blocks[0];

        // left, right and top follow the boundary inset at 10 rather than the 6 of an other edge
        assert_abs_diff_eq!(kept.block.area(), 80.0 * 78.0, epsilon = 1e-6);
        let (lo, hi) = crate::poly::utils::bounds(kept.block.polygon());
        assert_abs_diff_eq!(lo.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lo.y, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hi.x, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hi.y, 90.0, epsilon = 1e-9);

        let outline = kept.pedestrian_outline.as_ref().unwrap();
        assert_abs_diff_eq!(polygon_area(outline), 76.0 * 74.0, epsilon = 1e-6);
    }
}

