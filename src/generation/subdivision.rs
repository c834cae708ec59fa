use bevy::log::{debug, warn};
use bevy::math::DVec2;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::UnitDisc;

use super::{Block, Diagnostic, PassParams, Stage, SubdivisionParams};
use crate::error::ConfigError;
use crate::poly::{Kernel, Segment};

/// Outcome of one subdivision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub iterations: usize,
    /// false when the pass stopped at the iteration cap
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct Subdivision {
    pub blocks: Vec<Block>,
    pub coarse_lines: Vec<Segment>,
    pub fine_lines: Vec<Segment>,
    pub coarse_report: PassReport,
    pub fine_report: PassReport,
    pub diagnostics: Vec<Diagnostic>,
}

/// A split line together with the parameter where another split line crosses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Division {
    pub line: Segment,
    pub param: f64,
}

impl Division {
    fn halves(&self) -> (Segment, Segment) {
        let at = self.line.point_at(self.param);
        (Segment::new(at, self.line.start), Segment::new(at, self.line.end))
    }

    pub fn longer_half_length(&self) -> f64 {
        let (a, b) = self.halves();
        a.length().max(b.length())
    }

    pub fn shorter_half(&self) -> Segment {
        let (a, b) = self.halves();
        if a.length() > b.length() { b } else { a }
    }
}

/// Recursively subdivides the site into blocks, seeded entry point.
pub fn subdivide(
    boundary: &[DVec2],
    primary_roads: &[Segment],
    params: &SubdivisionParams,
    seed: u64,
    kernel: &Kernel,
) -> Result<Subdivision, ConfigError> {
    let mut rng = StdRng::seed_from_u64(seed);
    subdivide_with_rng(boundary, primary_roads, params, &mut rng, kernel)
}

/// Splits the site by the primary roads, then runs the coarse and the fine pass.
///
/// # Returns
/// The final blocks and the split lines generated by each pass
pub fn subdivide_with_rng(
    boundary: &[DVec2],
    primary_roads: &[Segment],
    params: &SubdivisionParams,
    rng: &mut StdRng,
    kernel: &Kernel,
) -> Result<Subdivision, ConfigError> {
    params.validate()?;
    if primary_roads.is_empty() {
        return Err(ConfigError::EmptyRoadClass("primary"));
    }
    let site = Block::new(boundary, kernel).ok_or(ConfigError::DegenerateBoundary)?;

    let mut diagnostics = Vec::new();
    let blocks = split_block(&site, primary_roads, kernel, &mut diagnostics);
    debug!("primary roads cut the site into {} blocks", blocks.len());

    let (blocks, coarse_lines, coarse_report) =
        run_pass(blocks, primary_roads, &params.coarse, params, rng, kernel, &mut diagnostics);
    debug!("coarse pass: {} blocks after {} iterations", blocks.len(), coarse_report.iterations);

    let (blocks, fine_lines, fine_report) =
        run_pass(blocks, primary_roads, &params.fine, params, rng, kernel, &mut diagnostics);
    debug!("fine pass: {} blocks after {} iterations", blocks.len(), fine_report.iterations);

    Ok(Subdivision { blocks, coarse_lines, fine_lines, coarse_report, fine_report, diagnostics })
}

// one pass: shape correction then area division, until every block is under budget
fn run_pass(
    mut blocks: Vec<Block>,
    primary_roads: &[Segment],
    pass: &PassParams,
    params: &SubdivisionParams,
    rng: &mut StdRng,
    kernel: &Kernel,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Vec<Block>, Vec<Segment>, PassReport) {
    let mut lines = Vec::new();
    let mut iterations = 0;
    let mut converged = true;

    while needs_division(&blocks, primary_roads, pass, kernel) {
        if iterations == params.max_iterations {
            warn!(
                "subdivision pass stopped after {} iterations with {} blocks still over budget",
                iterations,
                blocks.iter().filter(|b| over_budget(b, primary_roads, pass, kernel)).count()
            );
            converged = false;
            break;
        }
        iterations += 1;

        // shape correction, split slivers at their longest edge first
        let snapshot = std::mem::take(&mut blocks);
        for block in snapshot {
            if block.edge_length_ratio() >= params.length_ratio {
                if let Some(line) = division_at_longest(&block, rng, params.split_jitter) {
                    lines.push(line);
                    blocks.extend(split_block(&block, &[line], kernel, diagnostics));
                    continue;
                }
            }
            blocks.push(block);
        }

        if !needs_division(&blocks, primary_roads, pass, kernel) {
            break;
        }

        // area division on a fresh snapshot
        let snapshot = std::mem::take(&mut blocks);
        for block in snapshot {
            let factor = proximity_factor(&block, primary_roads, pass, kernel);
            if block.area() > pass.area_threshold * factor {
                let division = area_division(&block, factor, pass, params.split_jitter, rng);
                lines.extend_from_slice(&division);
                blocks.extend(split_block(&block, &division, kernel, diagnostics));
            } else {
                blocks.push(block);
            }
        }
    }

    (blocks, lines, PassReport { iterations, converged })
}

/// Multiplier on the area budget: far blocks get `1 + amplification`, near ones `1 - amplification`.
pub fn proximity_factor(block: &Block, primary_roads: &[Segment], pass: &PassParams, kernel: &Kernel) -> f64 {
    let distance = kernel
        .nearest_distance(block.centroid(), primary_roads)
        .unwrap_or(f64::INFINITY);
    if distance > pass.distance_cutoff {
        1.0 + pass.amplification
    } else {
        1.0 - pass.amplification
    }
}

fn over_budget(block: &Block, primary_roads: &[Segment], pass: &PassParams, kernel: &Kernel) -> bool {
    block.area() > pass.area_threshold * proximity_factor(block, primary_roads, pass, kernel)
}

/// Whether any block is still above its proximity weighted area threshold.
pub fn needs_division(blocks: &[Block], primary_roads: &[Segment], pass: &PassParams, kernel: &Kernel) -> bool {
    blocks.iter().any(|b| over_budget(b, primary_roads, pass, kernel))
}

// edge parameter near the midpoint, (0.5 - jitter, 0.5 + jitter)
fn jittered_param(rng: &mut StdRng, jitter: f64) -> f64 {
    rng.random::<f64>() * jitter * 2.0 + 0.5 - jitter
}

/// Line from the longest edge to the first edge that keeps clear of it.
pub fn division_at_longest(block: &Block, rng: &mut StdRng, jitter: f64) -> Option<Segment> {
    let longest = block.longest_edge();
    let across = block.opposite(longest)?;
    let edges = block.edges();
    let from = edges[longest].point_at(jittered_param(rng, jitter));
    let to = edges[across].point_at(jittered_param(rng, jitter));
    Some(Segment::new(from, to))
}

fn area_division(block: &Block, factor: f64, pass: &PassParams, jitter: f64, rng: &mut StdRng) -> Vec<Segment> {
    if block.is_quad() && block.opposite(0).is_some() {
        if pass.eliminate_narrow_end && factor > 1.0 {
            return division_by_pairs_eliminated(block, rng, jitter);
        }
        return division_by_pairs(block, rng, jitter);
    }
    division_from_center(block, rng, pass.center_jitter, jitter)
}

// the two edges of a quad that are not edge 0 and its opposite
fn remaining_pair(across: usize) -> (usize, usize) {
    let mut rest = (1..4).filter(|&i| i != across);
    let a = rest.next().unwrap_or(1);
    let b = rest.next().unwrap_or(3);
    (a, b)
}

/// Two crossing lines between the opposite edge pairs of a quad.
pub fn division_by_pairs(block: &Block, rng: &mut StdRng, jitter: f64) -> Vec<Segment> {
    let edges = block.edges();
    let Some(across) = block.opposite(0) else {
        return Vec::new();
    };
    let (a, b) = remaining_pair(across);

    let first = Segment::new(
        edges[0].point_at(jittered_param(rng, jitter)),
        edges[across].point_at(jittered_param(rng, jitter)),
    );
    let second = Segment::new(
        edges[a].point_at(jittered_param(rng, jitter)),
        edges[b].point_at(jittered_param(rng, jitter)),
    );
    vec![first, second]
}

/// Pair division where the line with the longer half (the narrow end) keeps only its shorter half.
pub fn division_by_pairs_eliminated(block: &Block, rng: &mut StdRng, jitter: f64) -> Vec<Segment> {
    let edges = block.edges();
    let Some(across) = block.opposite(0) else {
        return Vec::new();
    };
    let points: Vec<DVec2> = edges
        .iter()
        .take(4)
        .map(|e| e.point_at(jittered_param(rng, jitter)))
        .collect();
    let (a, b) = remaining_pair(across);
    let first = Segment::new(points[0], points[across]);
    let second = Segment::new(points[a], points[b]);

    let Some((t, u)) = first.line_intersection_params(&second) else {
        return vec![first, second];
    };
    let first = Division { line: first, param: t };
    let second = Division { line: second, param: u };
    if first.longer_half_length() > second.longer_half_length() {
        vec![first.shorter_half(), second.line]
    } else {
        vec![second.shorter_half(), first.line]
    }
}

/// Radiating lines from a random point near the centroid to a point on every edge.
pub fn division_from_center(block: &Block, rng: &mut StdRng, radius: f64, jitter: f64) -> Vec<Segment> {
    let [x, y]: [f64; 2] = UnitDisc.sample(rng);
    let center = block.centroid() + DVec2::new(x, y) * radius;
    block
        .edges()
        .iter()
        .map(|e| Segment::new(center, e.point_at(jittered_param(rng, jitter))))
        .collect()
}

// split and wrap the fragments, a failed split drops the block
fn split_block(block: &Block, cutters: &[Segment], kernel: &Kernel, diagnostics: &mut Vec<Diagnostic>) -> Vec<Block> {
    match kernel.split(block.polygon(), cutters) {
        Ok(fragments) => fragments.iter().filter_map(|f| Block::new(f, kernel)).collect(),
        Err(err) => {
            warn!("dropping block at {:?}: {}", block.centroid(), err);
            diagnostics.push(Diagnostic::new(
                Stage::Subdivision,
                None,
                format!("block at {:?} dropped: {}", block.centroid(), err),
            ));
            Vec::new()
        }
    }
}
