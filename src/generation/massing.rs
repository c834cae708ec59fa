// per-footprint building generation driven by FAR tiers

use bevy::log::{debug, warn};
use bevy::math::DVec2;

use super::{Block, Diagnostic, MassingParams, Stage};
use crate::config::MAX_GRID_SPANS;
use crate::error::ConfigError;
use crate::poly::utils::{clip_to_convex, edges, ensure_ccw, perimeter, polygon_area, polygon_centroid, simplify};
use crate::poly::{Kernel, Polygon, Segment};

/// FAR range a footprint falls in, lower bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// [0.5, 2)
    Low,
    /// [2, 5)
    Mid,
    /// [5, 20]
    High,
}

impl Tier {
    pub fn classify(far: f64) -> Option<Tier> {
        if (0.5..2.0).contains(&far) {
            Some(Tier::Low)
        } else if (2.0..5.0).contains(&far) {
            Some(Tier::Mid)
        } else if (5.0..=20.0).contains(&far) {
            Some(Tier::High)
        } else {
            None
        }
    }

    pub fn density(self, params: &MassingParams) -> f64 {
        match self {
            Tier::Low => params.densities[0],
            Tier::Mid => params.densities[1],
            Tier::High => params.densities[2],
        }
    }
}

/// Span counts of the footprint grid, `(U, V)`, each capped at `MAX_GRID_SPANS`.
pub fn grid_spans(far: f64) -> (usize, usize) {
    let spans = |n: f64| {
        let count = (n / far + 1.0).floor();
        if count.is_finite() {
            (count as usize).clamp(1, MAX_GRID_SPANS)
        } else {
            MAX_GRID_SPANS
        }
    };
    (spans(1.0), spans(5.0))
}

/// Parametric surface a block is sampled on.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockSurface {
    /// bilinear patch over the four corners of a quad block
    Bilinear([DVec2; 4]),
    /// rectangle aligned with the longest edge, cells are clipped to `clip`
    Frame {
        origin: DVec2,
        u_axis: DVec2,
        v_axis: DVec2,
        clip: Polygon,
    },
}

impl BlockSurface {
    pub fn from_block(block: &Block) -> BlockSurface {
        let ring = block.polygon();
        if let [a, b, c, d] = ring[..] {
            return BlockSurface::Bilinear([a, b, c, d]);
        }

        let longest = block.edges()[block.longest_edge()];
        let u_dir = longest.direction().normalize_or_zero();
        let v_dir = u_dir.perp();
        let (mut lo, mut hi) = (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY));
        for p in ring {
            let local = DVec2::new((*p - longest.start).dot(u_dir), (*p - longest.start).dot(v_dir));
            lo = lo.min(local);
            hi = hi.max(local);
        }
        BlockSurface::Frame {
            origin: longest.start + u_dir * lo.x + v_dir * lo.y,
            u_axis: u_dir * (hi.x - lo.x),
            v_axis: v_dir * (hi.y - lo.y),
            clip: ring.clone(),
        }
    }

    pub fn point_at(&self, u: f64, v: f64) -> DVec2 {
        match self {
            BlockSurface::Bilinear([p0, p1, p2, p3]) => {
                let bottom = p0.lerp(*p1, u);
                let top = p3.lerp(*p2, u);
                bottom.lerp(top, v)
            }
            BlockSurface::Frame { origin, u_axis, v_axis, .. } => *origin + *u_axis * u + *v_axis * v,
        }
    }

    /// Sample the `u_count` x `v_count` grid, rows along v.
    pub fn cells(&self, u_count: usize, v_count: usize, kernel: &Kernel) -> Vec<Polygon> {
        let (du, dv) = (1.0 / u_count as f64, 1.0 / v_count as f64);
        let mut cells = Vec::new();
        for i in 0..v_count {
            for j in 0..u_count {
                let (u0, u1) = (du * j as f64, du * (j + 1) as f64);
                let (v0, v1) = (dv * i as f64, dv * (i + 1) as f64);
                let quad = vec![
                    self.point_at(u0, v0),
                    self.point_at(u1, v0),
                    self.point_at(u1, v1),
                    self.point_at(u0, v1),
                ];
                let cell = match self {
                    BlockSurface::Bilinear(_) => quad,
                    BlockSurface::Frame { clip, .. } => clip_to_convex(clip, &quad),
                };
                let cell = ensure_ccw(&simplify(&cell, kernel.tolerance));
                if cell.len() >= 3 && polygon_area(&cell) > kernel.tolerance {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

/// An extruded planar region, optionally with holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub base: Polygon,
    pub holes: Vec<Polygon>,
    pub elevation: f64,
    pub height: f64,
}

impl Volume {
    pub fn solid(base: Polygon, height: f64) -> Self {
        Self { base, holes: Vec::new(), elevation: 0.0, height }
    }

    pub fn footprint_area(&self) -> f64 {
        polygon_area(&self.base) - self.holes.iter().map(|h| polygon_area(h)).sum::<f64>()
    }

    pub fn top(&self) -> f64 {
        self.elevation + self.height
    }
}

/// One grid cell of a block and everything built on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub far: f64,
    pub outline: Polygon,
    pub centroid: DVec2,
    pub tier: Option<Tier>,
    pub outer_border: Option<Polygon>,
    pub inner_border: Option<Polygon>,
    pub primary_edges: Vec<Segment>,
    pub secondary_edges: Vec<Segment>,
    pub primary_tower_base: Option<Polygon>,
    pub secondary_tower_base: Option<Polygon>,
    pub structure: Option<Volume>,
    pub primary_tower: Option<Volume>,
    pub secondary_tower: Option<Volume>,
}

impl Building {
    fn new(outline: Polygon, far: f64) -> Self {
        let centroid = polygon_centroid(&outline, polygon_area(&outline));
        Self {
            far,
            outline,
            centroid,
            tier: Tier::classify(far),
            outer_border: None,
            inner_border: None,
            primary_edges: Vec::new(),
            secondary_edges: Vec::new(),
            primary_tower_base: None,
            secondary_tower_base: None,
            structure: None,
            primary_tower: None,
            secondary_tower: None,
        }
    }

    /// Distance from the centroid to the closest outline edge.
    pub fn offset_max(&self) -> f64 {
        edges(&self.outline)
            .iter()
            .map(|e| e.distance_to_point(self.centroid))
            .fold(f64::INFINITY, f64::min)
    }

    fn generate_low(&mut self, density: f64, params: &MassingParams, kernel: &Kernel) -> Result<(), String> {
        let off = (1.0 - density) * self.offset_max();
        let base = kernel.inset(&self.outline, off).ok_or("footprint inset collapsed")?;

        let floors = (self.far / density).floor();
        let height = if floors >= 1.0 && off < perimeter(&self.outline) / 20.0 {
            floors * params.floor_height
        } else {
            params.floor_height
        };
        self.outer_border = Some(base.clone());
        self.structure = Some(Volume::solid(base, height));
        Ok(())
    }

    // outer border ring around the footprint, the inner border becomes the yard
    fn generate_ring(&mut self, density: f64, floors: f64, params: &MassingParams, kernel: &Kernel) -> Result<(), String> {
        let outer = kernel
            .outset(&self.outline, params.border_width)
            .ok_or("outer border offset failed")?;
        let off = density * (self.offset_max() - params.border_width);
        let inner = if off > kernel.tolerance { kernel.inset(&outer, off) } else { None };

        let holes = inner.iter().cloned().collect();
        self.structure = Some(Volume {
            base: outer.clone(),
            holes,
            elevation: 0.0,
            height: floors * params.floor_height,
        });
        self.outer_border = Some(outer);
        self.inner_border = inner;
        Ok(())
    }

    /// Sort outline edges into primary and secondary road frontage.
    pub fn set_adjacency(&mut self, primary: &[Segment], secondary: &[Segment], params: &MassingParams, kernel: &Kernel) {
        for edge in edges(&self.outline) {
            let mid = edge.midpoint();
            let near = |roads: &[Segment], limit: f64| kernel.nearest_distance(mid, roads).is_some_and(|d| d < limit);
            if near(primary, params.primary_adjacency) {
                self.primary_edges.push(edge);
            } else if near(secondary, params.secondary_adjacency) {
                self.secondary_edges.push(edge);
            }
        }
    }

    // smaller piece of the outer border cut off by the offset frontage
    fn tower_base(&self, frontage: &[Segment], density: f64, params: &MassingParams, kernel: &Kernel) -> Option<Polygon> {
        let outer = self.outer_border.as_ref()?;

        // drop edges that would join twice
        let mut starts: Vec<DVec2> = Vec::new();
        let mut ends: Vec<DVec2> = Vec::new();
        let mut unique = Vec::new();
        for edge in frontage {
            if starts.iter().any(|p| kernel.same_point(*p, edge.start))
                || ends.iter().any(|p| kernel.same_point(*p, edge.end))
            {
                continue;
            }
            starts.push(edge.start);
            ends.push(edge.end);
            unique.push(*edge);
        }

        let chain = kernel.join(&unique).into_iter().next()?;
        let off = density * (self.offset_max() - params.border_width);
        // frontage runs ccw, so left is inward
        let offset = kernel.offset_polyline(&chain, off)?;
        let cutter = kernel.extend_polyline(&offset, params.tower_extension)?;

        let fragments = kernel.split(outer, &crate::poly::polyline_segments(&cutter)).ok()?;
        if fragments.len() < 2 {
            return None;
        }
        fragments
            .into_iter()
            .min_by(|a, b| polygon_area(a).total_cmp(&polygon_area(b)))
    }

    fn generate_towers(&mut self, density: f64, params: &MassingParams, kernel: &Kernel) {
        self.primary_tower_base = self.tower_base(&self.primary_edges, density, params, kernel);
        self.secondary_tower_base = self.tower_base(&self.secondary_edges, density, params, kernel);

        let Some(base_area) = self.structure.as_ref().map(Volume::footprint_area) else {
            return;
        };
        let cell_area = polygon_area(&self.outline);
        let base_floors = params.base_floors as f64;
        let base_far = base_area / cell_area * base_floors;
        let residual = ((self.far - base_far) * cell_area).max(0.0);
        if residual <= 0.0 {
            return;
        }

        let elevation = base_floors * params.floor_height;
        let tower = |base: &Polygon, share: f64| {
            let floors = (residual * share / polygon_area(base)).floor();
            Volume {
                base: base.clone(),
                holes: Vec::new(),
                elevation,
                height: (floors + 1.0) * params.floor_height,
            }
        };
        self.primary_tower = self.primary_tower_base.as_ref().map(|b| tower(b, params.tower_ratio));
        self.secondary_tower = self.secondary_tower_base.as_ref().map(|b| tower(b, 1.0 - params.tower_ratio));
    }

    fn generate(&mut self, primary: &[Segment], secondary: &[Segment], params: &MassingParams, kernel: &Kernel) -> Result<(), String> {
        let Some(tier) = self.tier else {
            return Ok(());
        };
        let density = tier.density(params);
        match tier {
            Tier::Low => self.generate_low(density, params, kernel),
            Tier::Mid => self.generate_ring(density, (self.far / density).floor(), params, kernel),
            Tier::High => {
                self.generate_ring(density, params.base_floors as f64, params, kernel)?;
                self.set_adjacency(primary, secondary, params, kernel);
                self.generate_towers(density, params, kernel);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockMassing {
    pub buildings: Vec<Building>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BlockMassing {
    pub fn footprints(&self) -> impl Iterator<Item = &Polygon> {
        self.buildings.iter().map(|b| &b.outline)
    }

    pub fn volumes(&self) -> impl Iterator<Item = &Volume> {
        self.buildings.iter().filter_map(|b| b.structure.as_ref())
    }

    pub fn yards(&self) -> impl Iterator<Item = &Polygon> {
        self.buildings.iter().filter_map(|b| b.inner_border.as_ref())
    }

    pub fn tower_volumes(&self) -> impl Iterator<Item = &Volume> {
        self.buildings
            .iter()
            .flat_map(|b| b.primary_tower.iter().chain(b.secondary_tower.iter()))
    }
}

/// Lay out the footprint grid of one block and build every footprint.
pub fn generate(
    surface: &BlockSurface,
    far: f64,
    params: &MassingParams,
    primary: &[Segment],
    secondary: &[Segment],
    kernel: &Kernel,
) -> BlockMassing {
    let (u, v) = grid_spans(far);
    let mut massing = BlockMassing::default();

    for (cell_index, cell) in surface.cells(u, v, kernel).into_iter().enumerate() {
        let mut building = Building::new(cell, far);
        if let Err(reason) = building.generate(primary, secondary, params, kernel) {
            warn!("footprint {} lost its volume: {}", cell_index, reason);
            massing
                .diagnostics
                .push(Diagnostic::new(Stage::Massing, None, format!("footprint {cell_index}: {reason}")));
        }
        massing.buildings.push(building);
    }
    massing
}

/// Validate the inputs then build every block, diagnostics carry the block index.
pub fn generate_all(
    blocks: &[Block],
    fars: &[f64],
    params: &MassingParams,
    primary: &[Segment],
    secondary: &[Segment],
    kernel: &Kernel,
) -> Result<Vec<BlockMassing>, ConfigError> {
    params.validate()?;
    if blocks.len() != fars.len() {
        return Err(ConfigError::FarCountMismatch { expected: blocks.len(), actual: fars.len() });
    }
    for far in fars {
        ConfigError::positive("far", *far)?;
    }

    let massings: Vec<BlockMassing> = blocks
        .iter()
        .zip(fars)
        .enumerate()
        .map(|(index, (block, far))| {
            let mut massing = generate(&BlockSurface::from_block(block), *far, params, primary, secondary, kernel);
            for diagnostic in &mut massing.diagnostics {
                diagnostic.index = Some(index);
            }
            massing
        })
        .collect();

    debug!(
        "massing built {} footprints over {} blocks",
        massings.iter().map(|m| m.buildings.len()).sum::<usize>(),
        massings.len()
    );
    Ok(massings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(side: f64) -> Polygon {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(side, 0.0),
            DVec2::new(side, side),
            DVec2::new(0.0, side),
        ]
    }

    fn bottom_road() -> Vec<Segment> {
        vec![Segment::new(DVec2::new(-50.0, 0.0), DVec2::new(150.0, 0.0))]
    }

    #[test]
    fn tier_boundaries_belong_to_the_upper_tier() {
        assert_eq!(Tier::classify(0.5), Some(Tier::Low));
        assert_eq!(Tier::classify(1.99), Some(Tier::Low));
        assert_eq!(Tier::classify(2.0), Some(Tier::Mid));
        assert_eq!(Tier::classify(5.0), Some(Tier::High));
        assert_eq!(Tier::classify(20.0), Some(Tier::High));
        assert_eq!(Tier::classify(0.4), None);
        assert_eq!(Tier::classify(20.5), None);
    }

    #[test]
    fn far_one_gives_twelve_low_footprints() {
        let kernel = Kernel::default();
        let block = Block::new(&square(100.0), &kernel).unwrap();
        assert_eq!(grid_spans(1.0), (2, 6));

        let massing = generate(&BlockSurface::from_block(&block), 1.0, &MassingParams::default(), &[], &[], &kernel);
        assert_eq!(massing.buildings.len(), 12);
        assert!(massing.buildings.iter().all(|b| b.tier == Some(Tier::Low)));
        let total: f64 = massing.footprints().map(|f| polygon_area(f)).sum();
        assert_abs_diff_eq!(total, 10_000.0, epsilon = 1e-6);
        assert_eq!(massing.volumes().count(), 12);
    }

    #[test]
    fn low_tier_falls_back_to_one_floor_on_deep_insets() {
        let kernel = Kernel::default();
        let params = MassingParams { densities: [0.4, 0.5, 0.6], ..Default::default() };

        // 50 x 16.7 cells: inset 5 stays under perimeter / 20, two floors
        let wide = Block::new(&square(100.0), &kernel).unwrap();
        let massing = generate(&BlockSurface::from_block(&wide), 1.0, &params, &[], &[], &kernel);
        assert!(massing.volumes().all(|v| v.height == 6.0));

        // 50 x 50 cells: inset 15 exceeds perimeter / 20 = 10, one floor
        let tall = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 0.0),
            DVec2::new(100.0, 300.0),
            DVec2::new(0.0, 300.0),
        ];
        let tall = Block::new(&tall, &kernel).unwrap();
        let massing = generate(&BlockSurface::from_block(&tall), 1.0, &params, &[], &[], &kernel);
        assert_eq!(massing.volumes().count(), 12);
        assert!(massing.volumes().all(|v| v.height == 3.0));
    }

    #[test]
    fn far_ten_builds_a_high_tier_base_and_tower() {
        let kernel = Kernel::default();
        let block = Block::new(&square(100.0), &kernel).unwrap();
        let params = MassingParams::default();
        let massing = generate(&BlockSurface::from_block(&block), 10.0, &params, &bottom_road(), &[], &kernel);

        assert_eq!(massing.buildings.len(), 1);
        let building = &massing.buildings[0];
        assert_eq!(building.tier, Some(Tier::High));

        let structure = building.structure.as_ref().unwrap();
        assert_abs_diff_eq!(structure.height, 15.0);
        // outer 104 x 104, inner inset by 0.6 * (50 - 2)
        assert_abs_diff_eq!(polygon_area(&structure.base), 104.0 * 104.0, epsilon = 1e-6);
        assert_abs_diff_eq!(polygon_area(&structure.holes[0]), 46.4 * 46.4, epsilon = 1e-6);

        assert_eq!(building.primary_edges.len(), 1);
        assert!(building.secondary_edges.is_empty());
        let base = building.primary_tower_base.as_ref().unwrap();
        assert_abs_diff_eq!(polygon_area(base), 104.0 * 30.8, epsilon = 1e-6);

        // residual (10 - 5 * base / cell) * cell, 60 percent of it on the tower base
        let base_far: f64 = (104.0 * 104.0 - 46.4 * 46.4) / 10_000.0 * 5.0;
        let floors = ((10.0 - base_far) * 10_000.0 * 0.6 / (104.0 * 30.8)).floor();
        let tower = building.primary_tower.as_ref().unwrap();
        assert_abs_diff_eq!(tower.elevation, 15.0);
        assert_abs_diff_eq!(tower.height, (floors + 1.0) * 3.0);
        assert!(building.secondary_tower.is_none());
        assert_eq!(massing.tower_volumes().count(), 1);
    }

    #[test]
    fn no_residual_means_no_tower() {
        let kernel = Kernel::default();
        let block = Block::new(&square(100.0), &kernel).unwrap();
        let params = MassingParams { densities: [0.6, 0.5, 1.0], ..Default::default() };
        let massing = generate(&BlockSurface::from_block(&block), 5.0, &params, &bottom_road(), &[], &kernel);
        // a thick ring on 5 floors already uses more than FAR 5
        assert_eq!(massing.buildings.len(), 2);
        assert!(massing.buildings[0].primary_tower_base.is_some());
        assert!(massing.buildings.iter().all(|b| b.primary_tower.is_none()));
        assert!(massing.buildings.iter().all(|b| b.structure.is_some()));
    }

    #[test]
    fn mid_tier_reports_yards() {
        let kernel = Kernel::default();
        let block = Block::new(&square(100.0), &kernel).unwrap();
        let massing = generate(&BlockSurface::from_block(&block), 3.0, &MassingParams::default(), &[], &[], &kernel);
        // U = 1, V = 2
        assert_eq!(massing.buildings.len(), 2);
        assert_eq!(massing.yards().count(), 2);
        let structure = massing.volumes().next().unwrap();
        assert_abs_diff_eq!(structure.height, 6.0 * 3.0);
    }

    #[test]
    fn non_quad_blocks_are_clipped() {
        let kernel = Kernel::default();
        let pentagon = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 0.0),
            DVec2::new(100.0, 60.0),
            DVec2::new(50.0, 100.0),
            DVec2::new(0.0, 60.0),
        ];
        let block = Block::new(&pentagon, &kernel).unwrap();
        let surface = BlockSurface::from_block(&block);
        assert!(matches!(surface, BlockSurface::Frame { .. }));
        let cells = surface.cells(2, 6, &kernel);
        let total: f64 = cells.iter().map(|c| polygon_area(c)).sum();
        assert_abs_diff_eq!(total, block.area(), epsilon = 1e-6);
    }

    #[test]
    fn far_list_must_match_blocks() {
        let kernel = Kernel::default();
        let block = Block::new(&square(10.0), &kernel).unwrap();
        let err = generate_all(&[block.clone()], &[], &MassingParams::default(), &[], &[], &kernel).unwrap_err();
        assert_eq!(err, ConfigError::FarCountMismatch { expected: 1, actual: 0 });
        let err = generate_all(&[block], &[0.0], &MassingParams::default(), &[], &[], &kernel).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { name: "far", .. }));
    }

    #[test]
    fn tiny_far_keeps_the_grid_bounded() {
        assert_eq!(grid_spans(1e-9), (MAX_GRID_SPANS, MAX_GRID_SPANS));
        assert_eq!(grid_spans(f64::MIN_POSITIVE), (MAX_GRID_SPANS, MAX_GRID_SPANS));

        let kernel = Kernel::default();
        let block = Block::new(&square(10.0), &kernel).unwrap();
        let massings = generate_all(&[block], &[1e-9], &MassingParams::default(), &[], &[], &kernel).unwrap();
        // below the low tier: footprints without volumes
        assert_eq!(massings[0].buildings.len(), MAX_GRID_SPANS * MAX_GRID_SPANS);
        assert_eq!(massings[0].volumes().count(), 0);
    }

    #[test]
    fn secondary_frontage_gets_the_remaining_share() {
        let kernel = Kernel::default();
        let block = Block::new(&square(100.0), &kernel).unwrap();
        let params = MassingParams::default();
        // coarse line along the right edge, 50 away from the primary road at its midpoint
        let secondary = vec![Segment::new(DVec2::new(100.0, -50.0), DVec2::new(100.0, 150.0))];
        let massing = generate(&BlockSurface::from_block(&block), 10.0, &params, &bottom_road(), &secondary, &kernel);
        let building = &massing.buildings[0];

        assert_eq!(building.primary_edges.len(), 1);
        assert_eq!(building.secondary_edges.len(), 1);
        assert_abs_diff_eq!(building.secondary_edges[0].start.x, 100.0);
        assert_abs_diff_eq!(building.secondary_edges[0].end.x, 100.0);

        // the strip next to the right edge, not the 73.2 wide remainder
        let base = building.secondary_tower_base.as_ref().unwrap();
        assert_abs_diff_eq!(polygon_area(base), 30.8 * 104.0, epsilon = 1e-6);
        assert!(base.iter().all(|p| p.x >= 71.2 - 1e-9));

        let base_far = (104.0 * 104.0 - 46.4 * 46.4) / 10_000.0 * 5.0;
        let residual = (10.0 - base_far) * 10_000.0;
        let primary = building.primary_tower.as_ref().unwrap();
        let secondary = building.secondary_tower.as_ref().unwrap();
        let floors = |share: f64| (residual * share / (104.0 * 30.8)).floor();
        assert_abs_diff_eq!(primary.height, (floors(0.6) + 1.0) * 3.0);
        assert_abs_diff_eq!(secondary.height, (floors(0.4) + 1.0) * 3.0);
        assert_abs_diff_eq!(secondary.height, 24.0);
        assert_abs_diff_eq!(secondary.elevation, 15.0);
        assert_eq!(massing.tower_volumes().count(), 2);
    }

    #[test]
    fn secondary_adjacency_stops_at_its_limit() {
        let kernel = Kernel::default();
        let mut building = Building::new(square(100.0), 10.0);
        let params = MassingParams::default();
        let near = [Segment::new(DVec2::new(114.0, 0.0), DVec2::new(114.0, 100.0))];
        let far = [Segment::new(DVec2::new(116.0, 0.0), DVec2::new(116.0, 100.0))];

        building.set_adjacency(&[], &far, &params, &kernel);
        assert!(building.secondary_edges.is_empty());
        building.set_adjacency(&[], &near, &params, &kernel);
        assert_eq!(building.secondary_edges.len(), 1);
    }
}

