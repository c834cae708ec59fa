// planar primitives consumed by the generation pipeline

use bevy::math::DVec2;

pub mod offset;
pub mod split;
pub mod utils;

// 2d polygon datatype, an ordered ring of vertices (closing edge implied)
pub type Polygon = Vec<DVec2>;

/// A straight line segment, the unit every road and split line is made of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn direction(&self) -> DVec2 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) * 0.5
    }

    pub fn point_at(&self, t: f64) -> DVec2 {
        self.start + self.direction() * t
    }

    /// Parameter of the projection of `point` on the supporting line.
    pub fn project(&self, point: DVec2) -> f64 {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq <= f64::EPSILON {
            return 0.0;
        }
        (point - self.start).dot(dir) / len_sq
    }

    pub fn distance_to_point(&self, point: DVec2) -> f64 {
        let t = self.project(point).clamp(0.0, 1.0);
        point.distance(self.point_at(t))
    }

    /// Minimum separation between two segments, zero when they touch or cross.
    pub fn min_distance_to(&self, other: &Segment) -> f64 {
        if utils::line_segment_intersection(self.start, self.end, other.start, other.end).is_some() {
            return 0.0;
        }
        self.distance_to_point(other.start)
            .min(self.distance_to_point(other.end))
            .min(other.distance_to_point(self.start))
            .min(other.distance_to_point(self.end))
    }

    /// Parameters `(t, u)` where the supporting lines cross, `None` when parallel.
    pub fn line_intersection_params(&self, other: &Segment) -> Option<(f64, f64)> {
        let s1 = self.direction();
        let s2 = other.direction();
        let denom = s1.perp_dot(s2);
        if denom.abs() < 1e-12 {
            return None;
        }
        let diff = other.start - self.start;
        let t = diff.perp_dot(s2) / denom;
        let u = diff.perp_dot(s1) / denom;
        Some((t, u))
    }

    /// Same segment pushed sideways, positive distance goes to the left of its direction.
    pub fn translated(&self, distance: f64) -> Segment {
        let dir = self.direction().normalize_or_zero();
        let left = dir.perp();
        Segment::new(self.start + left * distance, self.end + left * distance)
    }

    /// Lengthen both ends along the segment direction.
    pub fn extended(&self, length: f64) -> Segment {
        let dir = self.direction().normalize_or_zero();
        Segment::new(self.start - dir * length, self.end + dir * length)
    }

    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }
}

/// Bundles the geometric tolerance so that every primitive call receives it explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub tolerance: f64,
}

impl Default for Kernel {
    fn default() -> Self {
        Self { tolerance: crate::config::TOLERANCE }
    }
}

impl Kernel {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Minimum distance from `point` to any of `segments`, `None` if there are none.
    pub fn nearest_distance(&self, point: DVec2, segments: &[Segment]) -> Option<f64> {
        segments
            .iter()
            .map(|s| s.distance_to_point(point))
            .min_by(f64::total_cmp)
    }

    /// Whether both endpoints of `edge` lie on one of `segments`.
    pub fn lies_on(&self, edge: &Segment, segments: &[Segment]) -> bool {
        segments.iter().any(|road| {
            road.distance_to_point(edge.start) < self.tolerance
                && road.distance_to_point(edge.end) < self.tolerance
        })
    }

    pub fn same_point(&self, a: DVec2, b: DVec2) -> bool {
        a.distance(b) < self.tolerance
    }
}

/// Break a polyline into its segments.
pub fn polyline_segments(points: &[DVec2]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|w| Segment::new(w[0], w[1]))
        .filter(|s| s.length() > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let s = Segment::new(DVec2::ZERO, DVec2::new(10.0, 0.0));
        assert_abs_diff_eq!(s.distance_to_point(DVec2::new(5.0, 3.0)), 3.0);
        assert_abs_diff_eq!(s.distance_to_point(DVec2::new(13.0, 4.0)), 5.0);
    }

    #[test]
    fn min_distance_between_segments() {
        let a = Segment::new(DVec2::ZERO, DVec2::new(10.0, 0.0));
        let b = Segment::new(DVec2::new(0.0, 4.0), DVec2::new(10.0, 4.0));
        let c = Segment::new(DVec2::new(10.0, 0.0), DVec2::new(10.0, 4.0));
        assert_abs_diff_eq!(a.min_distance_to(&b), 4.0);
        assert_abs_diff_eq!(a.min_distance_to(&c), 0.0);
    }

    #[test]
    fn translation_goes_left() {
        let s = Segment::new(DVec2::ZERO, DVec2::new(10.0, 0.0));
        let t = s.translated(2.0);
        assert_abs_diff_eq!(t.start.y, 2.0);
        let e = s.extended(1.0);
        assert_abs_diff_eq!(e.length(), 12.0);
    }

    #[test]
    fn endpoint_coincidence() {
        let kernel = Kernel::default();
        let road = [Segment::new(DVec2::ZERO, DVec2::new(100.0, 0.0))];
        assert!(kernel.lies_on(&Segment::new(DVec2::new(10.0, 0.0), DVec2::new(40.0, 0.0)), &road));
        assert!(!kernel.lies_on(&Segment::new(DVec2::new(10.0, 0.0), DVec2::new(40.0, 5.0)), &road));
    }
}
