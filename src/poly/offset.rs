// sharp-corner offsets and curve joining

use bevy::math::DVec2;

use super::utils::{edges, ensure_ccw, is_simple, polygon_area, simplify};
use super::{Kernel, Polygon, Segment};

impl Kernel {
    /// Offset a closed ring with mitred corners.
    ///
    /// Positive `distance` grows the ring outward, negative shrinks it. Edges
    /// swept away by the offset are dropped and their neighbours re-mitred.
    /// Returns `None` when fewer than three edges survive, the area collapses
    /// or the result self-intersects.
    pub fn offset_polygon(&self, polygon: &[DVec2], distance: f64) -> Option<Polygon> {
        let ring = ensure_ccw(&simplify(polygon, self.tolerance));
        if ring.len() < 3 {
            return None;
        }
        if distance.abs() < self.tolerance {
            return Some(ring);
        }

        // outward normal of a ccw edge is to its right, so shift the edges by -distance to the left
        let mut lines: Vec<(Segment, Segment)> = edges(&ring)
            .into_iter()
            .map(|e| (e, e.translated(-distance)))
            .collect();

        loop {
            if lines.len() < 3 {
                return None;
            }
            let corners = mitre_corners(&lines)?;

            // an edge that reversed direction was swept past, drop the worst one and re-mitre
            let n = lines.len();
            let consumed = (0..n)
                .map(|i| {
                    let (original, _) = lines[i];
                    let run = (corners[(i + 1) % n] - corners[i]).dot(original.direction());
                    (i, run / original.direction().length_squared())
                })
                .filter(|(_, run)| *run <= 0.0)
                .min_by(|a, b| a.1.total_cmp(&b.1));

            match consumed {
                Some((i, _)) => {
                    lines.remove(i);
                }
                None => {
                    let offset = simplify(&corners, self.tolerance);
                    if offset.len() < 3 || polygon_area(&offset) < self.tolerance || !is_simple(&offset) {
                        return None;
                    }
                    return Some(offset);
                }
            }
        }
    }

    pub fn inset(&self, polygon: &[DVec2], distance: f64) -> Option<Polygon> {
        self.offset_polygon(polygon, -distance)
    }

    pub fn outset(&self, polygon: &[DVec2], distance: f64) -> Option<Polygon> {
        self.offset_polygon(polygon, distance)
    }

    /// Offset an open polyline to the left of its direction with mitred joints.
    pub fn offset_polyline(&self, points: &[DVec2], distance: f64) -> Option<Vec<DVec2>> {
        let segments = super::polyline_segments(points);
        if segments.is_empty() {
            return None;
        }
        let shifted: Vec<Segment> = segments.iter().map(|s| s.translated(distance)).collect();

        let mut out = Vec::with_capacity(shifted.len() + 1);
        out.push(shifted[0].start);
        for pair in shifted.windows(2) {
            let joint = match pair[0].line_intersection_params(&pair[1]) {
                Some((t, _)) => pair[0].point_at(t),
                None => pair[1].start,
            };
            out.push(joint);
        }
        out.push(shifted[shifted.len() - 1].end);

        let valid = super::polyline_segments(&out).len() == segments.len()
            && out
                .windows(2)
                .zip(&segments)
                .all(|(w, s)| (w[1] - w[0]).dot(s.direction()) > 0.0);
        valid.then_some(out)
    }

    /// Lengthen both ends of a polyline along its end segments.
    pub fn extend_polyline(&self, points: &[DVec2], length: f64) -> Option<Vec<DVec2>> {
        if points.len() < 2 {
            return None;
        }
        let mut out = points.to_vec();
        let last = out.len() - 1;
        let head = (out[0] - out[1]).normalize_or_zero();
        let tail = (out[last] - out[last - 1]).normalize_or_zero();
        if head == DVec2::ZERO || tail == DVec2::ZERO {
            return None;
        }
        out[0] += head * length;
        out[last] += tail * length;
        Some(out)
    }

    /// Join segments sharing endpoints into polylines, in discovery order.
    ///
    /// A segment is reversed when that is what it takes to continue a chain;
    /// a closed chain repeats its first point at the end.
    pub fn join(&self, segments: &[Segment]) -> Vec<Vec<DVec2>> {
        let mut used = vec![false; segments.len()];
        let mut chains = Vec::new();

        for first in 0..segments.len() {
            if used[first] {
                continue;
            }
            used[first] = true;
            let mut chain = vec![segments[first].start, segments[first].end];

            // grow forward, then backward
            for forward in [true, false] {
                loop {
                    let tip = if forward { chain[chain.len() - 1] } else { chain[0] };
                    let found = segments.iter().enumerate().find_map(|(i, s)| {
                        if used[i] {
                            None
                        } else if self.same_point(s.start, tip) {
                            Some((i, *s))
                        } else if self.same_point(s.end, tip) {
                            Some((i, s.reversed()))
                        } else {
                            None
                        }
                    });
                    let Some((i, s)) = found else { break };
                    used[i] = true;
                    if forward {
                        chain.push(s.end);
                    } else {
                        chain.insert(0, s.end);
                    }
                }
            }
            chains.push(chain);
        }

        chains
    }
}

// corner i joins shifted line i-1 to shifted line i
fn mitre_corners(lines: &[(Segment, Segment)]) -> Option<Polygon> {
    let n = lines.len();
    (0..n)
        .map(|i| {
            let (prev_edge, prev) = lines[(i + n - 1) % n];
            let (edge, next) = lines[i];
            match prev.line_intersection_params(&next) {
                Some((t, _)) => Some(prev.point_at(t)),
                // collinear neighbours continue straight, opposing ones pinch the ring shut
                None if prev_edge.direction().dot(edge.direction()) > 0.0 => Some(next.start),
                None => None,
            }
        })
        .collect()
}
