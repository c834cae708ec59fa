// UTILS

use bevy::math::DVec2;

use super::{Polygon, Segment};

/// find the intersection between two segments, lookup Cramer's rule
/// https://cp-algorithms.com/geometry/lines-intersection.html
/// # Returns `Some(DVec2)` if the segments intersect, `None` otherwise
pub fn line_segment_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<DVec2> {
    let s1 = p2 - p1; // direction vector of segment 1
    let s2 = p4 - p3; // direction vector of segment 2

    let denom = s1.x * s2.y - s2.x * s1.y; // determinant of 2x2 matrix

    // parallel lines
    if denom.abs() < 1e-12 {
        return None;
    }

    let s = (s1.x * (p1.y - p3.y) - s1.y * (p1.x - p3.x)) / denom;
    let t = (s2.x * (p1.y - p3.y) - s2.y * (p1.x - p3.x)) / denom;

    // check if intersection is within both segments
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p1 + t * s1)
    } else {
        None
    }
}

/// Computes the signed area of a polygon, positive for counter-clockwise rings.
/// Returns 0.0 for polygons with fewer than 3 vertices.
pub fn polygon_area(polygon: &[DVec2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let n = polygon.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].x * polygon[j].y - polygon[j].x * polygon[i].y;
    }

    area / 2.0
}

/// Calculates the centroid of a polygon from its signed area.
/// Returns the vertex average for degenerate polygons.
pub fn polygon_centroid(polygon: &[DVec2], area: f64) -> DVec2 {
    if polygon.is_empty() {
        return DVec2::ZERO;
    }
    if polygon.len() < 3 || area.abs() < f64::EPSILON {
        return polygon.iter().copied().sum::<DVec2>() / polygon.len() as f64;
    }

    let n = polygon.len();
    let mut centroid = DVec2::ZERO;
    for i in 0..n {
        let j = (i + 1) % n;
        let p = polygon[i].x * polygon[j].y - polygon[j].x * polygon[i].y;
        centroid += (polygon[i] + polygon[j]) * p;
    }

    centroid / (6.0 * area)
}

pub fn perimeter(polygon: &[DVec2]) -> f64 {
    edges(polygon).iter().map(Segment::length).sum()
}

/// Closed ring edges, edge `i` runs from vertex `i` to vertex `i + 1`.
pub fn edges(polygon: &[DVec2]) -> Vec<Segment> {
    let n = polygon.len();
    (0..n)
        .map(|i| Segment::new(polygon[i], polygon[(i + 1) % n]))
        .collect()
}

/// Determines whether a point is inside a polygon using the ray-casting algorithm.
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

pub fn distance_to_boundary(point: DVec2, polygon: &[DVec2]) -> f64 {
    edges(polygon)
        .iter()
        .map(|e| e.distance_to_point(point))
        .fold(f64::INFINITY, f64::min)
}

/// Axis aligned bounds as (min, max).
pub fn bounds(points: &[DVec2]) -> (DVec2, DVec2) {
    points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

pub fn ensure_ccw(polygon: &[DVec2]) -> Polygon {
    let mut ring = polygon.to_vec();
    if polygon_area(&ring) < 0.0 {
        ring.reverse();
    }
    ring
}

/// Drops repeated vertices and vertices lying on the line through their neighbours.
pub fn simplify(polygon: &[DVec2], tolerance: f64) -> Polygon {
    let mut ring: Polygon = Vec::with_capacity(polygon.len());
    for &p in polygon {
        if ring.last().is_none_or(|last| last.distance(p) >= tolerance) {
            ring.push(p);
        }
    }
    while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) < tolerance {
        ring.pop();
    }

    // collinear removal, repeat until stable
    let mut changed = true;
    while changed && ring.len() > 3 {
        changed = false;
        let n = ring.len();
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            if Segment::new(prev, next).distance_to_point(ring[i]) < tolerance {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }

    ring
}

/// True when no two non-adjacent edges touch.
pub fn is_simple(polygon: &[DVec2]) -> bool {
    let ring = edges(polygon);
    let n = ring.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                continue;
            }
            if line_segment_intersection(ring[i].start, ring[i].end, ring[j].start, ring[j].end).is_some() {
                return false;
            }
        }
    }
    true
}

/// Sutherland–Hodgman clip of `subject` against the convex ring `clip`.
pub fn clip_to_convex(subject: &[DVec2], clip: &[DVec2]) -> Polygon {
    let clip = ensure_ccw(clip);
    let mut output = subject.to_vec();

    for edge in edges(&clip) {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let inside = |p: DVec2| edge.direction().perp_dot(p - edge.start) >= 0.0;
        let n = input.len();
        for i in 0..n {
            let current = input[i];
            let previous = input[(i + n - 1) % n];
            let crossing = || {
                Segment::new(previous, current)
                    .line_intersection_params(&edge)
                    .map(|(t, _)| previous + (current - previous) * t)
            };
            match (inside(current), inside(previous)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.extend(crossing());
                    output.push(current);
                }
                (false, true) => output.extend(crossing()),
                (false, false) => {}
            }
        }
    }

    output
}
