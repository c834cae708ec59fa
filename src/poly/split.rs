// split a polygon by a network of cutter segments
//
// The boundary and every cutter are noded against each other, cutter pieces
// outside the polygon and dangling pieces are dropped, and the remaining
// planar graph is walked face by face. Cutter networks that never reach the
// boundary (islands) cannot produce simple fragments and are ignored.

use std::collections::{BTreeSet, HashSet};

use bevy::math::DVec2;

use super::utils::{bounds, distance_to_boundary, edges, ensure_ccw, point_in_polygon, polygon_area, simplify};
use super::{Kernel, Polygon, Segment};
use crate::error::KernelError;

// merges vertices closer than the tolerance
struct VertexPool {
    points: Vec<DVec2>,
    tolerance: f64,
}

impl VertexPool {
    fn insert(&mut self, point: DVec2) -> usize {
        if let Some(idx) = self.points.iter().position(|p| p.distance(point) < self.tolerance) {
            return idx;
        }
        self.points.push(point);
        self.points.len() - 1
    }
}

impl Kernel {
    /// Split `polygon` by `cutters`, returning the resulting simple fragments.
    ///
    /// Every fragment is counter-clockwise and has an area above tolerance; their
    /// areas sum to the area of the input. A cutter set that does not cross the
    /// polygon yields the polygon itself.
    pub fn split(&self, polygon: &[DVec2], cutters: &[Segment]) -> Result<Vec<Polygon>, KernelError> {
        let tol = self.tolerance;
        let ring = ensure_ccw(&simplify(polygon, tol));
        if ring.len() < 3 {
            return Err(KernelError::TooFewVertices);
        }
        let area = polygon_area(&ring);
        if area < tol {
            return Err(KernelError::ZeroArea(area));
        }

        let (lo, hi) = bounds(&ring);
        let (lo, hi) = (lo - DVec2::splat(tol), hi + DVec2::splat(tol));
        let mut segments: Vec<(Segment, bool)> = edges(&ring).into_iter().map(|e| (e, true)).collect();
        segments.extend(
            cutters
                .iter()
                .filter(|c| c.length() > tol)
                .filter(|c| {
                    let (clo, chi) = bounds(&[c.start, c.end]);
                    clo.x <= hi.x && clo.y <= hi.y && chi.x >= lo.x && chi.y >= lo.y
                })
                .map(|c| (*c, false)),
        );
        if segments.len() == ring.len() {
            return Ok(vec![ring]);
        }

        let params = self.noding_params(&segments);

        // build the undirected graph, BTreeSet keeps the walk order deterministic
        let mut pool = VertexPool { points: Vec::new(), tolerance: tol };
        let mut graph: BTreeSet<(usize, usize)> = BTreeSet::new();
        let mut on_boundary: HashSet<usize> = HashSet::new();
        for ((segment, is_boundary), ts) in segments.iter().zip(params) {
            for w in ts.windows(2) {
                let p = segment.point_at(w[0]);
                let q = segment.point_at(w[1]);
                if p.distance(q) < tol {
                    continue;
                }
                if !is_boundary {
                    let mid = (p + q) * 0.5;
                    if !point_in_polygon(mid, &ring) || distance_to_boundary(mid, &ring) < tol {
                        continue;
                    }
                }
                let a = pool.insert(p);
                let b = pool.insert(q);
                if a == b {
                    continue;
                }
                if *is_boundary {
                    on_boundary.insert(a);
                    on_boundary.insert(b);
                }
                graph.insert((a.min(b), a.max(b)));
            }
        }

        prune_dangling(&mut graph, pool.points.len());
        keep_boundary_component(&mut graph, &on_boundary, pool.points.len());

        let fragments: Vec<Polygon> = trace_faces(&graph, &pool.points)
            .into_iter()
            .map(|face| simplify(&face, tol))
            .filter(|face| face.len() >= 3 && polygon_area(face) > tol)
            .collect();

        if fragments.is_empty() {
            return Err(KernelError::EmptySplit);
        }
        Ok(fragments)
    }

    // sorted, de-duplicated split parameters for each segment
    fn noding_params(&self, segments: &[(Segment, bool)]) -> Vec<Vec<f64>> {
        let tol = self.tolerance;
        let mut params: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; segments.len()];

        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let a = segments[i].0;
                let b = segments[j].0;
                let (ta, tb) = (tol / a.length(), tol / b.length());

                if let Some((t, u)) = a.line_intersection_params(&b) {
                    if t > -ta && t < 1.0 + ta && u > -tb && u < 1.0 + tb {
                        params[i].push(t.clamp(0.0, 1.0));
                        params[j].push(u.clamp(0.0, 1.0));
                    }
                }

                // touching endpoints and collinear overlaps
                for p in [b.start, b.end] {
                    if a.distance_to_point(p) < tol {
                        params[i].push(a.project(p).clamp(0.0, 1.0));
                    }
                }
                for p in [a.start, a.end] {
                    if b.distance_to_point(p) < tol {
                        params[j].push(b.project(p).clamp(0.0, 1.0));
                    }
                }
            }
        }

        for (ts, (segment, _)) in params.iter_mut().zip(segments) {
            let step = tol / segment.length();
            ts.sort_by(f64::total_cmp);
            ts.dedup_by(|b, a| (*b - *a).abs() < step);
        }
        params
    }
}

fn degrees(graph: &BTreeSet<(usize, usize)>, vertex_count: usize) -> Vec<usize> {
    let mut degree = vec![0; vertex_count];
    for &(a, b) in graph {
        degree[a] += 1;
        degree[b] += 1;
    }
    degree
}

fn prune_dangling(graph: &mut BTreeSet<(usize, usize)>, vertex_count: usize) {
    loop {
        let degree = degrees(graph, vertex_count);
        let before = graph.len();
        graph.retain(|&(a, b)| degree[a] > 1 && degree[b] > 1);
        if graph.len() == before {
            break;
        }
    }
}

fn keep_boundary_component(graph: &mut BTreeSet<(usize, usize)>, on_boundary: &HashSet<usize>, vertex_count: usize) {
    let mut adjacency = vec![Vec::new(); vertex_count];
    for &(a, b) in graph.iter() {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    let mut reached = vec![false; vertex_count];
    let mut stack: Vec<usize> = on_boundary.iter().copied().collect();
    while let Some(v) = stack.pop() {
        if reached[v] {
            continue;
        }
        reached[v] = true;
        stack.extend(adjacency[v].iter().copied().filter(|n| !reached[*n]));
    }
    graph.retain(|&(a, _)| reached[a]);
}

// walks every directed edge once, keeping the faces on its left
fn trace_faces(graph: &BTreeSet<(usize, usize)>, points: &[DVec2]) -> Vec<Polygon> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for &(a, b) in graph {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    // sort neighbours counter-clockwise by angle
    for (v, neighbours) in adjacency.iter_mut().enumerate() {
        let origin = points[v];
        neighbours.sort_by(|&m, &n| {
            let dm = points[m] - origin;
            let dn = points[n] - origin;
            dm.y.atan2(dm.x).total_cmp(&dn.y.atan2(dn.x))
        });
    }

    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut faces = Vec::new();
    let limit = graph.len() * 2 + 1;

    for &(a, b) in graph {
        for (u, v) in [(a, b), (b, a)] {
            if visited.contains(&(u, v)) {
                continue;
            }
            let mut face = Vec::new();
            let (mut cu, mut cv) = (u, v);
            loop {
                visited.insert((cu, cv));
                face.push(points[cu]);
                let neighbours = &adjacency[cv];
                let Some(idx) = neighbours.iter().position(|&n| n == cu) else {
                    break;
                };
                // next edge clockwise from the one we arrived on
                let next = neighbours[(idx + neighbours.len() - 1) % neighbours.len()];
                cu = cv;
                cv = next;
                if (cu, cv) == (u, v) || face.len() > limit {
                    break;
                }
            }
            if polygon_area(&face) > 0.0 {
                faces.push(face);
            }
        }
    }

    faces
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

    fn total_area(fragments: &[Polygon]) -> f64 {
        fragments.iter().map(|f| polygon_area(f)).sum()
    }

    #[test]
    fn single_chord_gives_two_halves() {
        let kernel = Kernel::default();
        let cut = Segment::new(DVec2::new(50.0, -5.0), DVec2::new(50.0, 105.0));
        let fragments = kernel.split(&square(100.0), &[cut]).unwrap();
        assert_eq!(fragments.len(), 2);
        for f in &fragments {
            assert_abs_diff_eq!(polygon_area(f), 5000.0, epsilon = 1e-6);
            assert_eq!(f.len(), 4);
        }
    }

    #[test]
    fn crossing_lines_give_four_quarters() {
        let kernel = Kernel::default();
        let cuts = [
            Segment::new(DVec2::new(50.0, 0.0), DVec2::new(50.0, 100.0)),
            Segment::new(DVec2::new(0.0, 30.0), DVec2::new(100.0, 30.0)),
        ];
        let fragments = kernel.split(&square(100.0), &cuts).unwrap();
        assert_eq!(fragments.len(), 4);
        assert_abs_diff_eq!(total_area(&fragments), 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn radiating_lines_split_into_sectors() {
        let kernel = Kernel::default();
        let center = DVec2::new(40.0, 55.0);
        let cuts: Vec<Segment> = edges(&square(100.0))
            .iter()
            .map(|e| Segment::new(center, e.midpoint()))
            .collect();
        let fragments = kernel.split(&square(100.0), &cuts).unwrap();
        assert_eq!(fragments.len(), 4);
        assert_abs_diff_eq!(total_area(&fragments), 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn dangling_cutter_does_not_split() {
        let kernel = Kernel::default();
        let cut = Segment::new(DVec2::new(50.0, -5.0), DVec2::new(50.0, 60.0));
        let fragments = kernel.split(&square(100.0), &[cut]).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_abs_diff_eq!(total_area(&fragments), 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn cutter_on_boundary_is_ignored() {
        let kernel = Kernel::default();
        let cut = Segment::new(DVec2::new(-10.0, 0.0), DVec2::new(110.0, 0.0));
        let fragments = kernel.split(&square(100.0), &[cut]).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].len(), 4);
    }

    #[test]
    fn inset_frame_keeps_center_fragment() {
        let kernel = Kernel::default();
        let ring = square(100.0);
        let cuts: Vec<Segment> = edges(&ring)
            .iter()
            .map(|e| e.translated(10.0).extended(10.0))
            .collect();
        let fragments = kernel.split(&ring, &cuts).unwrap();
        assert_abs_diff_eq!(total_area(&fragments), 10_000.0, epsilon = 1e-6);
        let largest = fragments
            .iter()
            .map(|f| polygon_area(f))
            .fold(0.0, f64::max);
        assert_abs_diff_eq!(largest, 80.0 * 80.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let kernel = Kernel::default();
        let line = vec![DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)];
        assert!(kernel.split(&line, &[]).is_err());
    }
}
