// bevy meshes for footprints and extruded volumes
//
// Planar (x, y) maps to world (x, z), heights go along +y.

use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation as _};

use crate::generation::massing::Volume;
use crate::poly::utils::{ensure_ccw, point_in_polygon};
use crate::poly::Polygon;

/// Triangulate a ring with holes, returns vertices and ccw triangles.
pub fn triangulate(outer: &[DVec2], holes: &[Polygon]) -> (Vec<DVec2>, Vec<[u32; 3]>) {
    let mut cdt: ConstrainedDelaunayTriangulation<Point2<f64>> = ConstrainedDelaunayTriangulation::new();

    for ring in std::iter::once(outer).chain(holes.iter().map(|h| h.as_slice())) {
        let handles: Vec<FixedVertexHandle> = ring
            .iter()
            .filter_map(|p| cdt.insert(Point2::new(p.x, p.y)).ok())
            .collect();
        for i in 0..handles.len() {
            let (a, b) = (handles[i], handles[(i + 1) % handles.len()]);
            if a != b && cdt.can_add_constraint(a, b) {
                cdt.add_constraint(a, b);
            }
        }
    }

    let vertices: Vec<DVec2> = cdt
        .vertices()
        .map(|v| {
            let p = v.position();
            DVec2::new(p.x, p.y)
        })
        .collect();

    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        let [a, b, c] = face.vertices().map(|v| v.fix().index());
        let center = (vertices[a] + vertices[b] + vertices[c]) / 3.0;
        // constrained edges bound the region, drop faces outside it or inside a hole
        if !point_in_polygon(center, outer) || holes.iter().any(|h| point_in_polygon(center, h)) {
            continue;
        }
        triangles.push([a as u32, b as u32, c as u32]);
    }

    (vertices, triangles)
}

fn empty_mesh() -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

#[derive(Default)]
struct MeshBuffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl MeshBuffers {
    // horizontal cap, `up` flips winding and normal
    fn cap(&mut self, outer: &[DVec2], holes: &[Polygon], height: f32, up: bool) {
        let (vertices, triangles) = triangulate(outer, holes);
        let base = self.positions.len() as u32;
        let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };

        for v in &vertices {
            self.positions.push([v.x as f32, height, v.y as f32]);
            self.normals.push(normal);
            self.uvs.push([v.x as f32, v.y as f32]);
        }
        for [a, b, c] in triangles {
            // ccw in the plane is cw seen from above
            if up {
                self.indices.extend([base + a, base + c, base + b]);
            } else {
                self.indices.extend([base + a, base + b, base + c]);
            }
        }
    }

    // walls face the right hand side of the ring direction
    fn walls(&mut self, ring: &[DVec2], bottom: f32, top: f32) {
        for i in 0..ring.len() {
            let v1 = ring[i].as_vec2();
            let v2 = ring[(i + 1) % ring.len()].as_vec2();
            let edge = v2 - v1;
            let normal = Vec2::new(edge.y, -edge.x).normalize_or_zero();
            let base_idx = self.positions.len() as u32;

            // wall quad
            self.positions.extend([
                [v1.x, bottom, v1.y],
                [v2.x, bottom, v2.y],
                [v1.x, top, v1.y],
                [v2.x, top, v2.y],
            ]);
            self.normals.extend([[normal.x, 0.0, normal.y]; 4]);

            let edge_length = edge.length();
            let wall_height = top - bottom;
            self.uvs.extend([
                [0.0, 0.0],
                [edge_length, 0.0],
                [0.0, wall_height],
                [edge_length, wall_height],
            ]);

            self.indices.extend([base_idx, base_idx + 2, base_idx + 1]);
            self.indices.extend([base_idx + 1, base_idx + 2, base_idx + 3]);
        }
    }

    fn into_mesh(self) -> Mesh {
        let mut mesh = empty_mesh();
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh
    }
}

/// Flat upward facing mesh of a footprint.
pub fn footprint_mesh(polygon: &[DVec2], elevation: f32) -> Mesh {
    if polygon.len() < 3 {
        return empty_mesh();
    }
    let mut buffers = MeshBuffers::default();
    buffers.cap(&ensure_ccw(polygon), &[], elevation, true);
    buffers.into_mesh()
}

/// Closed prism of a volume, courtyard holes included.
pub fn volume_mesh(volume: &Volume) -> Mesh {
    if volume.base.len() < 3 {
        return empty_mesh();
    }
    let outer = ensure_ccw(&volume.base);
    // holes run clockwise so their walls face into the courtyard
    let holes: Vec<Polygon> = volume
        .holes
        .iter()
        .map(|h| {
            let mut ring = ensure_ccw(h);
            ring.reverse();
            ring
        })
        .collect();

    let bottom = volume.elevation as f32;
    let top = (volume.elevation + volume.height) as f32;
    let mut buffers = MeshBuffers::default();

    buffers.walls(&outer, bottom, top);
    for hole in &holes {
        buffers.walls(hole, bottom, top);
    }
    buffers.cap(&outer, &holes, bottom, false);
    buffers.cap(&outer, &holes, top, true);
    buffers.into_mesh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::utils::polygon_area;
    use approx::assert_abs_diff_eq;

    fn square(origin: f64, side: f64) -> Polygon {
        vec![
            DVec2::new(origin, origin),
            DVec2::new(origin + side, origin),
            DVec2::new(origin + side, origin + side),
            DVec2::new(origin, origin + side),
        ]
    }

    #[test]
    fn triangulation_leaves_the_hole_open() {
        let (vertices, triangles) = triangulate(&square(0.0, 10.0), &[square(3.0, 4.0)]);
        let area: f64 = triangles
            .iter()
            .map(|t| polygon_area(&[vertices[t[0] as usize], vertices[t[1] as usize], vertices[t[2] as usize]]).abs())
            .sum();
        assert_abs_diff_eq!(area, 100.0 - 16.0, epsilon = 1e-9);
    }

    #[test]
    fn concave_footprint_is_filled_exactly() {
        let l_shape = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 4.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(4.0, 10.0),
            DVec2::new(0.0, 10.0),
        ];
        let (vertices, triangles) = triangulate(&l_shape, &[]);
        assert_eq!(vertices.len(), 6);
        assert_eq!(triangles.len(), 4);
    }

    #[test]
    fn volume_mesh_has_walls_and_caps() {
        let volume = Volume { base: square(0.0, 10.0), holes: vec![square(3.0, 4.0)], elevation: 15.0, height: 9.0 };
        let mesh = volume_mesh(&volume);
        // 8 wall quads plus two caps of 8 vertices
        assert_eq!(mesh.count_vertices(), 8 * 4 + 2 * 8);
        assert!(mesh.indices().is_some_and(|i| i.len() % 3 == 0));
    }
}
