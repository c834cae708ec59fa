// saves a generated district as an obj file
// by meshing every base structure and tower volume

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bevy::log::info;
use bevy::prelude::Mesh;
use bevy::render::mesh::{Indices, VertexAttributeValues};

use crate::generation::pipeline::District;
use crate::mesh::volume_mesh;

/// Write every volume of `district` as its own OBJ object.
///
/// # Returns
/// The number of objects written
pub fn write_obj<W: Write>(district: &District, writer: &mut W) -> io::Result<usize> {
    writeln!(writer, "# block massing export")?;
    writeln!(writer, "# {} blocks, {} buildings", district.setbacks.blocks.len(), district.building_count())?;

    // OBJ indices start at 1
    let mut vertex_offset = 1;
    let mut count = 0;

    let structures = district.massing.iter().flat_map(|m| m.volumes().map(|v| ("Building", v)));
    let towers = district.massing.iter().flat_map(|m| m.tower_volumes().map(|v| ("Tower", v)));
    for (kind, volume) in structures.chain(towers) {
        let mesh = volume_mesh(volume);
        let written = write_mesh(writer, &format!("{kind}_{count}"), &mesh, vertex_offset)?;
        if written > 0 {
            vertex_offset += written;
            count += 1;
        }
    }

    writer.flush()?;
    Ok(count)
}

// vertices then faces of one mesh, returns the vertex count
fn write_mesh<W: Write>(writer: &mut W, name: &str, mesh: &Mesh, vertex_offset: u32) -> io::Result<u32> {
    let Some(VertexAttributeValues::Float32x3(vertices)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
        return Ok(0);
    };
    if vertices.is_empty() {
        return Ok(0);
    }

    writeln!(writer, "o {name}")?;
    for vertex in vertices {
        writeln!(writer, "v {} {} {}", vertex[0], vertex[1], vertex[2])?;
    }

    let faces: Vec<u32> = match mesh.indices() {
        Some(Indices::U16(indices)) => indices.iter().map(|i| *i as u32).collect(),
        Some(Indices::U32(indices)) => indices.clone(),
        None => Vec::new(),
    };
    for chunk in faces.chunks_exact(3) {
        writeln!(
            writer,
            "f {} {} {}",
            vertex_offset + chunk[0],
            vertex_offset + chunk[1],
            vertex_offset + chunk[2]
        )?;
    }
    writeln!(writer)?;

    Ok(vertices.len() as u32)
}

pub fn export_obj(district: &District, path: impl AsRef<Path>) -> io::Result<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let count = write_obj(district, &mut writer)?;
    info!("exported {} volumes to {}", count, path.display());
    Ok(count)
}
