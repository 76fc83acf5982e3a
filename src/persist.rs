//! Binary serialization of compiled BVH data: one stream for the triangle
//! array, one for the node array. The two are written and read
//! independently, and field order is the contract; records are indexed
//! positionally at traversal time.

use crate::{
    material::{MaterialCoord, MaterialKind},
    primitives::{Aabb, Triangle},
    BvhNode,
};
use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec3;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const TRIANGLE_MAGIC: [u8; 4] = *b"LMTR";
const NODE_MAGIC: [u8; 4] = *b"LMND";
const FORMAT_VERSION: u32 = 1;

fn write_vec3<W: Write>(writer: &mut W, v: Vec3) -> Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)?;
    Ok(())
}

fn read_vec3<R: Read>(reader: &mut R) -> Result<Vec3> {
    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    let z = reader.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

fn write_header<W: Write>(writer: &mut W, magic: [u8; 4], count: usize) -> Result<()> {
    writer.write_all(&magic)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u32::<LittleEndian>(count as u32)?;
    Ok(())
}

fn read_header<R: Read>(reader: &mut R, expected_magic: [u8; 4]) -> Result<usize> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != expected_magic {
        bail!(
            "bad magic {:?}, expected {:?}",
            magic,
            std::str::from_utf8(&expected_magic).unwrap_or("?")
        );
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        bail!("unsupported format version {}", version);
    }

    Ok(reader.read_u32::<LittleEndian>()? as usize)
}

pub fn write_triangles<W: Write>(writer: &mut W, triangles: &[Triangle]) -> Result<()> {
    write_header(writer, TRIANGLE_MAGIC, triangles.len())?;

    for triangle in triangles {
        write_vec3(writer, triangle.v0)?;
        write_vec3(writer, triangle.v1)?;
        write_vec3(writer, triangle.v2)?;
        write_vec3(writer, triangle.e1)?;
        write_vec3(writer, triangle.e2)?;
        write_vec3(writer, triangle.normal)?;
        writer.write_u32::<LittleEndian>(triangle.material.kind.id())?;
        writer.write_u32::<LittleEndian>(triangle.material.index)?;
    }

    Ok(())
}

pub fn read_triangles<R: Read>(reader: &mut R) -> Result<Vec<Triangle>> {
    let count = read_header(reader, TRIANGLE_MAGIC)?;

    let mut triangles = Vec::with_capacity(count);
    for i in 0..count {
        let v0 = read_vec3(reader)?;
        let v1 = read_vec3(reader)?;
        let v2 = read_vec3(reader)?;
        let e1 = read_vec3(reader)?;
        let e2 = read_vec3(reader)?;
        let normal = read_vec3(reader)?;

        let kind_id = reader.read_u32::<LittleEndian>()?;
        let kind = MaterialKind::from_id(kind_id)
            .with_context(|| format!("triangle {}: invalid material kind {}", i, kind_id))?;
        let index = reader.read_u32::<LittleEndian>()?;

        triangles.push(Triangle {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal,
            material: MaterialCoord::new(kind, index),
        });
    }

    Ok(triangles)
}

pub fn write_nodes<W: Write>(writer: &mut W, nodes: &[BvhNode]) -> Result<()> {
    write_header(writer, NODE_MAGIC, nodes.len())?;

    for node in nodes {
        write_vec3(writer, node.bounds.min)?;
        write_vec3(writer, node.bounds.max)?;
        writer.write_u32::<LittleEndian>(node.triangle_index)?;
        writer.write_u32::<LittleEndian>(node.triangle_count)?;
        writer.write_u32::<LittleEndian>(node.child_index)?;
    }

    Ok(())
}

pub fn read_nodes<R: Read>(reader: &mut R) -> Result<Vec<BvhNode>> {
    let count = read_header(reader, NODE_MAGIC)?;

    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let min = read_vec3(reader)?;
        let max = read_vec3(reader)?;
        let triangle_index = reader.read_u32::<LittleEndian>()?;
        let triangle_count = reader.read_u32::<LittleEndian>()?;
        let child_index = reader.read_u32::<LittleEndian>()?;

        nodes.push(BvhNode {
            bounds: Aabb::new(min, max),
            triangle_index,
            triangle_count,
            child_index,
        });
    }

    Ok(nodes)
}

pub fn save_triangles<P: AsRef<Path>>(path: P, triangles: &[Triangle]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create triangle file {}", path.display()))?;
    write_triangles(&mut BufWriter::new(file), triangles)
}

pub fn load_triangles<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open triangle file {}", path.display()))?;
    read_triangles(&mut BufReader::new(file))
        .with_context(|| format!("malformed triangle file {}", path.display()))
}

pub fn save_nodes<P: AsRef<Path>>(path: P, nodes: &[BvhNode]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create node file {}", path.display()))?;
    write_nodes(&mut BufWriter::new(file), nodes)
}

pub fn load_nodes<P: AsRef<Path>>(path: P) -> Result<Vec<BvhNode>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open node file {}", path.display()))?;
    read_nodes(&mut BufReader::new(file))
        .with_context(|| format!("malformed node file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;
    use std::io::Cursor;

    fn sample_triangles() -> Vec<Triangle> {
        vec![
            Triangle::new(
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(0.0, 1.0, 0.0),
                MaterialCoord::new(MaterialKind::Lambertian, 2),
            ),
            Triangle::new(
                vec3(-1.0, 2.0, 3.5),
                vec3(0.25, -0.5, 1.0),
                vec3(4.0, 4.0, -4.0),
                MaterialCoord::new(MaterialKind::Dielectric, 0),
            ),
        ]
    }

    #[test]
    fn triangles_round_trip() {
        let triangles = sample_triangles();

        let mut buffer = Vec::new();
        write_triangles(&mut buffer, &triangles).unwrap();
        let loaded = read_triangles(&mut Cursor::new(buffer)).unwrap();

        assert_eq!(loaded, triangles);
    }

    #[test]
    fn nodes_round_trip() {
        let nodes = vec![
            BvhNode {
                bounds: Aabb::new(vec3(-1.0, -2.0, -3.0), vec3(1.0, 2.0, 3.0)),
                triangle_index: 0,
                triangle_count: 0,
                child_index: 1,
            },
            BvhNode {
                bounds: Aabb::new(vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0)),
                triangle_index: 5,
                triangle_count: 7,
                child_index: 0,
            },
        ];

        let mut buffer = Vec::new();
        write_nodes(&mut buffer, &nodes).unwrap();
        let loaded = read_nodes(&mut Cursor::new(buffer)).unwrap();

        assert_eq!(loaded, nodes);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut buffer = Vec::new();
        write_nodes(&mut buffer, &[]).unwrap();

        assert!(read_triangles(&mut Cursor::new(buffer)).is_err());
    }

    #[test]
    fn rejects_invalid_material_kind() {
        let mut buffer = Vec::new();
        write_header(&mut buffer, TRIANGLE_MAGIC, 1).unwrap();
        for _ in 0..18 {
            buffer.write_f32::<LittleEndian>(0.0).unwrap();
        }
        buffer.write_u32::<LittleEndian>(99).unwrap();
        buffer.write_u32::<LittleEndian>(0).unwrap();

        assert!(read_triangles(&mut Cursor::new(buffer)).is_err());
    }
}
