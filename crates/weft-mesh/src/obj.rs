//! Plain mesh text format.
//!
//! One `v x y z` line per vertex and one `f i j k` line per triangle,
//! with 1-based vertex ids. No header, no metadata. This is the format
//! the external simulator reads its initial cloth from.
//!
//! Floats are written with Rust's shortest round-trip formatting, so
//! `read_obj(write_obj(mesh)) == mesh` exactly.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use weft_types::{Scalar, WeftError, WeftResult};

use crate::mesh::TriangleMesh;

/// Writes `mesh` in the plain text format.
pub fn write_obj<W: Write>(mesh: &TriangleMesh, mut out: W) -> WeftResult<()> {
    for i in 0..mesh.vertex_count() {
        let [x, y, z] = mesh.position(i);
        writeln!(out, "v {x} {y} {z}")?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `mesh` to a file at `path`.
pub fn save_obj(mesh: &TriangleMesh, path: impl AsRef<Path>) -> WeftResult<()> {
    let file = File::create(path)?;
    write_obj(mesh, BufWriter::new(file))
}

/// Reads a mesh in the plain text format.
///
/// Lines other than `v` and `f` (normals, texture coordinates, comments)
/// are skipped. For `f` corners written as `i/j/k`, only the vertex id is
/// used.
///
/// # Errors
/// [`WeftError::InvalidMesh`] for unparsable lines,
/// [`WeftError::IndexOutOfRange`] if a face references a missing vertex.
pub fn read_obj<R: BufRead>(reader: R) -> WeftResult<TriangleMesh> {
    let mut mesh = TriangleMesh::default();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    *c = parse_coordinate(tokens.next(), line_no)?;
                }
                mesh.push_vertex(coords);
            }
            Some("f") => {
                let corners: Vec<&str> = tokens.collect();
                if corners.len() != 3 {
                    return Err(WeftError::InvalidMesh(format!(
                        "line {line_no}: expected a triangle, got {} corners",
                        corners.len()
                    )));
                }
                let mut tri = [0u32; 3];
                for (slot, corner) in tri.iter_mut().zip(corners) {
                    *slot = parse_vertex_id(corner, line_no)?;
                }
                mesh.push_triangle(tri);
            }
            _ => {}
        }
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Reads a mesh from a file at `path`.
pub fn load_obj(path: impl AsRef<Path>) -> WeftResult<TriangleMesh> {
    let file = File::open(path)?;
    read_obj(BufReader::new(file))
}

fn parse_coordinate(token: Option<&str>, line_no: usize) -> WeftResult<Scalar> {
    let token = token.ok_or_else(|| {
        WeftError::InvalidMesh(format!("line {line_no}: vertex needs 3 coordinates"))
    })?;
    token.parse().map_err(|_| {
        WeftError::InvalidMesh(format!("line {line_no}: invalid coordinate '{token}'"))
    })
}

/// Parses a 1-based corner id into a 0-based index.
fn parse_vertex_id(corner: &str, line_no: usize) -> WeftResult<u32> {
    let id = corner.split('/').next().unwrap_or(corner);
    match id.parse::<u32>() {
        Ok(id) if id >= 1 => Ok(id - 1),
        _ => Err(WeftError::InvalidMesh(format!(
            "line {line_no}: invalid vertex id '{corner}'"
        ))),
    }
}
