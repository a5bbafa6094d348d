//! Frame export parser.
//!
//! An export file lists world nodes (`v`), material vertices (`ms`) and
//! faces whose corners pair a node with a material vertex. The two index
//! spaces differ, so the parser rebuilds the node → material map from the
//! face corners and reorders the material vertices to line up with the
//! nodes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;
use weft_state::SimulationState;
use weft_types::{Scalar, WeftError, WeftResult};

use crate::tokenizer::{tokenize, Corner, Record};

/// Parses one export stream into a single-frame state.
///
/// `origin` names the stream in error messages (usually the file path).
///
/// # Errors
/// - [`WeftError::MalformedExport`] for unparsable lines, a face pointing
///   at a missing material vertex, a node paired with two different
///   material vertices, or a node with no material vertex at all.
/// - [`WeftError::IndexOutOfRange`] for a face pointing at a missing node.
pub fn parse_frame<R: BufRead>(reader: R, origin: &str) -> WeftResult<SimulationState> {
    let mut nodes: Vec<[Scalar; 3]> = Vec::new();
    let mut materials: Vec<[Scalar; 3]> = Vec::new();
    let mut faces: Vec<(usize, [Corner; 3])> = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let record = tokenize(&line).map_err(|e| {
            WeftError::MalformedExport(format!("{origin}:{}: {e}", n + 1))
        })?;
        match record {
            Record::Node(p) => nodes.push(p),
            Record::MaterialVertex(p) => materials.push(p),
            Record::Face(corners) => faces.push((n + 1, corners)),
            Record::Skip => {}
        }
    }

    if nodes.is_empty() {
        return Err(WeftError::MalformedExport(format!("{origin}: no nodes")));
    }

    let node_count = nodes.len();
    let mut node_material: Vec<Option<u32>> = vec![None; node_count];
    for &(line_no, corners) in &faces {
        for c in corners {
            if c.node as usize >= node_count {
                return Err(WeftError::IndexOutOfRange {
                    index: c.node as usize,
                    count: node_count,
                });
            }
            if c.material as usize >= materials.len() {
                return Err(WeftError::MalformedExport(format!(
                    "{origin}:{line_no}: material vertex {} does not exist ({} defined)",
                    c.material + 1,
                    materials.len()
                )));
            }
            match node_material[c.node as usize] {
                Some(m) if m != c.material => {
                    return Err(WeftError::MalformedExport(format!(
                        "{origin}:{line_no}: node {} paired with material vertices {} and {}",
                        c.node + 1,
                        m + 1,
                        c.material + 1
                    )));
                }
                _ => node_material[c.node as usize] = Some(c.material),
            }
        }
    }

    let rest = node_material
        .iter()
        .enumerate()
        .map(|(i, m)| match m {
            Some(m) => Ok(materials[*m as usize]),
            None => Err(WeftError::MalformedExport(format!(
                "{origin}: node {} has no material vertex",
                i + 1
            ))),
        })
        .collect::<WeftResult<Vec<_>>>()?;

    let faces: Vec<[u32; 3]> = faces
        .into_iter()
        .map(|(_, [a, b, c])| [a.node, b.node, c.node])
        .collect();

    debug!(
        origin,
        nodes = node_count,
        materials = materials.len(),
        faces = faces.len(),
        "parsed frame"
    );
    SimulationState::single_frame(rest, nodes, faces)
}

/// Parses an export file.
pub fn parse_frame_file(path: impl AsRef<Path>) -> WeftResult<SimulationState> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_frame(BufReader::new(file), &path.display().to_string())
}
