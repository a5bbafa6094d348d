//! Line tokenizer for frame export files.
//!
//! Each line is keyed on its first whitespace-separated token:
//!
//! | Prefix | Record                                     |
//! |--------|--------------------------------------------|
//! | `v`    | world-space node position `x y z`          |
//! | `ms`   | material-space vertex position `x y z`     |
//! | `f`    | triangle `a/p b/q c/r` (node/material ids) |
//!
//! Every other prefix (`nv`, `nl`, `tm`, `e`, comments, ...) and blank
//! lines tokenize to [`Record::Skip`].

use thiserror::Error;
use weft_types::Scalar;

/// One face corner, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    /// World node id.
    pub node: u32,
    /// Material vertex id.
    pub material: u32,
}

/// A tokenized export line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Node([Scalar; 3]),
    MaterialVertex([Scalar; 3]),
    Face([Corner; 3]),
    Skip,
}

/// Why a line could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 3 coordinates after '{prefix}', got {found}")]
    MissingCoordinates { prefix: &'static str, found: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("face must be a triangle, got {0} corners")]
    NotTriangle(usize),

    #[error("face corner '{0}' has no material index")]
    MissingMaterialIndex(String),

    #[error("face corner '{0}' uses id 0 (ids are 1-based)")]
    ZeroIndex(String),
}

/// Tokenizes one line.
pub fn tokenize(line: &str) -> Result<Record, RecordError> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("v") => coordinates("v", tokens).map(Record::Node),
        Some("ms") => coordinates("ms", tokens).map(Record::MaterialVertex),
        Some("f") => face(tokens).map(Record::Face),
        _ => Ok(Record::Skip),
    }
}

fn coordinates<'a>(
    prefix: &'static str,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<[Scalar; 3], RecordError> {
    let values: Vec<&str> = tokens.take(3).collect();
    if values.len() != 3 {
        return Err(RecordError::MissingCoordinates {
            prefix,
            found: values.len(),
        });
    }
    let mut out = [0.0; 3];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = token
            .parse()
            .map_err(|_| RecordError::InvalidNumber(token.to_string()))?;
    }
    Ok(out)
}

fn face<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<[Corner; 3], RecordError> {
    let corners: Vec<&str> = tokens.collect();
    if corners.len() != 3 {
        return Err(RecordError::NotTriangle(corners.len()));
    }
    let mut out = [Corner { node: 0, material: 0 }; 3];
    for (slot, token) in out.iter_mut().zip(corners) {
        *slot = corner(token)?;
    }
    Ok(out)
}

/// Parses `a/p`, ignoring any further `/`-separated components.
fn corner(token: &str) -> Result<Corner, RecordError> {
    let mut parts = token.split('/');
    let node = parts.next().unwrap_or_default();
    let material = match parts.next() {
        Some(m) if !m.is_empty() => m,
        _ => return Err(RecordError::MissingMaterialIndex(token.to_string())),
    };
    Ok(Corner {
        node: one_based(node, token)?,
        material: one_based(material, token)?,
    })
}

fn one_based(id: &str, token: &str) -> Result<u32, RecordError> {
    let id: u32 = id
        .parse()
        .map_err(|_| RecordError::InvalidNumber(id.to_string()))?;
    id.checked_sub(1)
        .ok_or_else(|| RecordError::ZeroIndex(token.to_string()))
}
