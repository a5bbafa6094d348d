//! Error types for the weft pipeline.
//!
//! All crates return `WeftResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the weft pipeline.
#[derive(Debug, Error)]
pub enum WeftError {
    /// A frame export file violates the export format contract.
    #[error("Malformed export: {0}")]
    MalformedExport(String),

    /// Two states with different faces or rest vertices were merged.
    #[error("Topology mismatch: {0}")]
    TopologyMismatch(String),

    /// Point generation produced a set that cannot be triangulated.
    #[error("Degenerate sampling: {0}")]
    DegenerateSampling(String),

    /// A face or handle references a vertex beyond the vertex count.
    #[error("Index {index} is out of range (count: {count})")]
    IndexOutOfRange {
        index: usize,
        count: usize,
    },

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The external simulator failed or reported errors.
    #[error("External process failed: {0}")]
    Process(String),
}

/// Convenience alias for `Result<T, WeftError>`.
pub type WeftResult<T> = Result<T, WeftError>;
