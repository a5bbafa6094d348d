//! Pipeline event types.
//!
//! Events are lightweight value types that carry just enough data to
//! follow a run: what was generated, how far the external simulator
//! has progressed, and how many frames have been ingested.

use serde::{Deserialize, Serialize};

/// An event emitted by the pipeline.
///
/// Tagged with the frame it refers to (0 for events not tied to a frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Frame index (0-indexed).
    pub frame: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A cloth mesh was generated.
    MeshGenerated {
        /// Number of vertices.
        vertices: u32,
        /// Number of triangles.
        triangles: u32,
    },

    /// The external simulator reported a completed output frame.
    FrameSimulated {
        /// Frames expected for the whole run.
        total: u32,
    },

    /// The external simulator exited successfully.
    SimulationFinished {
        /// Output frames reported.
        frames: u32,
        /// Wall-clock time of the run (seconds).
        wall_time: f64,
    },

    /// A frame export file was parsed and merged.
    FrameIngested {
        /// Nodes in the frame.
        nodes: u32,
    },

    /// All frames of an output directory were assembled.
    IngestionFinished {
        /// Frames in the assembled state.
        frames: u32,
        /// Wall-clock time of the ingestion (seconds).
        wall_time: f64,
    },

    /// An assembled state was written to a state archive.
    ArchiveSaved {
        frames: u32,
        nodes: u32,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u32, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
