//! Ordered assembly of frame exports into one simulation state.
//!
//! The assembler starts empty and grows one frame at a time. Any
//! malformed frame aborts the ingestion; the frames merged before it
//! stay in the assembler. Frames may be parsed on the rayon pool, but
//! merging always happens in frame order on the calling thread.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;
use weft_state::{append, assign_roles, SimulationState};
use weft_telemetry::{EventBus, EventKind};
use weft_types::{NodeId, WeftResult};

use crate::parser::parse_frame_file;

/// Prefix of obstacle exports, which are not part of the cloth.
const OBSTACLE_PREFIX: &str = "obs";

/// Folds frames into a [`SimulationState`].
#[derive(Debug, Clone, Default)]
pub struct StateAssembler {
    state: SimulationState,
    handles: Option<Vec<NodeId>>,
    parallel: bool,
}

impl StateAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags these nodes as handles in every frame.
    pub fn with_handles(mut self, handles: Vec<NodeId>) -> Self {
        self.handles = Some(handles);
        self
    }

    /// Parses files on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Frames merged so far.
    pub fn frame_count(&self) -> usize {
        self.state.frame_count()
    }

    /// Appends one parsed frame (or run of frames). A rejected frame
    /// leaves the frames merged so far in place.
    pub fn push(&mut self, frame: SimulationState) -> WeftResult<()> {
        let frame = match &self.handles {
            Some(handles) => assign_roles(frame, handles)?,
            None => frame,
        };
        append(&mut self.state, frame)
    }

    /// Parses and appends `files` in the given order.
    pub fn ingest_files<P>(&mut self, files: &[P], bus: Option<&EventBus>) -> WeftResult<()>
    where
        P: AsRef<Path> + Sync,
    {
        let start = Instant::now();
        let parsed: Vec<WeftResult<SimulationState>> = if self.parallel {
            files.par_iter().map(parse_frame_file).collect()
        } else {
            // Serial parsing stops at the first bad file
            let mut out = Vec::with_capacity(files.len());
            for f in files {
                let frame = parse_frame_file(f);
                let failed = frame.is_err();
                out.push(frame);
                if failed {
                    break;
                }
            }
            out
        };

        for frame in parsed {
            let frame = frame?;
            let nodes = frame.node_count() as u32;
            self.push(frame)?;
            if let Some(bus) = bus {
                bus.emit_kind(
                    self.frame_count().saturating_sub(1) as u32,
                    EventKind::FrameIngested { nodes },
                );
            }
        }

        let wall_time = start.elapsed().as_secs_f64();
        if let Some(bus) = bus {
            bus.emit_kind(
                0,
                EventKind::IngestionFinished {
                    frames: self.frame_count() as u32,
                    wall_time,
                },
            );
        }
        info!(
            files = files.len(),
            frames = self.frame_count(),
            parallel = self.parallel,
            wall_time,
            "ingested frames"
        );
        Ok(())
    }

    /// Discovers and ingests every frame export in `dir`.
    pub fn ingest_dir(&mut self, dir: impl AsRef<Path>, bus: Option<&EventBus>) -> WeftResult<()> {
        let files = discover_frames(dir)?;
        self.ingest_files(&files, bus)
    }

    /// The assembled state.
    pub fn finish(self) -> SimulationState {
        self.state
    }
}

/// Frame exports in `dir`: `*.obj` files not starting with `obs`, sorted
/// by file name.
pub fn discover_frames(dir: impl AsRef<Path>) -> WeftResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("obj") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(OBSTACLE_PREFIX) {
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
