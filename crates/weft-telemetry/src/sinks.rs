//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the run ends.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// The sink shares its buffer with every clone, so a clone kept by the
/// caller can inspect what the bus delivered.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Forwards events to `tracing` at a fixed level.
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        let frame = event.frame;
        match &event.kind {
            EventKind::MeshGenerated { vertices, triangles } => {
                event_at!(self.level, vertices, triangles, "mesh generated")
            }
            EventKind::FrameSimulated { total } => {
                event_at!(self.level, frame, total, "frame simulated")
            }
            EventKind::SimulationFinished { frames, wall_time } => {
                event_at!(self.level, frames, wall_time, "simulation finished")
            }
            EventKind::FrameIngested { nodes } => {
                event_at!(self.level, frame, nodes, "frame ingested")
            }
            EventKind::IngestionFinished { frames, wall_time } => {
                event_at!(self.level, frames, wall_time, "ingestion finished")
            }
            EventKind::ArchiveSaved { frames, nodes } => {
                event_at!(self.level, frames, nodes, "archive saved")
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
