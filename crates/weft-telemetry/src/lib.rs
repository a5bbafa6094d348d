//! # weft-telemetry
//!
//! Event bus for pipeline telemetry. Emits structured events
//! (mesh generated, frames simulated, frames ingested) that can be
//! consumed by pluggable sinks (in-memory, `tracing`).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
