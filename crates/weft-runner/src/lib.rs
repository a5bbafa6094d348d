//! # weft-runner
//!
//! Runs the external cloth simulator as a subprocess.
//!
//! ## Key Types
//!
//! - [`ExternalSimulator`] — Invokes `simulateoffline` and `generate`,
//!   then assembles the exported frames.
//! - [`ProgressTracker`] — Counts output frames from the simulator's
//!   `Sim frame [N]` progress lines.

pub mod progress;
pub mod runner;

pub use progress::{parse_progress_line, ProgressTracker};
pub use runner::{ExternalSimulator, SimulationReport};
