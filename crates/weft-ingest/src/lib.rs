//! # weft-ingest
//!
//! Turns the external simulator's per-frame export files into a
//! [`weft_state::SimulationState`].
//!
//! - [`tokenizer`] — One export line to one [`tokenizer::Record`].
//! - [`parser`] — One export file to a single-frame state.
//! - [`assembler`] — Ordered fold of many frames into one state.

pub mod assembler;
pub mod parser;
pub mod tokenizer;

pub use assembler::{discover_frames, StateAssembler};
pub use parser::{parse_frame, parse_frame_file};
