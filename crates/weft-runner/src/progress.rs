//! Progress reporting from simulator stdout.
//!
//! The simulator prints one `Sim frame [N]` line per solver step. Every
//! `frame_steps` steps make one output frame.

/// Extracts the step number from a `Sim frame [N]` line.
pub fn parse_progress_line(line: &str) -> Option<u32> {
    let rest = line.trim().strip_prefix("Sim frame")?;
    let open = rest.rfind('[')?;
    let close = rest[open..].find(']')? + open;
    rest[open + 1..close].trim().parse().ok()
}

/// Counts completed output frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    total: u32,
    frame_steps: u32,
    completed: u32,
}

impl ProgressTracker {
    /// `total` expected output frames of `frame_steps` solver steps each.
    pub fn new(total: u32, frame_steps: u32) -> Self {
        Self {
            total,
            frame_steps: frame_steps.max(1),
            completed: 0,
        }
    }

    /// Feeds one stdout line. Returns the number of completed output
    /// frames if this line finished one.
    pub fn observe(&mut self, line: &str) -> Option<u32> {
        let step = parse_progress_line(line)?;
        if step % self.frame_steps != 0 {
            return None;
        }
        self.completed += 1;
        Some(self.completed)
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Completed fraction in `[0, 1]`; 1 when no frames are expected.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }
}
