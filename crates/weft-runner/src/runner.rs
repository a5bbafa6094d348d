//! External simulator invocation.
//!
//! The simulator is a separate executable with two sub-commands:
//! ```text
//! <exe> simulateoffline <config.json> <out_dir>   # run, writing binary frames
//! <exe> generate <out_dir>                        # export frames as text
//! ```
//! Anything the simulator writes to stderr is treated as a failure.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};
use weft_config::{validate_config, SimulationConfig};
use weft_ingest::StateAssembler;
use weft_state::SimulationState;
use weft_telemetry::{EventBus, EventKind};
use weft_types::{NodeId, WeftError, WeftResult};

use crate::progress::ProgressTracker;

/// Outcome of a `simulateoffline` run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Output frames reported on stdout.
    pub frames: u32,
    /// Output frames the configuration asked for.
    pub expected_frames: u32,
    /// Wall-clock duration (seconds).
    pub wall_time: f64,
    pub out_dir: PathBuf,
}

/// Handle on the simulator executable.
#[derive(Debug, Clone)]
pub struct ExternalSimulator {
    executable: PathBuf,
    /// Arguments placed before the sub-command, e.g. a script path when
    /// the executable is an interpreter.
    leading_args: Vec<OsString>,
}

impl ExternalSimulator {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.leading_args = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        self
    }

    /// Runs the simulation described by `config`, writing its raw output
    /// to `out_dir`.
    ///
    /// The configuration is validated, exported to a temporary JSON file
    /// (removed when the run ends) and passed to the simulator. Progress
    /// lines become [`EventKind::FrameSimulated`] events.
    ///
    /// # Errors
    /// [`WeftError::InvalidConfig`] for a bad configuration,
    /// [`WeftError::Process`] if the simulator cannot be started, exits
    /// unsuccessfully, or writes to stderr.
    pub fn simulate_offline(
        &self,
        config: &SimulationConfig,
        out_dir: impl AsRef<Path>,
        bus: Option<&EventBus>,
    ) -> WeftResult<SimulationReport> {
        validate_config(config)?;
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)?;

        let config_file = config.write_temp()?;
        let mut tracker = ProgressTracker::new(config.total_frames(), config.frame_steps);
        let start = Instant::now();

        info!(
            exe = %self.executable.display(),
            out_dir = %out_dir.display(),
            expected_frames = tracker.total(),
            "starting simulation"
        );

        let mut cmd = self.command();
        cmd.arg("simulateoffline").arg(config_file.path()).arg(out_dir);
        let mut child = self.spawn(cmd)?;
        let stderr = drain_stderr(&mut child);

        if let Some(stdout) = child.stdout.take() {
            for raw in BufReader::new(stdout).split(b'\n') {
                let raw = match raw {
                    Ok(raw) => raw,
                    Err(e) => return Err(self.abort(child, stderr, "simulateoffline", e)),
                };
                let line = String::from_utf8_lossy(&raw);
                if let Some(done) = tracker.observe(&line) {
                    debug!(frame = done, total = tracker.total(), "simulated frame");
                    if let Some(bus) = bus {
                        bus.emit_kind(
                            done.saturating_sub(1),
                            EventKind::FrameSimulated { total: tracker.total() },
                        );
                    }
                }
            }
        }

        self.finish(child, stderr, "simulateoffline")?;
        drop(config_file);

        let wall_time = start.elapsed().as_secs_f64();
        if let Some(bus) = bus {
            bus.emit_kind(
                0,
                EventKind::SimulationFinished {
                    frames: tracker.completed(),
                    wall_time,
                },
            );
        }
        info!(frames = tracker.completed(), wall_time, "simulation finished");

        Ok(SimulationReport {
            frames: tracker.completed(),
            expected_frames: tracker.total(),
            wall_time,
            out_dir: out_dir.to_path_buf(),
        })
    }

    /// Converts the raw output in `out_dir` into per-frame text exports.
    pub fn generate_frames(&self, out_dir: impl AsRef<Path>) -> WeftResult<()> {
        let out_dir = out_dir.as_ref();
        let mut cmd = self.command();
        cmd.arg("generate").arg(out_dir);
        let mut child = self.spawn(cmd)?;
        let stderr = drain_stderr(&mut child);

        if let Some(mut stdout) = child.stdout.take() {
            if let Err(e) = io::copy(&mut stdout, &mut io::sink()) {
                return Err(self.abort(child, stderr, "generate", e));
            }
        }
        self.finish(child, stderr, "generate")?;
        info!(out_dir = %out_dir.display(), "generated frame exports");
        Ok(())
    }

    /// Assembles the frame exports in `out_dir` into one state, tagging
    /// `handles` in every frame.
    pub fn load_frames(
        &self,
        out_dir: impl AsRef<Path>,
        handles: &[NodeId],
        parallel: bool,
        bus: Option<&EventBus>,
    ) -> WeftResult<SimulationState> {
        let mut assembler = StateAssembler::new().parallel(parallel);
        if !handles.is_empty() {
            assembler = assembler.with_handles(handles.to_vec());
        }
        assembler.ingest_dir(out_dir, bus)?;
        Ok(assembler.finish())
    }

    /// Simulates, exports and ingests in one go, tagging the handle nodes
    /// listed in `config`.
    pub fn run(
        &self,
        config: &SimulationConfig,
        out_dir: impl AsRef<Path>,
        parallel: bool,
        bus: Option<&EventBus>,
    ) -> WeftResult<SimulationState> {
        let out_dir = out_dir.as_ref();
        self.simulate_offline(config, out_dir, bus)?;
        self.generate_frames(out_dir)?;
        self.load_frames(out_dir, &config.handle_nodes(), parallel, bus)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.leading_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn(&self, mut cmd: Command) -> WeftResult<Child> {
        cmd.spawn().map_err(|e| {
            WeftError::Process(format!(
                "failed to start {}: {e}",
                self.executable.display()
            ))
        })
    }

    /// Waits for `child` and turns a bad exit status or stderr output
    /// into an error.
    fn finish(
        &self,
        mut child: Child,
        stderr: Option<JoinHandle<Vec<String>>>,
        stage: &str,
    ) -> WeftResult<()> {
        let status = child.wait()?;
        let errors = match stderr {
            Some(handle) => handle
                .join()
                .map_err(|_| WeftError::Process("stderr reader panicked".into()))?,
            None => Vec::new(),
        };

        if status.success() && errors.is_empty() {
            return Ok(());
        }
        Err(WeftError::Process(format!(
            "{} {stage} failed ({status}){}{}",
            self.executable.display(),
            if errors.is_empty() { "" } else { ": " },
            errors.join("; ")
        )))
    }

    /// Kills and reaps `child` after its stdout could not be read.
    fn abort(
        &self,
        mut child: Child,
        stderr: Option<JoinHandle<Vec<String>>>,
        stage: &str,
        cause: io::Error,
    ) -> WeftError {
        if let Err(e) = child.kill() {
            warn!(error = %e, "failed to kill simulator");
        }
        if let Err(e) = child.wait() {
            warn!(error = %e, "failed to reap simulator");
        }
        let errors = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        WeftError::Process(format!(
            "{} {stage} aborted: reading stdout failed: {cause}{}{}",
            self.executable.display(),
            if errors.is_empty() { "" } else { "; stderr: " },
            errors.join("; ")
        ))
    }
}

/// Collects stderr lines on a helper thread while stdout is read.
///
/// Lines are decoded lossily and the drain runs until EOF.
fn drain_stderr(child: &mut Child) -> Option<JoinHandle<Vec<String>>> {
    let stderr = child.stderr.take()?;
    Some(thread::spawn(move || {
        BufReader::new(stderr)
            .split(b'\n')
            .map_while(Result::ok)
            .map(|raw| String::from_utf8_lossy(&raw).trim_end_matches('\r').to_owned())
            .inspect(|line| warn!(target: "weft_runner::simulator", "{line}"))
            .collect()
    }))
}
