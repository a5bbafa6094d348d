//! Weft CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "Weft: cloth meshes in, simulated frames out")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a planar cloth mesh.
    Generate {
        #[command(subcommand)]
        kind: GenerateKind,
    },

    /// Map world-space points to the nearest vertices of a mesh.
    Handles {
        /// Path to the mesh file.
        #[arg(short, long)]
        mesh: PathBuf,

        /// Query point as `x,y,z` (repeatable).
        #[arg(short, long = "point", value_parser = commands::parse_point, required = true)]
        points: Vec<[f64; 3]>,

        /// Maximum distance to the nearest vertex.
        #[arg(short, long, default_value_t = weft_types::constants::DEFAULT_HANDLE_THRESHOLD)]
        threshold: f64,
    },

    /// Run the external simulator from a config file and archive the result.
    Simulate {
        /// Path to simulation config (TOML).
        #[arg(short, long, default_value = "simulation.toml")]
        config: PathBuf,

        /// Path to the simulator executable.
        #[arg(short, long)]
        exe: PathBuf,

        /// Directory for the simulator's output.
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,

        /// Where to write the state archive.
        #[arg(short, long, default_value = "state.bin")]
        archive: PathBuf,

        /// Parse frames in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Assemble exported frames into a state archive.
    Ingest {
        /// Directory holding the frame exports.
        dir: PathBuf,

        /// Where to write the state archive.
        #[arg(short, long, default_value = "state.bin")]
        output: PathBuf,

        /// Handle node ids, comma separated.
        #[arg(long, value_delimiter = ',')]
        handles: Vec<u32>,

        /// Parse frames in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Inspect a state archive.
    Inspect {
        /// Path to the archive.
        path: PathBuf,
    },

    /// Validate a config (.toml/.json), mesh (.obj) or archive (.bin).
    Validate {
        /// Path to the file.
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum GenerateKind {
    /// Poisson-disk sampled plane.
    Poisson {
        #[arg(long, default_value_t = 1.0)]
        width: f64,
        #[arg(long, default_value_t = 1.0)]
        height: f64,
        /// Spacing steps along the shorter side.
        #[arg(short, long, default_value_t = 20)]
        resolution: u32,
        #[arg(long, default_value_t = weft_types::constants::DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,
        /// Seed for a reproducible mesh.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output mesh file.
        #[arg(short, long, default_value = "cloth.obj")]
        output: PathBuf,
    },

    /// Regular grid plane.
    Grid {
        #[arg(long, default_value_t = 1.0)]
        width: f64,
        #[arg(long, default_value_t = 1.0)]
        height: f64,
        #[arg(short, long, default_value_t = 0.05)]
        spacing: f64,
        /// Output mesh file.
        #[arg(short, long, default_value = "cloth.obj")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate { kind } => match kind {
            GenerateKind::Poisson {
                width,
                height,
                resolution,
                max_attempts,
                seed,
                output,
            } => commands::generate_poisson(width, height, resolution, max_attempts, seed, &output),
            GenerateKind::Grid {
                width,
                height,
                spacing,
                output,
            } => commands::generate_grid(width, height, spacing, &output),
        },
        Commands::Handles {
            mesh,
            points,
            threshold,
        } => commands::handles(&mesh, &points, threshold),
        Commands::Simulate {
            config,
            exe,
            out_dir,
            archive,
            parallel,
        } => commands::simulate(&config, &exe, &out_dir, &archive, parallel),
        Commands::Ingest {
            dir,
            output,
            handles,
            parallel,
        } => commands::ingest(&dir, &output, &handles, parallel),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
