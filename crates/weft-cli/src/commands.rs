//! CLI command implementations.

use std::path::Path;

use tracing::info;
use weft_config::{validate_config, SimulationConfig};
use weft_ingest::StateAssembler;
use weft_math::DVec3;
use weft_mesh::generators::{poisson_disk_plane, poisson_disk_plane_seeded, uniform_grid_plane};
use weft_mesh::obj::{load_obj, save_obj};
use weft_mesh::TriangleMesh;
use weft_runner::ExternalSimulator;
use weft_state::{archive, SimulationState};
use weft_telemetry::{EventBus, EventKind, TracingSink};
use weft_types::{NodeId, WeftResult};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Parses `x,y,z`.
pub fn parse_point(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let num = |v: &str| v.parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok([num(x)?, num(y)?, num(z)?])
}

fn telemetry() -> EventBus {
    EventBus::new().with_sink(TracingSink::default())
}

fn write_mesh(mesh: &TriangleMesh, output: &Path) -> CmdResult {
    save_obj(mesh, output)?;

    let mut bus = telemetry();
    bus.emit_kind(
        0,
        EventKind::MeshGenerated {
            vertices: mesh.vertex_count() as u32,
            triangles: mesh.triangle_count() as u32,
        },
    );
    bus.finish();

    println!("Vertices:   {}", mesh.vertex_count());
    println!("Triangles:  {}", mesh.triangle_count());
    println!("Written to: {}", output.display());
    Ok(())
}

/// Generate a Poisson-disk plane.
pub fn generate_poisson(
    width: f64,
    height: f64,
    resolution: u32,
    max_attempts: u32,
    seed: Option<u64>,
    output: &Path,
) -> CmdResult {
    println!("Weft Poisson-Disk Plane");
    println!("───────────────────────");

    let mesh = match seed {
        Some(seed) => poisson_disk_plane_seeded(width, height, resolution, max_attempts, seed)?,
        None => poisson_disk_plane(width, height, resolution, max_attempts, &mut rand::rng())?,
    };
    write_mesh(&mesh, output)
}

/// Generate a regular grid plane.
pub fn generate_grid(width: f64, height: f64, spacing: f64, output: &Path) -> CmdResult {
    println!("Weft Grid Plane");
    println!("───────────────");

    let mesh = uniform_grid_plane(width, height, spacing)?;
    write_mesh(&mesh, output)
}

/// Map points onto mesh vertices.
pub fn handles(mesh_path: &Path, points: &[[f64; 3]], threshold: f64) -> CmdResult {
    let mesh = load_obj(mesh_path)?;
    let queries: Vec<DVec3> = points.iter().map(|&p| DVec3::from_array(p)).collect();
    let found = mesh.find_nearest_vertices(&queries, threshold);

    let mut ids = Vec::new();
    for (p, id) in points.iter().zip(&found) {
        match id {
            Some(id) => {
                println!("[{}, {}, {}] -> {id}", p[0], p[1], p[2]);
                ids.push(id.to_string());
            }
            None => println!("[{}, {}, {}] -> none within {threshold}", p[0], p[1], p[2]),
        }
    }
    if !ids.is_empty() {
        println!();
        println!("nodes = [{}]", ids.join(", "));
    }
    Ok(())
}

/// Run the external simulator and archive its frames.
pub fn simulate(
    config_path: &Path,
    exe: &Path,
    out_dir: &Path,
    archive_path: &Path,
    parallel: bool,
) -> CmdResult {
    println!("Weft Simulation");
    println!("───────────────");
    println!("Config: {}", config_path.display());
    println!();

    let config = SimulationConfig::load(config_path)?;
    let mut bus = telemetry();

    let result = ExternalSimulator::new(exe)
        .run(&config, out_dir, parallel, Some(&bus))
        .and_then(|state| save_archive(&state, archive_path, &bus).map(|()| state));
    bus.finish();
    let state = result?;

    print_summary(&state);
    println!("Archive:      {}", archive_path.display());
    Ok(())
}

/// Ingest an output directory.
pub fn ingest(dir: &Path, output: &Path, handles: &[u32], parallel: bool) -> CmdResult {
    println!("Weft Ingest");
    println!("───────────");
    println!("Directory: {}", dir.display());
    println!();

    let mut assembler = StateAssembler::new().parallel(parallel);
    if !handles.is_empty() {
        assembler = assembler.with_handles(handles.iter().copied().map(NodeId).collect());
    }

    let mut bus = telemetry();
    let result = assembler.ingest_dir(dir, Some(&bus)).and_then(|()| {
        let state = assembler.finish();
        save_archive(&state, output, &bus).map(|()| state)
    });
    bus.finish();
    let state = result?;

    print_summary(&state);
    println!("Archive:      {}", output.display());
    Ok(())
}

fn save_archive(state: &SimulationState, path: &Path, bus: &EventBus) -> WeftResult<()> {
    archive::save(state, path)?;
    bus.emit_kind(
        0,
        EventKind::ArchiveSaved {
            frames: state.frame_count() as u32,
            nodes: state.node_count() as u32,
        },
    );
    Ok(())
}

/// Inspect a state archive.
pub fn inspect(path: &Path) -> CmdResult {
    println!("Weft Archive Inspector");
    println!("──────────────────────");
    println!();

    let state = archive::load(path)?;
    print_summary(&state);

    if let Some(first) = state.frame(0) {
        let (lo, hi) = first.iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), &p| (lo.min(DVec3::from_array(p)), hi.max(DVec3::from_array(p))),
        );
        println!(
            "Frame 0 box:  [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
            lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
        );
        println!("Max displace: {:.4}m", state.max_displacement());
    }
    Ok(())
}

fn print_summary(state: &SimulationState) {
    println!("Frames:       {}", state.frame_count());
    println!("Nodes:        {}", state.node_count());
    println!("Faces:        {}", state.faces().len());
    println!(
        "Velocities:   {}",
        if state.velocities().is_some() { "yes" } else { "no" }
    );
    match state.node_roles() {
        Some(_) => println!("Handles:      {}", state.handle_nodes().len()),
        None => println!("Handles:      (no roles)"),
    }
}

/// Validate a config, mesh or archive.
pub fn validate(path: &Path) -> CmdResult {
    println!("Weft Validator");
    println!("──────────────");
    println!();

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml" | "json") => {
            println!("Validating config: {}", path.display());
            let config = SimulationConfig::load(path)?;
            validate_config(&config)?;
            println!(
                "✅ Config is valid ({} cloths, {} frames).",
                config.cloths.len(),
                config.total_frames()
            );
        }
        Some("obj") => {
            println!("Validating mesh: {}", path.display());
            let mesh = load_obj(path)?;
            let orphans = mesh.orphan_vertices();
            if orphans.is_empty() {
                println!(
                    "✅ Mesh is valid ({} verts, {} tris).",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
            } else {
                println!("❌ Mesh has {} vertices not used by any triangle.", orphans.len());
            }
        }
        Some("bin") => {
            println!("Validating archive: {}", path.display());
            let state = archive::load(path)?;
            println!(
                "✅ Archive is valid ({} frames, {} nodes).",
                state.frame_count(),
                state.node_count()
            );
        }
        _ => {
            info!(path = %path.display(), "unrecognized extension");
            println!("Unsupported file format. Use .toml/.json (config), .obj (mesh) or .bin (archive).");
        }
    }

    Ok(())
}
