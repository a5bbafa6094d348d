//! Integration tests for weft-ingest.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use weft_ingest::tokenizer::{tokenize, Corner, Record, RecordError};
use weft_ingest::{discover_frames, parse_frame, parse_frame_file, StateAssembler};
use weft_state::NodeRole;
use weft_telemetry::{EventBus, EventKind, VecSink};
use weft_types::{NodeId, WeftError};

const TRIANGLE_FRAME: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
ms 0 0 0
ms 1 0 0
ms 0 1 0
f 1/1 2/2 3/3
";

/// Three nodes whose material ids are listed in a different order.
fn shuffled_frame(z: f64) -> String {
    format!(
        "# frame\n\
         nv 0 0 0\n\
         v 0 0 {z}\n\
         v 1 0 {z}\n\
         v 0 1 {z}\n\
         ms 0 1 0\n\
         ms 0 0 0\n\
         ms 1 0 0\n\
         tm 0\n\
         f 1/2 2/3 3/1\n"
    )
}

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

// ─── Tokenizer Tests ──────────────────────────────────────────

#[test]
fn tokenizer_keyed_on_first_token() {
    assert_eq!(tokenize("v 1 2 3"), Ok(Record::Node([1.0, 2.0, 3.0])));
    assert_eq!(
        tokenize("ms 0.5 0 -1"),
        Ok(Record::MaterialVertex([0.5, 0.0, -1.0]))
    );
    assert_eq!(tokenize("nv 1 2 3"), Ok(Record::Skip));
    assert_eq!(tokenize("vt 0 0"), Ok(Record::Skip));
    assert_eq!(tokenize("ea 0.1"), Ok(Record::Skip));
    assert_eq!(tokenize(""), Ok(Record::Skip));
}

#[test]
fn tokenizer_face_corners_are_zero_based() {
    let Ok(Record::Face(c)) = tokenize("f 1/4 2/5 3/6") else {
        panic!("expected a face");
    };
    assert_eq!(c[0], Corner { node: 0, material: 3 });
    assert_eq!(c[2], Corner { node: 2, material: 5 });
}

#[test]
fn tokenizer_face_errors() {
    assert_eq!(tokenize("f 1/1 2/2"), Err(RecordError::NotTriangle(2)));
    assert!(matches!(
        tokenize("f 1 2/2 3/3"),
        Err(RecordError::MissingMaterialIndex(_))
    ));
    assert!(matches!(
        tokenize("f 0/1 2/2 3/3"),
        Err(RecordError::ZeroIndex(_))
    ));
    assert!(matches!(
        tokenize("f a/1 2/2 3/3"),
        Err(RecordError::InvalidNumber(_))
    ));
    assert_eq!(
        tokenize("v 1 2"),
        Err(RecordError::MissingCoordinates { prefix: "v", found: 2 })
    );
}

// ─── Parser Tests ─────────────────────────────────────────────

#[test]
fn parse_single_triangle_frame() {
    let s = parse_frame(Cursor::new(TRIANGLE_FRAME), "frame").unwrap();
    assert_eq!(s.faces(), &[[0, 1, 2]]);
    assert_eq!(s.frame_count(), 1);
    assert_eq!(s.node_count(), 3);
    assert_eq!(
        s.world_positions(),
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    assert_eq!(s.rest_vertices()[0], [0.0, 0.0, 0.0]);
}

#[test]
fn parse_aligns_material_to_world_order() {
    let s = parse_frame(Cursor::new(shuffled_frame(-0.5)), "frame").unwrap();
    // node 1 ↔ ms 2, node 2 ↔ ms 3, node 3 ↔ ms 1
    assert_eq!(
        s.rest_vertices(),
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    assert_eq!(s.frame(0).unwrap()[1], [1.0, 0.0, -0.5]);
}

#[test]
fn parse_rejects_missing_material_vertex() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nms 0 0 0\nf 1/1 2/2 3/3\n";
    let err = parse_frame(Cursor::new(text), "frame.obj").unwrap_err();
    let WeftError::MalformedExport(msg) = err else {
        panic!("expected MalformedExport, got {err:?}");
    };
    assert!(msg.contains("frame.obj:5"), "{msg}");
}

#[test]
fn parse_rejects_node_out_of_range() {
    let text = "v 0 0 0\nv 1 0 0\nms 0 0 0\nms 1 0 0\nms 0 1 0\nf 1/1 2/2 3/3\n";
    let err = parse_frame(Cursor::new(text), "frame").unwrap_err();
    assert!(matches!(err, WeftError::IndexOutOfRange { index: 2, count: 2 }));
}

#[test]
fn parse_rejects_node_without_material() {
    let text = format!("{TRIANGLE_FRAME}v 5 5 5\n");
    let err = parse_frame(Cursor::new(text), "frame").unwrap_err();
    assert!(matches!(err, WeftError::MalformedExport(_)));
}

#[test]
fn parse_rejects_conflicting_material() {
    let text = format!("{TRIANGLE_FRAME}ms 9 9 9\nf 1/4 3/3 2/2\n");
    let err = parse_frame(Cursor::new(text), "frame").unwrap_err();
    assert!(matches!(err, WeftError::MalformedExport(_)));
}

#[test]
fn parse_rejects_bad_number_with_line() {
    let text = "v 0 0 0\nv 1 x 0\n";
    let err = parse_frame(Cursor::new(text), "frame").unwrap_err();
    let WeftError::MalformedExport(msg) = err else {
        panic!("expected MalformedExport");
    };
    assert!(msg.contains("frame:2"), "{msg}");
}

#[test]
fn parse_rejects_empty_frame() {
    let err = parse_frame(Cursor::new("# nothing\n"), "frame").unwrap_err();
    assert!(matches!(err, WeftError::MalformedExport(_)));
}

#[test]
fn parse_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0000_00.obj", "f 1/1 2/2\n");
    let err = parse_frame_file(dir.path().join("0000_00.obj")).unwrap_err();
    assert!(err.to_string().contains("0000_00.obj"));
}

// ─── Discovery Tests ──────────────────────────────────────────

#[test]
fn discover_sorts_and_skips_obstacles() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0002_00.obj", TRIANGLE_FRAME);
    write(dir.path(), "0000_00.obj", TRIANGLE_FRAME);
    write(dir.path(), "0001_00.obj", TRIANGLE_FRAME);
    write(dir.path(), "obs_0000_00.obj", TRIANGLE_FRAME);
    write(dir.path(), "conf.json", "{}");
    fs::create_dir(dir.path().join("sub.obj")).unwrap();

    let names: Vec<String> = discover_frames(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["0000_00.obj", "0001_00.obj", "0002_00.obj"]);
}

#[test]
fn discover_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = discover_frames(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, WeftError::Io(_)));
}

// ─── Assembler Tests ──────────────────────────────────────────

fn frames_dir(count: usize) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..count {
        write(dir.path(), &format!("{i:04}_00.obj"), &shuffled_frame(-(i as f64)));
    }
    dir
}

#[test]
fn assembler_starts_empty() {
    let assembler = StateAssembler::new();
    assert_eq!(assembler.frame_count(), 0);
    assert!(assembler.finish().is_empty());
}

#[test]
fn assembler_merges_in_file_order() {
    let dir = frames_dir(4);
    let mut assembler = StateAssembler::new();
    assembler.ingest_dir(dir.path(), None).unwrap();
    let s = assembler.finish();

    assert_eq!(s.frame_count(), 4);
    for f in 0..4 {
        assert_eq!(s.frame(f).unwrap()[0], [0.0, 0.0, -(f as f64)]);
    }
    assert!(s.node_roles().is_none());
}

#[test]
fn assembler_parallel_matches_serial() {
    let dir = frames_dir(8);
    let mut serial = StateAssembler::new();
    serial.ingest_dir(dir.path(), None).unwrap();
    let mut parallel = StateAssembler::new().parallel(true);
    parallel.ingest_dir(dir.path(), None).unwrap();
    assert_eq!(serial.finish(), parallel.finish());
}

#[test]
fn assembler_tags_handles() {
    let dir = frames_dir(2);
    let mut assembler = StateAssembler::new().with_handles(vec![NodeId(0), NodeId(2)]);
    assembler.ingest_dir(dir.path(), None).unwrap();
    let s = assembler.finish();
    assert_eq!(
        s.node_roles().unwrap(),
        &[NodeRole::Handle, NodeRole::Normal, NodeRole::Handle]
    );
}

#[test]
fn assembler_rejects_unknown_handle() {
    let dir = frames_dir(1);
    let mut assembler = StateAssembler::new().with_handles(vec![NodeId(7)]);
    let err = assembler.ingest_dir(dir.path(), None).unwrap_err();
    assert!(matches!(err, WeftError::IndexOutOfRange { index: 7, count: 3 }));
}

#[test]
fn assembler_fails_fast_on_malformed_frame() {
    for parallel in [false, true] {
        let dir = frames_dir(4);
        // Two different defects; the earlier file must be the one reported.
        write(dir.path(), "0001_00.obj", "v 0 0 0\nms 0 0 0\nf 1/1 2/1 3/1\n");
        write(dir.path(), "0003_00.obj", "v 0 0 0\n");
        let mut assembler = StateAssembler::new().parallel(parallel);
        let err = assembler.ingest_dir(dir.path(), None).unwrap_err();
        assert!(
            matches!(err, WeftError::IndexOutOfRange { index: 1, count: 1 }),
            "parallel={parallel}: {err:?}"
        );
        assert_eq!(assembler.frame_count(), 1);
    }
}

#[test]
fn assembler_keeps_frames_after_rejected_push() {
    let dir = frames_dir(2);
    let mut assembler = StateAssembler::new();
    assembler.ingest_dir(dir.path(), None).unwrap();

    let flipped = TRIANGLE_FRAME.replace("f 1/1 2/2 3/3", "f 1/1 3/3 2/2");
    let bad = parse_frame(Cursor::new(flipped), "flipped").unwrap();
    let err = assembler.push(bad).unwrap_err();
    assert!(matches!(err, WeftError::TopologyMismatch(_)));

    assert_eq!(assembler.frame_count(), 2);
    let s = assembler.finish();
    assert_eq!(s.frame(1).unwrap()[0], [0.0, 0.0, -1.0]);
}

#[test]
fn assembler_rejects_topology_drift() {
    let dir = frames_dir(1);
    let flipped = TRIANGLE_FRAME.replace("f 1/1 2/2 3/3", "f 1/1 3/3 2/2");
    write(dir.path(), "0001_00.obj", &flipped);
    let mut assembler = StateAssembler::new();
    let err = assembler.ingest_dir(dir.path(), None).unwrap_err();
    assert!(matches!(err, WeftError::TopologyMismatch(_)));
}

#[test]
fn assembler_emits_events() {
    let dir = frames_dir(3);
    let sink = VecSink::new();
    let mut bus = EventBus::new().with_sink(sink.clone());

    let mut assembler = StateAssembler::new();
    assembler.ingest_dir(dir.path(), Some(&bus)).unwrap();
    bus.flush();

    let events = sink.events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[2].frame, 2);
    assert_eq!(events[2].kind, EventKind::FrameIngested { nodes: 3 });
    assert!(matches!(
        events[3].kind,
        EventKind::IngestionFinished { frames: 3, .. }
    ));
}
