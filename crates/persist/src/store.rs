//! Snapshot files.
//!
//! A snapshot file is pretty-printed JSON:
//! ```text
//! { "schema_version": 1, "snapshot": { "tick": .., "bounds": .., "gravity": ..,
//!   "bodies": [ { "kind": "box", .. }, .. ], "hash": "<sha256 hex>" } }
//! ```
//! Loading checks the schema version and the content hash and fails closed.

use crate::snapshot::{check_integrity, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Current snapshot file schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Errors from persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no snapshot at index {0}")]
    NoSnapshot(usize),
}

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    schema_version: u32,
    snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct SnapshotFile {
    schema_version: u32,
    snapshot: Snapshot,
}

/// Write a snapshot to `path`, replacing any existing file.
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<(), PersistError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(
        file,
        &SnapshotFileRef {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            snapshot,
        },
    )?;
    info!(path = %path.display(), tick = snapshot.tick, "snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`, rejecting unknown schema versions and
/// snapshots whose content no longer matches their hash.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, PersistError> {
    let path = path.as_ref();
    let file: SnapshotFile = serde_json::from_reader(std::fs::File::open(path)?)?;
    if file.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(PersistError::SchemaMismatch {
            file_version: file.schema_version,
            expected_version: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    check_integrity(&file.snapshot)?;
    info!(path = %path.display(), tick = file.snapshot.tick, "snapshot loaded");
    Ok(file.snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxworld_kernel::{Scene, World};

    fn stepped_demo(ticks: usize) -> World {
        let mut world = Scene::demo().build_world().unwrap();
        for _ in 0..ticks {
            world.step();
        }
        world
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.snapshot.json");
        let world = stepped_demo(37);

        let snap = Snapshot::capture(&world);
        save_snapshot(&path, &snap).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, snap);
        assert_eq!(loaded.restore().state_hash(), world.state_hash());
    }

    #[test]
    fn loaded_snapshot_steps_like_the_original() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.snapshot.json");
        let mut world = stepped_demo(123);
        save_snapshot(&path, &Snapshot::capture(&world)).unwrap();

        let mut restored = load_snapshot(&path).unwrap().restore();
        for _ in 0..100 {
            world.step();
            restored.step();
        }
        assert_eq!(restored.state_hash(), world.state_hash());
    }

    #[test]
    fn integrity_fail_closed_on_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.snapshot.json");
        let world = stepped_demo(5);
        save_snapshot(&path, &Snapshot::capture(&world)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let corrupted = text.replacen("\"tick\": 5", "\"tick\": 6", 1);
        assert_ne!(text, corrupted);
        std::fs::write(&path, corrupted).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, PersistError::IntegrityMismatch { .. }));
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.snapshot.json");
        save_snapshot(&path, &Snapshot::capture(&stepped_demo(0))).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replacen("\"schema_version\": 1", "\"schema_version\": 99", 1))
            .unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(
            err,
            PersistError::SchemaMismatch {
                file_version: 99,
                expected_version: 1
            }
        ));
    }

    #[test]
    fn invalid_body_in_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.snapshot.json");
        save_snapshot(&path, &Snapshot::capture(&stepped_demo(0))).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replacen("\"width\": 50.0", "\"width\": 0.0", 1)).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_snapshot(tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
