//! Persistence: snapshots, event log, rollback, snapshot files.
//!
//! # Invariants
//! - Event log is append-only.
//! - Snapshots are content-addressed and verifiable.
//! - A restored snapshot steps bit-identically to the world it was taken from.

mod snapshot;
mod store;

pub use snapshot::{EventLog, Snapshot, SnapshotStore};
pub use store::{load_snapshot, save_snapshot, PersistError, SNAPSHOT_SCHEMA_VERSION};

pub fn crate_info() -> &'static str {
    "boxworld-persist v0.1.0"
}
