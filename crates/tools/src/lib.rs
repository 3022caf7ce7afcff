//! Developer Tooling: world inspector.
//!
//! # Invariants
//! - Tools only read the world.

mod inspector;

pub use inspector::{BodyInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "boxworld-tools v0.1.0"
}
