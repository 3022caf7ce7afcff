//! Shared plain types used across the boxworld crates.
//!
//! Nothing here carries physics behavior; these are the values that cross
//! crate boundaries (kernel, renderer, persistence, tooling).

mod types;

pub use types::{BodyIndex, Bounds, Color};
