//! Rendering Adapter: draws bodies for a viewer.
//!
//! # Invariants
//! - Renderer cannot mutate world truth directly.
//! - Only a body's position, extents and color tag are read.

mod renderer;
mod surface;

pub use renderer::{AsciiRenderer, DebugTextRenderer, Renderer};
pub use surface::{draw, Surface};

pub fn crate_info() -> &'static str {
    "boxworld-render v0.1.0"
}
