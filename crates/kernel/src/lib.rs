//! World Kernel: box bodies, overlap test, collision resolution, world stepping.
//!
//! # Invariants
//! - Every body has positive mass; every box has positive width and height.
//! - A step is a pure function of the body list, bounds and gravity. Two worlds
//!   built by the same `add_body` sequence produce bit-identical trajectories.
//! - Static boxes never integrate and are never displaced by collisions.

pub mod body;
pub mod collision;
pub mod scene;
pub mod world;

pub use body::{Body, BodyDesc, BodyError, BoxBody, BoxDesc, PhysicsBody, DEFAULT_DT};
pub use collision::{overlaps, resolve, Axis, Contact};
pub use scene::{Scene, SceneBody, SceneError};
pub use world::{World, WorldEvent};
