use crate::body::{Body, BodyDesc, BodyError, BoxBody, BoxDesc, DEFAULT_DT};
use crate::collision::{overlaps, resolve};
use boxworld_common::{BodyIndex, Bounds};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// An event record produced by every mutation to the world.
///
/// Replaying the log into a fresh world with the same bounds and gravity
/// reproduces the world exactly, since stepping is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Body appended at `index` in the given initial state.
    BodyAdded { index: BodyIndex, body: Body },
    /// A force was applied to a body between steps.
    ForceApplied { index: BodyIndex, force: DVec2 },
    /// Simulation advanced to `tick`, resolving `contacts` pairs.
    Stepped { tick: u64, contacts: usize },
}

/// The simulated arena and everything in it.
///
/// Bodies live in a dense `Vec` in insertion order. That order is the
/// iteration order of every pass in [`World::step`], so it decides the
/// outcome of multi-body contacts. There is no removal.
#[derive(Debug, Clone)]
pub struct World {
    bounds: Bounds,
    gravity: f64,
    bodies: Vec<Body>,
    tick: u64,
    /// Append-only event log of all mutations.
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Gravity used when a scene does not name one.
    pub const DEFAULT_GRAVITY: f64 = 0.5;

    /// Create an empty world. Bounds and gravity are fixed for its lifetime.
    pub fn new(bounds: Bounds, gravity: f64) -> Self {
        debug!(?bounds, gravity, "world created");
        Self {
            bounds,
            gravity,
            bodies: Vec::new(),
            tick: 0,
            event_log: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Set the tick directly (used for snapshot restore).
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// All bodies, in insertion order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: BodyIndex) -> Option<&Body> {
        self.bodies.get(index.get())
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Append a body. Its index is its position in every later pass.
    pub fn add_body(&mut self, body: impl Into<Body>) -> BodyIndex {
        let body = body.into();
        let index = BodyIndex(self.bodies.len());
        debug!(%index, kind = kind_name(&body), "body added");
        self.event_log.push(WorldEvent::BodyAdded {
            index,
            body: body.clone(),
        });
        self.bodies.push(body);
        index
    }

    /// Validate and append a box.
    pub fn add_box(&mut self, desc: BoxDesc) -> Result<BodyIndex, BodyError> {
        Ok(self.add_body(desc.build()?))
    }

    /// Validate and append a point mass.
    pub fn add_point_mass(&mut self, desc: BodyDesc) -> Result<BodyIndex, BodyError> {
        Ok(self.add_body(desc.build()?))
    }

    /// Apply a force to one body. Returns false if `index` is out of range.
    pub fn apply_force(&mut self, index: BodyIndex, force: DVec2) -> bool {
        let Some(body) = self.bodies.get_mut(index.get()) else {
            return false;
        };
        body.physics_mut().apply_force(force);
        self.event_log.push(WorldEvent::ForceApplied { index, force });
        true
    }

    /// Advance the simulation by one tick.
    ///
    /// 1. Every dynamic box gains `gravity` on `vy`; every body integrates
    ///    with `dt = 1`. Each box is then clamped into the arena, reflecting
    ///    the clamped axis with its own bounciness.
    /// 2. Each box pair `(i, j)`, `i < j`, that overlaps is resolved once with
    ///    the smaller of the two bounciness values. No further iterations.
    pub fn step(&mut self) {
        let gravity = self.gravity;
        let bounds = self.bounds;

        for (i, body) in self.bodies.iter_mut().enumerate() {
            match body {
                Body::Box(b) => {
                    if !b.is_static() {
                        b.body.velocity.y += gravity;
                    }
                    b.integrate(DEFAULT_DT);
                    if contain(b, &bounds) {
                        trace!(i, "clamped to arena");
                    }
                }
                Body::PointMass(p) => p.integrate(DEFAULT_DT),
            }
        }

        let mut contacts = 0;
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (Body::Box(a), Body::Box(b)) = pair_mut(&mut self.bodies, i, j) else {
                    continue;
                };
                if !overlaps(a, b) {
                    continue;
                }
                let restitution = a.bounciness.min(b.bounciness);
                if let Some(contact) = resolve(a, b, restitution) {
                    trace!(i, j, axis = ?contact.axis, depth = contact.depth, "contact resolved");
                    contacts += 1;
                }
            }
        }

        self.tick += 1;
        debug!(tick = self.tick, contacts, "stepped");
        self.event_log.push(WorldEvent::Stepped {
            tick: self.tick,
            contacts,
        });
    }

    /// Index pairs of boxes that currently overlap, in pass order.
    ///
    /// After a step this lists residual overlap the single resolution pass
    /// left behind.
    pub fn overlapping_pairs(&self) -> Vec<(BodyIndex, BodyIndex)> {
        let mut pairs = Vec::new();
        for (i, a) in self.bodies.iter().enumerate() {
            let Some(a) = a.as_box() else { continue };
            for (j, b) in self.bodies.iter().enumerate().skip(i + 1) {
                let Some(b) = b.as_box() else { continue };
                if overlaps(a, b) {
                    pairs.push((BodyIndex(i), BodyIndex(j)));
                }
            }
        }
        pairs
    }

    /// Re-run one recorded mutation. Stepping is recomputed, not copied.
    pub fn apply(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::BodyAdded { body, .. } => {
                self.add_body(body.clone());
            }
            WorldEvent::ForceApplied { index, force } => {
                self.apply_force(*index, *force);
            }
            WorldEvent::Stepped { .. } => self.step(),
        }
    }

    /// Reconstruct a world from an event log (for replay).
    pub fn replay(bounds: Bounds, gravity: f64, events: &[WorldEvent]) -> Self {
        let mut world = Self::new(bounds, gravity);
        for event in events {
            world.apply(event);
        }
        world
    }

    /// Compute a deterministic hash of the world state for comparison.
    /// Covers the tick and the raw bits of every body field, in index order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for body in &self.bodies {
            let p = body.physics();
            mix(&mut h, &[u8::from(body.as_box().is_some())]);
            mix(&mut h, &p.position.x.to_le_bytes());
            mix(&mut h, &p.position.y.to_le_bytes());
            mix(&mut h, &p.velocity.x.to_le_bytes());
            mix(&mut h, &p.velocity.y.to_le_bytes());
            mix(&mut h, &p.mass().to_le_bytes());
            if let Some(b) = body.as_box() {
                mix(&mut h, &b.width().to_le_bytes());
                mix(&mut h, &b.height().to_le_bytes());
                mix(&mut h, &b.bounciness.to_le_bytes());
                mix(&mut h, &[u8::from(b.is_static())]);
            }
        }
        h
    }
}

/// Keep a box inside `bounds`, one axis at a time. Returns true on any clamp.
fn contain(b: &mut BoxBody, bounds: &Bounds) -> bool {
    let mut clamped = false;

    if b.left() < bounds.left() {
        b.body.position.x = bounds.left();
        b.body.velocity.x *= -b.bounciness;
        clamped = true;
    } else if b.right() > bounds.right() {
        b.body.position.x = bounds.right() - b.width();
        b.body.velocity.x *= -b.bounciness;
        clamped = true;
    }

    if b.top() < bounds.top() {
        b.body.position.y = bounds.top();
        b.body.velocity.y *= -b.bounciness;
        clamped = true;
    } else if b.bottom() > bounds.bottom() {
        b.body.position.y = bounds.bottom() - b.height();
        b.body.velocity.y *= -b.bounciness;
        clamped = true;
    }

    clamped
}

/// Disjoint mutable borrows of `bodies[i]` and `bodies[j]`. Requires `i < j`.
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

fn kind_name(body: &Body) -> &'static str {
    match body {
        Body::PointMass(_) => "point_mass",
        Body::Box(_) => "box",
    }
}
