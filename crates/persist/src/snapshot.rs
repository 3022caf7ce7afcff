use crate::store::PersistError;
use boxworld_common::Bounds;
use boxworld_kernel::{Body, World, WorldEvent};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// A content-addressed snapshot of the world state at a specific tick.
///
/// The hash covers the raw bits of every field, so any change to the
/// payload (including a single flipped bit in a velocity) fails `verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The tick at which this snapshot was taken.
    pub tick: u64,
    pub bounds: Bounds,
    pub gravity: f64,
    /// Bodies in insertion order.
    pub bodies: Vec<Body>,
    /// SHA-256 hex digest of the fields above.
    pub hash: String,
}

impl Snapshot {
    /// Create a snapshot from the current world state.
    pub fn capture(world: &World) -> Self {
        let tick = world.tick();
        let bounds = world.bounds();
        let gravity = world.gravity();
        let bodies = world.bodies().to_vec();
        let hash = content_hash(tick, &bounds, gravity, &bodies);
        Self {
            tick,
            bounds,
            gravity,
            bodies,
            hash,
        }
    }

    /// Verify the snapshot integrity by recomputing the hash.
    pub fn verify(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    pub(crate) fn recompute_hash(&self) -> String {
        content_hash(self.tick, &self.bounds, self.gravity, &self.bodies)
    }

    /// Restore a world from this snapshot, at the snapshot's tick and with an
    /// empty event log.
    pub fn restore(&self) -> World {
        let mut world = World::new(self.bounds, self.gravity);
        for body in &self.bodies {
            world.add_body(body.clone());
        }
        world.set_tick(self.tick);
        // Restore is not an authoring operation.
        world.drain_events();
        world
    }
}

fn content_hash(tick: u64, bounds: &Bounds, gravity: f64, bodies: &[Body]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tick.to_le_bytes());
    for v in [bounds.x, bounds.y, bounds.w, bounds.h, gravity] {
        hasher.update(v.to_le_bytes());
    }
    for body in bodies {
        let p = body.physics();
        hasher.update([u8::from(body.as_box().is_some())]);
        for v in [p.position.x, p.position.y, p.velocity.x, p.velocity.y, p.mass()] {
            hasher.update(v.to_le_bytes());
        }
        hasher.update([p.color.r, p.color.g, p.color.b]);
        if let Some(b) = body.as_box() {
            for v in [b.width(), b.height(), b.bounciness] {
                hasher.update(v.to_le_bytes());
            }
            hasher.update([u8::from(b.is_static())]);
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Append-only event log for persistence and replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<WorldEvent>,
}

impl EventLog {
    /// Create an empty event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events to the log. Events are never modified after writing.
    pub fn append(&mut self, events: &[WorldEvent]) {
        self.events.extend_from_slice(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }
}

/// In-memory snapshot store with rollback.
///
/// Each snapshot remembers how long the event log was when it was taken, so
/// the world can be rebuilt either at the snapshot or at the end of the log.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: Vec<(Snapshot, usize)>,
    log: EventLog,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flush pending world events, then snapshot the world. Returns the
    /// snapshot's index.
    pub fn take_snapshot(&mut self, world: &mut World) -> usize {
        self.flush_events(world);
        let snap = Snapshot::capture(world);
        debug!(tick = snap.tick, bodies = snap.bodies.len(), "snapshot taken");
        self.snapshots.push((snap, self.log.len()));
        self.snapshots.len() - 1
    }

    /// Move pending events from the world into the log.
    pub fn flush_events(&mut self, world: &mut World) {
        let events = world.drain_events();
        self.log.append(&events);
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index).map(|(snap, _)| snap)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// The world exactly as it was when snapshot `index` was taken.
    pub fn rollback(&self, index: usize) -> Result<World, PersistError> {
        let (snap, _) = self
            .snapshots
            .get(index)
            .ok_or(PersistError::NoSnapshot(index))?;
        check_integrity(snap)?;
        debug!(index, tick = snap.tick, "rolled back");
        Ok(snap.restore())
    }

    /// Snapshot `index` with every event flushed after it re-applied.
    pub fn replay_from(&self, index: usize) -> Result<World, PersistError> {
        let (snap, offset) = self
            .snapshots
            .get(index)
            .ok_or(PersistError::NoSnapshot(index))?;
        check_integrity(snap)?;
        let mut world = snap.restore();
        for event in &self.log.events()[*offset..] {
            world.apply(event);
        }
        world.drain_events();
        Ok(world)
    }
}

pub(crate) fn check_integrity(snap: &Snapshot) -> Result<(), PersistError> {
    let actual = snap.recompute_hash();
    if actual != snap.hash {
        return Err(PersistError::IntegrityMismatch {
            expected: snap.hash.clone(),
            actual,
        });
    }
    Ok(())
}
