use boxworld_common::{BodyIndex, Color};
use boxworld_kernel::{Body, World};

/// World inspector for developer tooling.
///
/// Read-only queries against the world state for debugging and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let mut summary = WorldSummary {
            tick: world.tick(),
            body_count: world.len(),
            box_count: 0,
            static_count: 0,
            pending_events: world.events().len(),
            overlapping_pairs: world.overlapping_pairs().len(),
            kinetic_energy: 0.0,
        };
        for body in world.bodies() {
            let p = body.physics();
            summary.kinetic_energy += 0.5 * p.mass() * p.velocity.length_squared();
            if let Some(b) = body.as_box() {
                summary.box_count += 1;
                if b.is_static() {
                    summary.static_count += 1;
                }
            }
        }
        summary
    }

    /// Details of one body, or `None` if `index` is out of range.
    pub fn inspect_body(world: &World, index: BodyIndex) -> Option<BodyInfo> {
        world.body(index).map(|body| {
            let p = body.physics();
            let (size, is_static, bounciness) = match body {
                Body::Box(b) => (Some([b.width(), b.height()]), b.is_static(), Some(b.bounciness)),
                Body::PointMass(_) => (None, false, None),
            };
            BodyInfo {
                index,
                position: [p.position.x, p.position.y],
                velocity: [p.velocity.x, p.velocity.y],
                mass: p.mass(),
                size,
                is_static,
                bounciness,
                color: p.color,
            }
        })
    }

    /// Every body index, in insertion order.
    pub fn list_bodies(world: &World) -> Vec<BodyIndex> {
        (0..world.len()).map(BodyIndex).collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSummary {
    pub tick: u64,
    pub body_count: usize,
    pub box_count: usize,
    pub static_count: usize,
    pub pending_events: usize,
    /// Box pairs still overlapping (residual from the single resolution pass).
    pub overlapping_pairs: usize,
    /// Sum of `m * |v|^2 / 2` over all bodies, static ones included.
    pub kinetic_energy: f64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} bodies={} boxes={} static={} overlapping={} ke={:.3} pending_events={}",
            self.tick,
            self.body_count,
            self.box_count,
            self.static_count,
            self.overlapping_pairs,
            self.kinetic_energy,
            self.pending_events
        )
    }
}

/// Detailed info about a single body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyInfo {
    pub index: BodyIndex,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub mass: f64,
    /// Width and height; `None` for point masses.
    pub size: Option<[f64; 2]>,
    pub is_static: bool,
    pub bounciness: Option<f64>,
    pub color: Color,
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Body {} pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) mass={}",
            self.index,
            self.position[0],
            self.position[1],
            self.velocity[0],
            self.velocity[1],
            self.mass,
        )?;
        if let Some([w, h]) = self.size {
            write!(f, " size={w}x{h}")?;
        }
        if self.is_static {
            write!(f, " static")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxworld_common::Bounds;
    use boxworld_kernel::{BodyDesc, BoxDesc, Scene};

    #[test]
    fn summary_empty_world() {
        let world = World::new(Bounds::new(0.0, 0.0, 10.0, 10.0), 0.5);
        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.body_count, 0);
        assert_eq!(summary.kinetic_energy, 0.0);
    }

    #[test]
    fn summary_counts_kinds() {
        let mut world = Scene::demo().build_world().unwrap();
        world.add_point_mass(BodyDesc::new(1.0, 1.0)).unwrap();
        world.step();

        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.body_count, 4);
        assert_eq!(summary.box_count, 3);
        assert_eq!(summary.static_count, 1);
        assert_eq!(summary.pending_events, 5); // 4 adds + 1 step
        assert!(summary.kinetic_energy > 0.0);
    }

    #[test]
    fn summary_reports_residual_overlap() {
        let mut world = World::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 0.0);
        world.add_box(BoxDesc::new(10.0, 10.0, 10.0, 10.0)).unwrap();
        world.add_box(BoxDesc::new(15.0, 10.0, 10.0, 10.0)).unwrap();
        assert_eq!(WorldInspector::summary(&world).overlapping_pairs, 1);
    }

    #[test]
    fn kinetic_energy_uses_mass() {
        let mut world = World::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 0.0);
        world
            .add_point_mass(BodyDesc::new(0.0, 0.0).with_mass(2.0).with_velocity(3.0, 4.0))
            .unwrap();
        assert_eq!(WorldInspector::summary(&world).kinetic_energy, 25.0);
    }

    #[test]
    fn inspect_box_found() {
        let mut world = World::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let id = world
            .add_box(BoxDesc::new(1.0, 2.0, 3.0, 4.0).with_velocity(0.5, -0.5).fixed())
            .unwrap();

        let info = WorldInspector::inspect_body(&world, id).unwrap();
        assert_eq!(info.position, [1.0, 2.0]);
        assert_eq!(info.velocity, [0.5, -0.5]);
        assert_eq!(info.size, Some([3.0, 4.0]));
        assert!(info.is_static);
        assert_eq!(info.bounciness, Some(0.8));
        assert!(info.to_string().ends_with("size=3x4 static"));
    }

    #[test]
    fn inspect_point_mass_has_no_size() {
        let mut world = World::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let id = world.add_point_mass(BodyDesc::new(5.0, 5.0)).unwrap();
        let info = WorldInspector::inspect_body(&world, id).unwrap();
        assert_eq!(info.size, None);
        assert_eq!(info.bounciness, None);
        assert_eq!(info.position, [5.0, 5.0]);
    }

    #[test]
    fn inspect_body_not_found() {
        let world = World::new(Bounds::new(0.0, 0.0, 10.0, 10.0), 0.0);
        assert!(WorldInspector::inspect_body(&world, BodyIndex(0)).is_none());
    }

    #[test]
    fn list_bodies_in_order() {
        let world = Scene::demo().build_world().unwrap();
        assert_eq!(
            WorldInspector::list_bodies(&world),
            vec![BodyIndex(0), BodyIndex(1), BodyIndex(2)]
        );
    }

    #[test]
    fn summary_display() {
        let world = World::new(Bounds::new(0.0, 0.0, 10.0, 10.0), 0.0);
        let s = format!("{}", WorldInspector::summary(&world));
        assert!(s.contains("tick=0"));
    }
}
