//! YAML scene files: arena, gravity and an ordered body list.
//!
//! ```yaml
//! arena: { x: 0, y: 0, w: 360, h: 640 }
//! gravity: 0.2
//! bodies:
//!   - { kind: box, x: 100, y: 100, width: 50, height: 50, vx: 3, vy: 2, color: [255, 0, 0] }
//!   - { kind: box, x: 0, y: 300, width: 100, height: 20, static: true }
//! ```

use crate::body::{BodyDesc, BodyError, BoxDesc};
use crate::world::World;
use boxworld_common::{Bounds, Color};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("body {index}: {source}")]
    InvalidBody {
        index: usize,
        #[source]
        source: BodyError,
    },
}

/// One entry of a scene's body list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneBody {
    Box(BoxDesc),
    PointMass(BodyDesc),
}

/// A world description. Body order in the file is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub arena: Bounds,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default)]
    pub bodies: Vec<SceneBody>,
}

fn default_gravity() -> f64 {
    World::DEFAULT_GRAVITY
}

impl Scene {
    /// A 360x640 arena with gravity 0.2, a red and a blue box in flight and a
    /// green static ledge on the left wall.
    pub fn demo() -> Self {
        Self {
            arena: Bounds::new(0.0, 0.0, 360.0, 640.0),
            gravity: 0.2,
            bodies: vec![
                SceneBody::Box(
                    BoxDesc::new(100.0, 100.0, 50.0, 50.0)
                        .with_velocity(3.0, 2.0)
                        .with_color(Color::RED),
                ),
                SceneBody::Box(
                    BoxDesc::new(260.0, 200.0, 80.0, 80.0)
                        .with_velocity(-2.0, 1.0)
                        .with_color(Color::BLUE),
                ),
                SceneBody::Box(
                    BoxDesc::new(0.0, 300.0, 100.0, 20.0)
                        .with_color(Color::GREEN)
                        .fixed(),
                ),
            ],
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build a world, adding bodies in list order. Stops at the first invalid body.
    pub fn build_world(&self) -> Result<World, SceneError> {
        let mut world = World::new(self.arena, self.gravity);
        for (index, entry) in self.bodies.iter().enumerate() {
            let added = match entry {
                SceneBody::Box(desc) => world.add_box(desc.clone()),
                SceneBody::PointMass(desc) => world.add_point_mass(desc.clone()),
            };
            added.map_err(|source| SceneError::InvalidBody { index, source })?;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;

    #[test]
    fn demo_scene_builds() {
        let world = Scene::demo().build_world().unwrap();
        assert_eq!(world.len(), 3);
        assert_eq!(world.gravity(), 0.2);
        let ledge = world.bodies()[2].as_box().unwrap();
        assert!(ledge.is_static());
        assert_eq!(ledge.body.color, Color::GREEN);
    }

    #[test]
    fn parses_yaml_with_defaults() {
        let scene = Scene::from_yaml_str(
            r#"
arena: { x: 0, y: 0, w: 200, h: 100 }
bodies:
  - { kind: box, x: 10, y: 10, width: 5, height: 5, vx: 1 }
  - { kind: point_mass, x: 50, y: 50, mass: 2 }
  - { kind: box, x: 0, y: 90, width: 200, height: 10, static: true, bounciness: 0.3 }
"#,
        )
        .unwrap();
        assert_eq!(scene.gravity, World::DEFAULT_GRAVITY);
        assert_eq!(scene.bodies.len(), 3);

        let world = scene.build_world().unwrap();
        let first = world.bodies()[0].as_box().unwrap();
        assert_eq!(first.body.velocity.x, 1.0);
        assert_eq!(first.bounciness, 0.8);
        assert!(matches!(world.bodies()[1], Body::PointMass(_)));
        assert_eq!(world.bodies()[1].physics().mass(), 2.0);
        let floor = world.bodies()[2].as_box().unwrap();
        assert!(floor.is_static());
        assert_eq!(floor.bounciness, 0.3);
    }

    #[test]
    fn invalid_body_reports_its_index() {
        let scene = Scene::from_yaml_str(
            r#"
arena: { x: 0, y: 0, w: 200, h: 100 }
bodies:
  - { kind: box, x: 10, y: 10, width: 5, height: 5 }
  - { kind: box, x: 10, y: 10, width: -5, height: 5 }
"#,
        )
        .unwrap();
        let err = scene.build_world().unwrap_err();
        assert!(matches!(err, SceneError::InvalidBody { index: 1, .. }));
        assert!(err.to_string().starts_with("body 1:"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = Scene::from_yaml_str("arena: [1, 2").unwrap_err();
        assert!(matches!(err, SceneError::Yaml(_)));
    }

    #[test]
    fn yaml_text_reproduces_scene() {
        let scene = Scene::demo();
        let text = scene.to_yaml_string().unwrap();
        assert_eq!(Scene::from_yaml_str(&text).unwrap(), scene);
    }
}
