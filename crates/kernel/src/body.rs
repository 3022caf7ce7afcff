use boxworld_common::Color;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Default integration step: one tick.
pub const DEFAULT_DT: f64 = 1.0;

const DEFAULT_MASS: f64 = 1.0;
const DEFAULT_BOUNCINESS: f64 = 0.8;

/// Rejected body parameters. Raised at construction, never from a step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BodyError {
    #[error("mass must be positive, got {mass}")]
    InvalidMass { mass: f64 },
    #[error("box extents must be positive, got {width}x{height}")]
    InvalidExtent { width: f64, height: f64 },
}

fn check_mass(mass: f64) -> Result<(), BodyError> {
    if mass.is_nan() || mass <= 0.0 {
        return Err(BodyError::InvalidMass { mass });
    }
    Ok(())
}

fn check_extent(width: f64, height: f64) -> Result<(), BodyError> {
    if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
        return Err(BodyError::InvalidExtent { width, height });
    }
    Ok(())
}

/// A point mass with position, velocity and a color tag.
///
/// Deserialization goes through [`BodyDesc`], so a decoded body is validated
/// the same way as a built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyDesc", into = "BodyDesc")]
pub struct PhysicsBody {
    pub position: DVec2,
    pub velocity: DVec2,
    mass: f64,
    pub color: Color,
}

impl PhysicsBody {
    /// Create a resting white body. Fails if `mass` is not positive.
    pub fn new(position: DVec2, mass: f64) -> Result<Self, BodyError> {
        check_mass(mass)?;
        Ok(Self {
            position,
            velocity: DVec2::ZERO,
            mass,
            color: Color::default(),
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `v += f / m`.
    pub fn apply_force(&mut self, force: DVec2) {
        self.velocity += force / self.mass;
    }

    /// `p += v * dt`.
    pub fn integrate(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }
}

/// Construction parameters for a [`PhysicsBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default)]
    pub color: Color,
}

fn default_mass() -> f64 {
    DEFAULT_MASS
}

fn default_bounciness() -> f64 {
    DEFAULT_BOUNCINESS
}

impl BodyDesc {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            mass: DEFAULT_MASS,
            color: Color::default(),
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn build(self) -> Result<PhysicsBody, BodyError> {
        PhysicsBody::try_from(self)
    }
}

impl TryFrom<BodyDesc> for PhysicsBody {
    type Error = BodyError;

    fn try_from(desc: BodyDesc) -> Result<Self, Self::Error> {
        let mut body = PhysicsBody::new(DVec2::new(desc.x, desc.y), desc.mass)?;
        body.velocity = DVec2::new(desc.vx, desc.vy);
        body.color = desc.color;
        Ok(body)
    }
}

impl From<PhysicsBody> for BodyDesc {
    fn from(body: PhysicsBody) -> Self {
        Self {
            x: body.position.x,
            y: body.position.y,
            vx: body.velocity.x,
            vy: body.velocity.y,
            mass: body.mass,
            color: body.color,
        }
    }
}

/// An axis-aligned box: a [`PhysicsBody`] whose position is its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxDesc", into = "BoxDesc")]
pub struct BoxBody {
    pub body: PhysicsBody,
    width: f64,
    height: f64,
    is_static: bool,
    /// Velocity scale on boundary reflection. Conventionally in `[0, 1]`, not enforced.
    pub bounciness: f64,
}

impl BoxBody {
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn left(&self) -> f64 {
        self.body.position.x
    }

    pub fn top(&self) -> f64 {
        self.body.position.y
    }

    pub fn right(&self) -> f64 {
        self.body.position.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.body.position.y + self.height
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            self.body.position.x + self.width / 2.0,
            self.body.position.y + self.height / 2.0,
        )
    }

    /// Integrate unless static.
    pub fn integrate(&mut self, dt: f64) {
        if !self.is_static {
            self.body.integrate(dt);
        }
    }
}

/// Construction parameters for a [`BoxBody`]. Defaults: mass 1, at rest,
/// white, dynamic, bounciness 0.8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDesc {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default = "default_bounciness")]
    pub bounciness: f64,
}

impl BoxDesc {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            mass: DEFAULT_MASS,
            color: Color::default(),
            is_static: false,
            bounciness: DEFAULT_BOUNCINESS,
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Mark the box as an immovable obstacle.
    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f64) -> Self {
        self.bounciness = bounciness;
        self
    }

    pub fn build(self) -> Result<BoxBody, BodyError> {
        BoxBody::try_from(self)
    }
}

impl TryFrom<BoxDesc> for BoxBody {
    type Error = BodyError;

    fn try_from(desc: BoxDesc) -> Result<Self, Self::Error> {
        check_extent(desc.width, desc.height)?;
        let body = BodyDesc {
            x: desc.x,
            y: desc.y,
            vx: desc.vx,
            vy: desc.vy,
            mass: desc.mass,
            color: desc.color,
        }
        .build()?;
        Ok(Self {
            body,
            width: desc.width,
            height: desc.height,
            is_static: desc.is_static,
            bounciness: desc.bounciness,
        })
    }
}

impl From<BoxBody> for BoxDesc {
    fn from(b: BoxBody) -> Self {
        Self {
            x: b.body.position.x,
            y: b.body.position.y,
            width: b.width,
            height: b.height,
            vx: b.body.velocity.x,
            vy: b.body.velocity.y,
            mass: b.body.mass,
            color: b.body.color,
            is_static: b.is_static,
            bounciness: b.bounciness,
        }
    }
}

/// The closed set of body kinds a world holds.
///
/// Only boxes take part in gravity, boundary containment and collisions;
/// point masses just integrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    PointMass(PhysicsBody),
    Box(BoxBody),
}

impl Body {
    pub fn integrate(&mut self, dt: f64) {
        match self {
            Body::PointMass(body) => body.integrate(dt),
            Body::Box(b) => b.integrate(dt),
        }
    }

    pub fn physics(&self) -> &PhysicsBody {
        match self {
            Body::PointMass(body) => body,
            Body::Box(b) => &b.body,
        }
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsBody {
        match self {
            Body::PointMass(body) => body,
            Body::Box(b) => &mut b.body,
        }
    }

    pub fn as_box(&self) -> Option<&BoxBody> {
        match self {
            Body::Box(b) => Some(b),
            Body::PointMass(_) => None,
        }
    }

    pub fn as_box_mut(&mut self) -> Option<&mut BoxBody> {
        match self {
            Body::Box(b) => Some(b),
            Body::PointMass(_) => None,
        }
    }

    pub fn color(&self) -> Color {
        self.physics().color
    }
}

impl From<PhysicsBody> for Body {
    fn from(body: PhysicsBody) -> Self {
        Body::PointMass(body)
    }
}

impl From<BoxBody> for Body {
    fn from(b: BoxBody) -> Self {
        Body::Box(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_force_divides_by_mass() {
        let mut body = BodyDesc::new(0.0, 0.0).with_mass(2.0).build().unwrap();
        body.apply_force(DVec2::new(4.0, -1.0));
        assert_eq!(body.velocity, DVec2::new(2.0, -0.5));
        body.apply_force(DVec2::new(4.0, -1.0));
        assert_eq!(body.velocity, DVec2::new(4.0, -1.0));
    }

    #[test]
    fn integrate_moves_by_velocity_times_dt() {
        let mut body = BodyDesc::new(1.0, 2.0).with_velocity(3.0, -4.0).build().unwrap();
        body.integrate(DEFAULT_DT);
        assert_eq!(body.position, DVec2::new(4.0, -2.0));
        body.integrate(0.5);
        assert_eq!(body.position, DVec2::new(5.5, -4.0));
        assert_eq!(body.velocity, DVec2::new(3.0, -4.0));
    }

    #[test]
    fn static_box_does_not_integrate() {
        let mut b = BoxDesc::new(10.0, 10.0, 5.0, 5.0)
            .with_velocity(1.0, 1.0)
            .fixed()
            .build()
            .unwrap();
        b.integrate(DEFAULT_DT);
        assert_eq!(b.body.position, DVec2::new(10.0, 10.0));
    }

    #[test]
    fn dynamic_box_integrates() {
        let mut b = BoxDesc::new(10.0, 10.0, 5.0, 5.0)
            .with_velocity(1.0, 2.0)
            .build()
            .unwrap();
        b.integrate(DEFAULT_DT);
        assert_eq!(b.body.position, DVec2::new(11.0, 12.0));
    }

    #[test]
    fn box_defaults() {
        let b = BoxDesc::new(0.0, 0.0, 1.0, 2.0).build().unwrap();
        assert_eq!(b.body.mass(), 1.0);
        assert_eq!(b.body.velocity, DVec2::ZERO);
        assert_eq!(b.body.color, Color::WHITE);
        assert!(!b.is_static());
        assert_eq!(b.bounciness, 0.8);
    }

    #[test]
    fn box_geometry() {
        let b = BoxDesc::new(10.0, 20.0, 4.0, 6.0).build().unwrap();
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 14.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 26.0);
        assert_eq!(b.center(), DVec2::new(12.0, 23.0));
        assert_eq!(b.size(), DVec2::new(4.0, 6.0));
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        for mass in [0.0, -1.0, f64::NAN] {
            let err = BodyDesc::new(0.0, 0.0).with_mass(mass).build().unwrap_err();
            assert!(matches!(err, BodyError::InvalidMass { .. }));
        }
        let err = BoxDesc::new(0.0, 0.0, 1.0, 1.0)
            .with_mass(0.0)
            .build()
            .unwrap_err();
        assert_eq!(err, BodyError::InvalidMass { mass: 0.0 });
    }

    #[test]
    fn non_positive_extent_is_rejected() {
        for (w, h) in [(0.0, 1.0), (1.0, 0.0), (-2.0, 1.0), (1.0, f64::NAN)] {
            let err = BoxDesc::new(0.0, 0.0, w, h).build().unwrap_err();
            assert!(matches!(err, BodyError::InvalidExtent { .. }));
        }
    }

    #[test]
    fn bounciness_is_not_clamped() {
        let b = BoxDesc::new(0.0, 0.0, 1.0, 1.0)
            .with_bounciness(1.5)
            .build()
            .unwrap();
        assert_eq!(b.bounciness, 1.5);
    }

    #[test]
    fn body_variant_dispatch() {
        let mut point: Body = BodyDesc::new(0.0, 0.0).with_velocity(1.0, 0.0).build().unwrap().into();
        let mut fixed: Body = BoxDesc::new(0.0, 0.0, 1.0, 1.0)
            .with_velocity(1.0, 0.0)
            .fixed()
            .build()
            .unwrap()
            .into();
        point.integrate(DEFAULT_DT);
        fixed.integrate(DEFAULT_DT);
        assert_eq!(point.physics().position.x, 1.0);
        assert_eq!(fixed.physics().position.x, 0.0);
        assert!(point.as_box().is_none());
        assert!(fixed.as_box().is_some());
    }

    #[test]
    fn yaml_decoding_validates() {
        let ok: Body = serde_yaml::from_str(
            "kind: box\nx: 1\ny: 2\nwidth: 3\nheight: 4\nstatic: true\ncolor: [255, 0, 0]\n",
        )
        .unwrap();
        let b = ok.as_box().unwrap();
        assert!(b.is_static());
        assert_eq!(b.body.color, Color::RED);
        assert_eq!(b.bounciness, 0.8);

        let bad = serde_yaml::from_str::<Body>("kind: box\nx: 0\ny: 0\nwidth: 0\nheight: 4\n");
        assert!(bad.is_err());
        let bad = serde_yaml::from_str::<Body>("kind: point_mass\nx: 0\ny: 0\nmass: -3\n");
        assert!(bad.is_err());
    }

    #[test]
    fn yaml_encoding_preserves_body() {
        let body: Body = BoxDesc::new(1.5, 2.5, 3.0, 4.0)
            .with_velocity(-1.0, 0.25)
            .with_color(Color::BLUE)
            .build()
            .unwrap()
            .into();
        let text = serde_yaml::to_string(&body).unwrap();
        assert!(text.contains("kind: box"));
        let back: Body = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, body);
    }
}
