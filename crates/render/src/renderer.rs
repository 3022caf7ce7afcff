use crate::surface::{draw, Surface};
use boxworld_common::Color;
use boxworld_kernel::{Body, World};
use tracing::trace;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads world state and produces output. It never mutates the
/// world; world truth is kernel-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state.
    fn render(&self, world: &World) -> Self::Output;
}

/// Human-readable dump of every body. Useful for CLI output and logs.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== World State (tick={}, gravity={}) ===\n",
            world.tick(),
            world.gravity()
        ));
        out.push_str(&format!("Bodies: {}\n", world.len()));

        for (i, body) in world.bodies().iter().enumerate() {
            let p = body.physics();
            let [r, g, b]: [u8; 3] = p.color.into();
            match body {
                Body::Box(bx) => out.push_str(&format!(
                    "  [{i}] box {:.0}x{:.0}{} pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) rgb=({r},{g},{b})\n",
                    bx.width(),
                    bx.height(),
                    if bx.is_static() { " static" } else { "" },
                    p.position.x,
                    p.position.y,
                    p.velocity.x,
                    p.velocity.y,
                )),
                Body::PointMass(_) => out.push_str(&format!(
                    "  [{i}] point pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) rgb=({r},{g},{b})\n",
                    p.position.x, p.position.y, p.velocity.x, p.velocity.y,
                )),
            }
        }

        out
    }
}

/// Rasterizes the arena onto a [`Surface`], one cell per `scale` world units.
#[derive(Debug, Clone, Copy)]
pub struct AsciiRenderer {
    pub scale: f64,
    pub background: Color,
}

impl AsciiRenderer {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            background: Color::BLACK,
        }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Renderer for AsciiRenderer {
    type Output = Surface;

    /// Bodies are painted in index order, so later bodies cover earlier ones.
    fn render(&self, world: &World) -> Surface {
        let mut surface = Surface::covering(world.bounds(), self.scale);
        surface.clear(self.background);
        for body in world.bodies() {
            draw(body, &mut surface);
        }
        trace!(
            tick = world.tick(),
            width = surface.width(),
            height = surface.height(),
            "frame rasterized"
        );
        surface
    }
}
