use boxworld_common::{Bounds, Color};
use boxworld_kernel::Body;

/// A grid of colored cells covering a world-space rectangle.
///
/// Cell `(col, row)` covers world `[ox + col*scale, ox + (col+1)*scale)`
/// horizontally and likewise vertically. Row 0 is the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    origin_x: f64,
    origin_y: f64,
    scale: f64,
    background: Color,
    cells: Vec<Color>,
}

impl Surface {
    /// A `width` x `height` surface whose top-left cell starts at world `(0, 0)`.
    /// `scale` is world units per cell.
    pub fn new(width: usize, height: usize, scale: f64) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
            scale,
            background: Color::BLACK,
            cells: vec![Color::BLACK; width * height],
        }
    }

    /// A surface just large enough to cover `bounds` at `scale`.
    pub fn covering(bounds: Bounds, scale: f64) -> Self {
        let width = (bounds.w / scale).ceil().max(0.0) as usize;
        let height = (bounds.h / scale).ceil().max(0.0) as usize;
        Self {
            origin_x: bounds.x,
            origin_y: bounds.y,
            ..Self::new(width, height, scale)
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Fill every cell with `color`, which becomes the background.
    pub fn clear(&mut self, color: Color) {
        self.background = color;
        self.cells.fill(color);
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Color> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Paint the cells a world-space rectangle touches, clipped to the surface.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let (c0, c1) = self.span(x - self.origin_x, w, self.width);
        let (r0, r1) = self.span(y - self.origin_y, h, self.height);
        for row in r0..r1 {
            let start = row * self.width;
            self.cells[start + c0..start + c1].fill(color);
        }
    }

    /// Paint the single cell containing a world-space point, if any.
    pub fn plot(&mut self, x: f64, y: f64, color: Color) {
        let col = ((x - self.origin_x) / self.scale).floor();
        let row = ((y - self.origin_y) / self.scale).floor();
        if col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = color;
        }
    }

    /// Cell range `[start, end)` covered by `[offset, offset + len)` on one axis.
    fn span(&self, offset: f64, len: f64, limit: usize) -> (usize, usize) {
        let start = (offset / self.scale).floor().max(0.0) as usize;
        let end = ((offset + len) / self.scale).ceil().max(0.0) as usize;
        let end = end.min(limit);
        (start.min(end), end)
    }

    /// One glyph per cell, one line per row.
    ///
    /// Background is `.`, the named primaries are `R`/`G`/`B`, white is `#`,
    /// anything else `o`.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            for &cell in row {
                out.push(self.glyph(cell));
            }
            out.push('\n');
        }
        out
    }

    fn glyph(&self, color: Color) -> char {
        if color == self.background {
            return '.';
        }
        match color {
            Color::RED => 'R',
            Color::GREEN => 'G',
            Color::BLUE => 'B',
            Color::WHITE => '#',
            _ => 'o',
        }
    }
}

/// Paint one body: a box fills its rectangle, a point mass fills one cell.
pub fn draw(body: &Body, surface: &mut Surface) {
    match body {
        Body::Box(b) => {
            let p = b.body.position;
            surface.fill_rect(p.x, p.y, b.width(), b.height(), b.body.color);
        }
        Body::PointMass(p) => surface.plot(p.position.x, p.position.y, p.color),
    }
}
