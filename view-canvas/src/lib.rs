#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::f64::consts::PI;

pub type Rgba = [u8; 4];

/// Logical (CSS-pixel) viewport dimensions plus the device pixel ratio,
/// with the backing pixel buffer sized to css * scale.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    css_width: u32,
    css_height: u32,
    scale: f64,
}

impl Viewport {
    pub fn new(css_width: u32, css_height: u32, scale: Option<f64>) -> Self {
        assert!(css_width > 0 && css_height > 0);
        let scale = scale.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(1.0);
        Self {
            css_width,
            css_height,
            scale,
        }
    }

    pub fn css_width(&self) -> u32 {
        self.css_width
    }

    pub fn css_height(&self) -> u32 {
        self.css_height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn buffer_width(&self) -> u32 {
        (self.css_width as f64 * self.scale).round() as u32
    }

    pub fn buffer_height(&self) -> u32 {
        (self.css_height as f64 * self.scale).round() as u32
    }

    /// Maps logical coordinates to backing-buffer coordinates. Rasterizers
    /// apply this themselves; callers always draw in logical units.
    pub fn to_buffer(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, y * self.scale)
    }
}

pub trait DrawSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba);

    fn clear(&mut self, color: Rgba) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set_pixel(x, y, color);
            }
        }
    }
}

/// A borrowed RGBA byte buffer, row-major, as handed out by pixels.
pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        assert_eq!(frame.len(), 4 * width as usize * height as usize);
        Self {
            frame,
            width,
            height,
        }
    }
}

impl DrawSurface for FrameSurface<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let index = 4 * (y as usize * self.width as usize + x as usize);
        self.frame[index..index + 4].copy_from_slice(&color);
    }

    fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TriangleStyle {
    pub stroke: Rgba,
    pub fill: Option<Rgba>,
}

/// Vertices of the oriented agent glyph: nose first, then the two rear
/// corners. The nose sits 1.5 sizes from the center along the heading,
/// which is what makes the glyph read as an arrow.
pub fn triangle_vertices(x: f64, y: f64, size: f64, rotation: f64) -> [[f64; 2]; 3] {
    [
        [
            x + rotation.cos() * size * 1.5,
            y + rotation.sin() * size * 1.5,
        ],
        [
            x + (rotation + 2.0 / 3.0 * PI).cos() * size,
            y + (rotation + 2.0 / 3.0 * PI).sin() * size,
        ],
        [
            x + (rotation + 4.0 / 3.0 * PI).cos() * size,
            y + (rotation + 4.0 / 3.0 * PI).sin() * size,
        ],
    ]
}

/// Draws the agent glyph at a logical position: optional solid fill, then
/// the stroked closed path nose -> left rear -> right rear -> nose.
/// Non-finite input degenerates to no output.
pub fn draw_triangle(
    surface: &mut impl DrawSurface,
    viewport: &Viewport,
    x: f64,
    y: f64,
    size: f64,
    rotation: f64,
    style: TriangleStyle,
) {
    let vertices = triangle_vertices(x, y, size, rotation)
        .map(|[vx, vy]| viewport.to_buffer(vx, vy))
        .map(|(vx, vy)| [vx, vy]);
    if vertices.iter().flatten().any(|v| !v.is_finite()) {
        return;
    }

    if let Some(fill) = style.fill {
        fill_buffer_triangle(surface, vertices, fill);
    }
    stroke_buffer_line(surface, vertices[0], vertices[1], style.stroke);
    stroke_buffer_line(surface, vertices[1], vertices[2], style.stroke);
    stroke_buffer_line(surface, vertices[2], vertices[0], style.stroke);
}

/// Draws the food glyph: a filled disc at a logical position. A zero,
/// negative, or non-finite radius leaves no mark.
pub fn fill_circle(
    surface: &mut impl DrawSurface,
    viewport: &Viewport,
    x: f64,
    y: f64,
    radius: f64,
    color: Rgba,
) {
    let (cx, cy) = viewport.to_buffer(x, y);
    let r = radius * viewport.scale();
    if !cx.is_finite() || !cy.is_finite() || !r.is_finite() || r <= 0.0 {
        return;
    }

    let min_x = (cx - r).floor() as i64;
    let max_x = (cx + r).ceil() as i64;
    let min_y = (cy - r).floor() as i64;
    let max_y = (cy + r).ceil() as i64;
    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f64 - cx;
            let dy = py as f64 - cy;
            if dx * dx + dy * dy <= r * r {
                plot(surface, px, py, color);
            }
        }
    }
}

/// Bresenham line in buffer coordinates, endpoints inclusive.
fn stroke_buffer_line(surface: &mut impl DrawSurface, from: [f64; 2], to: [f64; 2], color: Rgba) {
    let (mut x0, mut y0) = (from[0].round() as i64, from[1].round() as i64);
    let (x1, y1) = (to[0].round() as i64, to[1].round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;

    loop {
        plot(surface, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x0 += step_x;
        }
        if doubled <= dx {
            error += dx;
            y0 += step_y;
        }
    }
}

fn fill_buffer_triangle(surface: &mut impl DrawSurface, vertices: [[f64; 2]; 3], color: Rgba) {
    let [a, b, c] = vertices;
    let area = edge(a, b, c);
    if area == 0.0 {
        return;
    }

    let min_x = vertices.iter().map(|v| v[0]).fold(f64::INFINITY, f64::min);
    let max_x = vertices
        .iter()
        .map(|v| v[0])
        .fold(f64::NEG_INFINITY, f64::max);
    let min_y = vertices.iter().map(|v| v[1]).fold(f64::INFINITY, f64::min);
    let max_y = vertices
        .iter()
        .map(|v| v[1])
        .fold(f64::NEG_INFINITY, f64::max);

    for py in (min_y.floor() as i64)..=(max_y.ceil() as i64) {
        for px in (min_x.floor() as i64)..=(max_x.ceil() as i64) {
            let p = [px as f64, py as f64];
            let w0 = edge(a, b, p) / area;
            let w1 = edge(b, c, p) / area;
            let w2 = edge(c, a, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                plot(surface, px, py, color);
            }
        }
    }
}

fn edge(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

fn plot(surface: &mut impl DrawSurface, x: i64, y: i64, color: Rgba) {
    if x >= 0 && y >= 0 && x < surface.width() as i64 && y < surface.height() as i64 {
        surface.set_pixel(x as u32, y as u32, color);
    }
}
