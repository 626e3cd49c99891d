use crate::core::color::Color;
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::ScreenTriangle;
use crate::core::math::interpolation::{
    barycentric_coordinates, interpolate_depth, is_inside_triangle,
};
use nalgebra::Point2;
use rayon::prelude::*;

/// The Rasterizer is responsible for drawing projected triangles onto the FrameBuffer.
pub struct Rasterizer {
    pub cull_mode: CullMode,
    pub wireframe: bool,
}

/// Which triangles the renderer discards before rasterization.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    /// Skip triangles whose outward normal faces away from the camera.
    #[default]
    Back,
    None,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
            wireframe: false,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Draws a triangle either filled or as its three edges, depending on
    /// wireframe mode. Anything outside the framebuffer is clipped silently.
    pub fn draw(&self, framebuffer: &mut FrameBuffer, tri: &ScreenTriangle, depth_test: bool) {
        if self.wireframe {
            self.stroke_triangle(framebuffer, tri, depth_test);
        } else {
            self.fill_triangle(framebuffer, tri, depth_test);
        }
    }

    /// Fills every pixel whose center lies inside the triangle.
    pub fn fill_triangle(
        &self,
        framebuffer: &mut FrameBuffer,
        tri: &ScreenTriangle,
        depth_test: bool,
    ) {
        let width = framebuffer.width;
        let height = framebuffer.height;
        let [v0, v1, v2] = tri.points;

        let (min_x, min_y, max_x, max_y) = compute_bounding_box(&tri.points);

        // Scissor Test
        if max_x < 0 || max_y < 0 || min_x >= width as i64 || min_y >= height as i64 {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(width as i64 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(height as i64 - 1) as usize;

        let color = tri.color;
        let depths = tri.depths;
        let (color_rows, depth_rows) = framebuffer.rows_mut(start_y, end_y);

        // Each worker owns whole rows, so writes never race.
        color_rows
            .par_chunks_mut(width)
            .zip(depth_rows.par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, (color_row, depth_row))| {
                let y = start_y + row;
                for x in start_x..=end_x {
                    let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let Some(bary) = barycentric_coordinates(pixel_center, v0, v1, v2) else {
                        return;
                    };
                    if !is_inside_triangle(bary) {
                        continue;
                    }
                    if depth_test {
                        let depth = interpolate_depth(bary, &depths);
                        if depth >= depth_row[x] {
                            continue;
                        }
                        depth_row[x] = depth;
                    }
                    color_row[x] = color;
                }
            });
    }

    /// Strokes the three edges of the triangle.
    pub fn stroke_triangle(
        &self,
        framebuffer: &mut FrameBuffer,
        tri: &ScreenTriangle,
        depth_test: bool,
    ) {
        for i in (0..3).filter(|&i| tri.edges[i]) {
            let j = (i + 1) % 3;
            draw_line(
                framebuffer,
                (tri.points[i], tri.depths[i]),
                (tri.points[j], tri.depths[j]),
                tri.color,
                depth_test,
            );
        }
    }
}

/// Bresenham line between two projected points. Depth is interpolated through
/// its reciprocal so it matches the filled triangle along the same edge.
pub fn draw_line(
    framebuffer: &mut FrameBuffer,
    from: (Point2<f32>, f32),
    to: (Point2<f32>, f32),
    color: Color,
    depth_test: bool,
) {
    let (p0, d0) = from;
    let (p1, d1) = to;
    let Some((t0, t1)) = clip_segment(p0, p1, framebuffer.width, framebuffer.height) else {
        return;
    };

    let a = p0 + (p1 - p0) * t0;
    let b = p0 + (p1 - p0) * t1;
    let inv_d0 = 1.0 / d0;
    let inv_d1 = 1.0 / d1;
    let inv_a = inv_d0 + (inv_d1 - inv_d0) * t0;
    let inv_b = inv_d0 + (inv_d1 - inv_d0) * t1;

    let (mut x, mut y) = (a.x.floor() as i64, a.y.floor() as i64);
    let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let steps = dx.max(-dy).max(1) as f32;
    let mut step = 0;

    loop {
        let t = step as f32 / steps;
        let inv = inv_a + (inv_b - inv_a) * t;
        let depth = if inv > 0.0 { 1.0 / inv } else { f32::INFINITY };
        framebuffer.plot(x, y, depth, color, depth_test);

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

/// Liang–Barsky clip of segment `p0 → p1` against the pixel rectangle.
/// Returns the surviving parameter range, or `None` if nothing is visible.
fn clip_segment(
    p0: Point2<f32>,
    p1: Point2<f32>,
    width: usize,
    height: usize,
) -> Option<(f32, f32)> {
    let d = p1 - p0;
    let max_x = width as f32 - 1e-3;
    let max_y = height as f32 - 1e-3;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-d.x, p0.x),
        (d.x, max_x - p0.x),
        (-d.y, p0.y),
        (d.y, max_y - p0.y),
    ] {
        if p.abs() < 1e-12 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i64, i64, i64, i64) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i64;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i64;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i64;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i64;
    (min_x, min_y, max_x, max_y)
}
