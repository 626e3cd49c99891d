use crate::core::color::Color;
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::ScreenTriangle;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::error::{RenderError, Result};
use crate::pipeline::shading::{centroid, outward_normal, shade, winding_normal};
use crate::scene::camera::{Camera, NEAR_PLANE, project};
use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use log::{debug, info};
use nalgebra::Point3;

/// Twice the view-space area below which a triangle counts as degenerate.
const DEGENERATE_AREA: f32 = 1e-9;

/// How occlusion between triangles is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthMode {
    /// Per-pixel depth test during rasterization.
    #[default]
    ZBuffer,
    /// Painter's algorithm: the frame's triangles are collected, sorted far to
    /// near by mean view depth and drawn when the buffer is requested.
    Painter,
}

/// Counters for the frame since the last `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: usize,
    pub submitted: usize,
    /// Degenerate, behind the camera, or back-facing.
    pub culled: usize,
    pub rasterized: usize,
}

/// The high-level renderer that orchestrates the pipeline stages:
/// world transform, view transform, rejection, lighting, near clipping,
/// projection and rasterization.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    framebuffer: FrameBuffer,
    camera: Camera,
    lights: Vec<Light>,
    depth_mode: DepthMode,
    /// Painter mode only: projected triangles awaiting the back-to-front pass.
    pending: Vec<ScreenTriangle>,
    stats: FrameStats,
}

impl Renderer {
    /// Creates a renderer with a `width` × `height` framebuffer.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height),
            camera: Camera::default(),
            lights: Vec::new(),
            depth_mode: DepthMode::default(),
            pending: Vec::new(),
            stats: FrameStats::default(),
        })
    }

    /// Reallocates the framebuffer. Zero dimensions are rejected and leave the
    /// renderer untouched. Contents are undefined until the next `clear`.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        validate_dimensions(width, height)?;
        if width != self.framebuffer.width || height != self.framebuffer.height {
            self.framebuffer = FrameBuffer::new(width, height);
            info!("Framebuffer resized to {}x{}", width, height);
        }
        self.pending.clear();
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn set_wireframe_mode(&mut self, wireframe: bool) {
        self.rasterizer.wireframe = wireframe;
    }

    pub fn wireframe_mode(&self) -> bool {
        self.rasterizer.wireframe
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.rasterizer.set_cull_mode(mode);
    }

    /// Switching mode discards any triangles still queued for the painter pass.
    pub fn set_depth_mode(&mut self, mode: DepthMode) {
        self.depth_mode = mode;
        self.pending.clear();
    }

    pub fn depth_mode(&self) -> DepthMode {
        self.depth_mode
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Starts a frame: every pixel becomes `background`, depth is reset and the
    /// painter queue is emptied.
    pub fn clear(&mut self, background: Color) {
        self.framebuffer.clear(background);
        self.pending.clear();
        self.stats = FrameStats::default();
    }

    /// Pushes every triangle of `mesh` through the pipeline.
    ///
    /// The mesh is only borrowed for the call; nothing of it is retained.
    pub fn render(&mut self, mesh: &Mesh) {
        let model = mesh.transform.model_matrix();
        let interior = Point3::from(mesh.transform.position);
        let basis = self.camera.basis();
        let focal = self.camera.focal_length(self.framebuffer.height);
        let (width, height) = (self.framebuffer.width, self.framebuffer.height);

        self.stats.meshes += 1;

        for tri in mesh.triangles() {
            self.stats.submitted += 1;

            // 1. World transform
            let world = tri.vertices.map(|v| model.transform_point(&v));

            // 2. View transform
            let view = world.map(|w| self.camera.to_view(&basis, &w));

            // 3. Degenerate / behind-camera / back-face rejection
            let doubled_area = (view[1] - view[0]).cross(&(view[2] - view[0])).norm();
            if doubled_area < DEGENERATE_AREA || view.iter().all(|v| v.z < NEAR_PLANE) {
                self.stats.culled += 1;
                continue;
            }

            // Culling follows the winding; the outward normal is for lighting.
            let center = centroid(&world);
            if self.rasterizer.cull_mode == CullMode::Back
                && winding_normal(&world).dot(&(self.camera.position - center)) <= 0.0
            {
                self.stats.culled += 1;
                continue;
            }
            let normal = outward_normal(&world, &interior);

            // 4. Lighting
            let color = shade(tri.color, &self.lights, &normal, &center);

            // 5. Near clipping, projection, rasterization
            let clipped = clip_near(&view);
            if clipped.count < 3 {
                self.stats.culled += 1;
                continue;
            }
            for i in 1..clipped.count - 1 {
                let corners = [0, i, i + 1];
                let piece = corners.map(|k| clipped.points[k]);
                let mut screen = ScreenTriangle::new(
                    piece.map(|v| project(&v, focal, width, height)),
                    piece.map(|v| v.z),
                    color,
                );
                screen.edges = clipped.outline_edges(corners);
                match self.depth_mode {
                    DepthMode::ZBuffer => {
                        self.rasterizer.draw(&mut self.framebuffer, &screen, true)
                    }
                    DepthMode::Painter => self.pending.push(screen),
                }
            }
            self.stats.rasterized += 1;
        }
    }

    /// The finished frame. In painter mode this first draws the queued
    /// triangles back to front.
    pub fn buffer(&mut self) -> &FrameBuffer {
        self.flush();
        &self.framebuffer
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.pending);
        // Stable: equal depths keep submission order.
        pending.sort_by(|a, b| b.average_depth().total_cmp(&a.average_depth()));
        for tri in &pending {
            self.rasterizer.draw(&mut self.framebuffer, tri, false);
        }
        debug!("Painter pass drew {} triangles", pending.len());
        pending.clear();
        self.pending = pending;
    }
}

pub(crate) fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Convex polygon left after near-plane clipping; only the first `count`
/// slots are meaningful.
#[derive(Debug, Clone, Copy)]
struct ClippedPolygon {
    points: [Point3<f32>; 4],
    /// Vertices created on the near plane by the clip.
    on_plane: [bool; 4],
    count: usize,
}

impl ClippedPolygon {
    /// Which edges of the fan piece over `corners` lie on the outline of the
    /// source triangle. Fan diagonals and the cut along the near plane don't.
    fn outline_edges(&self, corners: [usize; 3]) -> [bool; 3] {
        [0, 1, 2].map(|e| {
            let (a, b) = (corners[e], corners[(e + 1) % 3]);
            let boundary = b == (a + 1) % self.count || a == (b + 1) % self.count;
            boundary && !(self.on_plane[a] && self.on_plane[b])
        })
    }
}

/// Clips a view-space triangle against the near plane (Sutherland–Hodgman
/// with a single plane). The result has 0, 3 or 4 vertices.
fn clip_near(view: &[Point3<f32>; 3]) -> ClippedPolygon {
    let mut out = ClippedPolygon {
        points: [Point3::origin(); 4],
        on_plane: [false; 4],
        count: 0,
    };
    let mut push = |p: Point3<f32>, on_plane: bool| {
        out.points[out.count] = p;
        out.on_plane[out.count] = on_plane;
        out.count += 1;
    };
    let inside = |p: &Point3<f32>| p.z >= NEAR_PLANE;

    let mut prev = view[2];
    let mut prev_inside = inside(&prev);

    for &curr in view {
        let curr_inside = inside(&curr);
        if curr_inside {
            if !prev_inside {
                // OUT -> IN: Intersection point + Current point
                push(intersect_near(&prev, &curr), true);
            }
            push(curr, false);
        } else if prev_inside {
            // IN -> OUT: Intersection point only
            push(intersect_near(&prev, &curr), true);
        }
        prev = curr;
        prev_inside = curr_inside;
    }
    out
}

/// Point where segment `a → b` crosses the near plane. One endpoint must be
/// on each side, so the z difference is never zero.
#[inline]
fn intersect_near(a: &Point3<f32>, b: &Point3<f32>) -> Point3<f32> {
    let t = (NEAR_PLANE - a.z) / (b.z - a.z);
    a + (b - a) * t
}
