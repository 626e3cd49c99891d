use crate::core::math::transform::safe_normalize;
use nalgebra::{Point2, Point3, Vector3};

/// Anything closer to the camera than this along the view axis is clipped.
pub const NEAR_PLANE: f32 = 0.1;

/// Orthonormal camera axes derived from position and target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub forward: Vector3<f32>,
}

/// A look-at camera. Only position and target are stored; the basis is
/// rebuilt from them every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Vertical field of view in radians.
    pub fov_y_rad: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, -10.0), Point3::origin())
    }
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            fov_y_rad: 60.0_f32.to_radians(),
        }
    }

    pub fn with_fov(mut self, fov_y_rad: f32) -> Self {
        self.fov_y_rad = fov_y_rad;
        self
    }

    /// forward = normalize(target − position), right = normalize(forward × up),
    /// up = right × forward, with fallbacks so no axis is ever zero-length.
    pub fn basis(&self) -> CameraBasis {
        let mut forward = safe_normalize(&(self.target - self.position));
        if forward == Vector3::zeros() {
            forward = Vector3::z();
        }

        // World up is +Y; looking straight along it, +Z stands in.
        let mut right = safe_normalize(&forward.cross(&Vector3::y()));
        if right == Vector3::zeros() {
            right = safe_normalize(&forward.cross(&Vector3::z()));
        }
        let up = right.cross(&forward);

        CameraBasis { right, up, forward }
    }

    /// World point → view space (x right, y up, z along the view direction).
    #[inline]
    pub fn to_view(&self, basis: &CameraBasis, world: &Point3<f32>) -> Point3<f32> {
        let d = world - self.position;
        Point3::new(d.dot(&basis.right), d.dot(&basis.up), d.dot(&basis.forward))
    }

    /// Focal scale in pixels for a viewport of the given height.
    pub fn focal_length(&self, viewport_height: usize) -> f32 {
        let half_fov = (self.fov_y_rad * 0.5).clamp(1e-3, std::f32::consts::FRAC_PI_2 - 1e-3);
        (viewport_height as f32 * 0.5) / half_fov.tan()
    }
}

/// Perspective divide and viewport mapping for a view-space point with
/// `z > 0`. Screen +Y points down.
#[inline]
pub fn project(view: &Point3<f32>, focal: f32, width: usize, height: usize) -> Point2<f32> {
    Point2::new(
        width as f32 * 0.5 + view.x * focal / view.z,
        height as f32 * 0.5 - view.y * focal / view.z,
    )
}
