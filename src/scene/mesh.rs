use crate::core::color::Color;
use crate::core::geometry::Triangle;
use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// Placement of a mesh in the world. Mutated freely by scene logic; the
/// renderer only reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles about X, Y and Z, in radians.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn model_matrix(&self) -> Matrix4<f32> {
        TransformFactory::model(&self.position, &self.rotation, &self.scale)
    }
}

/// A fixed list of local-space triangles plus a mutable transform.
///
/// The triangle count and local vertex positions never change after
/// construction; only colors (via [`Mesh::set_color`]) and the transform do.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            transform: Transform::default(),
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Recolors every triangle uniformly.
    pub fn set_color(&mut self, color: Color) {
        for tri in &mut self.triangles {
            tri.color = color;
        }
    }

    /// Builder form of [`Mesh::set_color`].
    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    /// Axis-aligned cube centered on the local origin, 12 triangles wound
    /// counter-clockwise when seen from outside.
    pub fn create_cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = |x: i8, y: i8, z: i8| {
            Point3::new(f32::from(x) * h, f32::from(y) * h, f32::from(z) * h)
        };

        // Each face as a quad (a, b, c, d), CCW from outside.
        let faces = [
            [p(-1, -1, -1), p(-1, 1, -1), p(1, 1, -1), p(1, -1, -1)], // -Z
            [p(1, -1, 1), p(1, 1, 1), p(-1, 1, 1), p(-1, -1, 1)], // +Z
            [p(-1, -1, 1), p(-1, 1, 1), p(-1, 1, -1), p(-1, -1, -1)], // -X
            [p(1, -1, -1), p(1, 1, -1), p(1, 1, 1), p(1, -1, 1)], // +X
            [p(-1, 1, -1), p(-1, 1, 1), p(1, 1, 1), p(1, 1, -1)], // +Y
            [p(-1, -1, 1), p(-1, -1, -1), p(1, -1, -1), p(1, -1, 1)], // -Y
        ];

        let mut triangles = Vec::with_capacity(12);
        for [a, b, c, d] in faces {
            triangles.push(Triangle::new(a, b, c, Color::WHITE));
            triangles.push(Triangle::new(a, c, d, Color::WHITE));
        }
        Self::new(triangles)
    }

    /// Square-based pyramid centered on the local origin: base at -size/2,
    /// apex at +size/2. Two base triangles and four sides.
    pub fn create_pyramid(size: f32) -> Self {
        let h = size / 2.0;
        let apex = Point3::new(0.0, h, 0.0);
        let b0 = Point3::new(-h, -h, -h);
        let b1 = Point3::new(h, -h, -h);
        let b2 = Point3::new(h, -h, h);
        let b3 = Point3::new(-h, -h, h);

        let triangles = vec![
            // Base, facing -Y
            Triangle::new(b0, b1, b2, Color::WHITE),
            Triangle::new(b0, b2, b3, Color::WHITE),
            // Sides
            Triangle::new(b0, apex, b1, Color::WHITE),
            Triangle::new(b1, apex, b2, Color::WHITE),
            Triangle::new(b2, apex, b3, Color::WHITE),
            Triangle::new(b3, apex, b0, Color::WHITE),
        ];
        Self::new(triangles)
    }
}
