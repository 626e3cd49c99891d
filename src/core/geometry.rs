use crate::core::color::Color;
use nalgebra::{Point2, Point3};

/// A triangle in a mesh's local space with one flat color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub color: Color,
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, color: Color) -> Self {
        Self {
            vertices: [a, b, c],
            color,
        }
    }
}

/// A shaded triangle after projection, ready for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle {
    /// Pixel coordinates; +Y points down.
    pub points: [Point2<f32>; 3],
    /// View-space depth of each vertex, all beyond the near plane.
    pub depths: [f32; 3],
    pub color: Color,
    /// Which edges `i -> (i + 1) % 3` wireframe mode strokes. Edges made up
    /// by near-plane clipping are switched off.
    pub edges: [bool; 3],
}

impl ScreenTriangle {
    pub fn new(points: [Point2<f32>; 3], depths: [f32; 3], color: Color) -> Self {
        Self {
            points,
            depths,
            color,
            edges: [true; 3],
        }
    }

    /// Mean view depth, the painter's sort key.
    #[inline]
    pub fn average_depth(&self) -> f32 {
        (self.depths[0] + self.depths[1] + self.depths[2]) / 3.0
    }
}
