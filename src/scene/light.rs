use crate::core::color::Color;
use crate::core::math::transform::safe_normalize;
use nalgebra::{Point3, Vector3};

/// Represents a light source in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light that reaches every surface regardless of orientation.
    Ambient { color: Color, intensity: f32 },
    /// A light at a position radiating in all directions. No distance falloff.
    Point {
        position: Point3<f32>,
        color: Color,
        intensity: f32,
    },
    /// A light infinitely far away; rays are parallel and travel along
    /// `direction`. Its strength is the color itself.
    Directional { direction: Vector3<f32>, color: Color },
}

impl Light {
    /// Creates an ambient term. `intensity` is expected in `[0, 1]`.
    pub fn new_ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    pub fn new_point(position: Point3<f32>, color: Color, intensity: f32) -> Self {
        Self::Point {
            position,
            color,
            intensity,
        }
    }

    /// Creates a directional light; `direction` is the way the light travels.
    pub fn new_directional(direction: Vector3<f32>, color: Color) -> Self {
        Self::Directional {
            direction: safe_normalize(&direction),
            color,
        }
    }

    /// Unit vector FROM the surface point TO the light, or `None` for ambient
    /// light, which has no direction.
    pub fn direction_to_light(&self, surface_point: &Point3<f32>) -> Option<Vector3<f32>> {
        match self {
            Light::Ambient { .. } => None,
            Light::Point { position, .. } => Some(safe_normalize(&(position - surface_point))),
            Light::Directional { direction, .. } => Some(-safe_normalize(direction)),
        }
    }

    /// Color scaled by intensity, in 0..=255 units per channel.
    pub fn radiance(&self) -> Vector3<f32> {
        match self {
            Light::Ambient { color, intensity } | Light::Point { color, intensity, .. } => {
                color.to_vector() * *intensity
            }
            Light::Directional { color, .. } => color.to_vector(),
        }
    }

    /// Light arriving at a surface with unit `normal` at `surface_point`:
    /// the radiance, weighted by `max(0, n · l)` for directional kinds.
    pub fn contribution(&self, normal: &Vector3<f32>, surface_point: &Point3<f32>) -> Vector3<f32> {
        match self.direction_to_light(surface_point) {
            None => self.radiance(),
            Some(to_light) => self.radiance() * normal.dot(&to_light).max(0.0),
        }
    }
}
