//! Flat (per-triangle) lighting.

use crate::core::color::Color;
use crate::core::math::transform::safe_normalize;
use crate::scene::light::Light;
use nalgebra::{Point3, Vector3};

/// Unit normal given by the winding: `(b - a) × (c - a)`.
#[inline]
pub fn winding_normal(world: &[Point3<f32>; 3]) -> Vector3<f32> {
    let [a, b, c] = world;
    safe_normalize(&(b - a).cross(&(c - a)))
}

/// Unit face normal of a world-space triangle, oriented away from
/// `interior` (the mesh's world-space origin).
///
/// The winding decides the sign when the triangle's plane passes through
/// `interior`.
pub fn outward_normal(world: &[Point3<f32>; 3], interior: &Point3<f32>) -> Vector3<f32> {
    let normal = winding_normal(world);
    if normal.dot(&(centroid(world) - interior)) < 0.0 {
        -normal
    } else {
        normal
    }
}

#[inline]
pub fn centroid(points: &[Point3<f32>; 3]) -> Point3<f32> {
    Point3::from((points[0].coords + points[1].coords + points[2].coords) / 3.0)
}

/// Total light reaching a surface, in 0..=255 units per channel.
///
/// Contributions are summed in a canonical order, so the result is
/// bit-identical however the light list is ordered.
pub fn accumulate_light(
    lights: &[Light],
    normal: &Vector3<f32>,
    surface_point: &Point3<f32>,
) -> Vector3<f32> {
    let mut contributions: Vec<Vector3<f32>> = lights
        .iter()
        .map(|light| light.contribution(normal, surface_point))
        .collect();
    contributions.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.z.total_cmp(&b.z))
    });
    contributions.iter().fold(Vector3::zeros(), |acc, c| acc + c)
}

/// Final flat color of a triangle: its base color modulated by the light.
pub fn shade(
    base: Color,
    lights: &[Light],
    normal: &Vector3<f32>,
    surface_point: &Point3<f32>,
) -> Color {
    base.shade(&accumulate_light(lights, normal, surface_point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_points_away_from_interior_regardless_of_winding() {
        let tri = [
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let flipped = [tri[0], tri[2], tri[1]];
        let interior = Point3::origin();
        assert!((outward_normal(&tri, &interior) - Vector3::y()).norm() < 1e-6);
        assert!((outward_normal(&flipped, &interior) - Vector3::y()).norm() < 1e-6);
    }

    #[test]
    fn winding_normal_follows_vertex_order() {
        let tri = [
            Point3::new(-1.0, 1.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(0.0, -1.0, 2.0),
        ];
        let flipped = [tri[0], tri[2], tri[1]];
        assert!((winding_normal(&tri) + Vector3::z()).norm() < 1e-6);
        assert!((winding_normal(&flipped) - Vector3::z()).norm() < 1e-6);
        // Seen from the mesh origin this face points away, but its winding
        // still faces -z.
        assert!((outward_normal(&tri, &Point3::origin()) - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn light_order_does_not_change_the_result() {
        let lights = vec![
            Light::new_ambient(Color::new(20, 20, 40), 0.15),
            Light::new_point(Point3::new(3.0, 1.0, -2.0), Color::new(255, 220, 150), 3.0),
            Light::new_directional(Vector3::new(1.0, -0.5, 1.0), Color::new(100, 150, 255)),
            Light::new_point(Point3::new(-4.0, 2.0, -1.0), Color::new(10, 200, 30), 0.7),
        ];
        let normal = safe_normalize(&Vector3::new(-0.3, 0.4, -0.8));
        let at = Point3::new(0.2, 0.1, -0.5);
        let expected = accumulate_light(&lights, &normal, &at);

        let mut reversed = lights.clone();
        reversed.reverse();
        assert_eq!(accumulate_light(&reversed, &normal, &at), expected);

        let rotated: Vec<_> = lights[2..].iter().chain(&lights[..2]).copied().collect();
        assert_eq!(accumulate_light(&rotated, &normal, &at), expected);
    }

    #[test]
    fn ambient_plus_facing_directional_saturates_white() {
        let lights = [
            Light::new_ambient(Color::WHITE, 0.2),
            Light::new_directional(Vector3::z(), Color::WHITE),
        ];
        let facing_camera = -Vector3::z();
        let color = shade(Color::WHITE, &lights, &facing_camera, &Point3::origin());
        assert_eq!(color, Color::WHITE);

        let away = shade(Color::WHITE, &lights, &Vector3::z(), &Point3::origin());
        assert_eq!(away, Color::new(51, 51, 51));
    }

    #[test]
    fn no_lights_means_black() {
        assert_eq!(shade(Color::WHITE, &[], &Vector3::y(), &Point3::origin()), Color::BLACK);
    }
}
