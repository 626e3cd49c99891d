use nalgebra::{Point3, Vector3};
use softrender::core::color::Color;
use softrender::core::framebuffer::FrameBuffer;
use softrender::core::geometry::{ScreenTriangle, Triangle};
use softrender::core::rasterizer::{CullMode, Rasterizer};
use softrender::pipeline::renderer::{DepthMode, Renderer};
use softrender::scene::camera::{Camera, project};
use softrender::scene::light::Light;
use softrender::scene::mesh::Mesh;
use softrender::RenderError;

const BG: Color = Color::new(5, 5, 15);

fn renderer(width: usize, height: usize) -> Renderer {
    let mut renderer = Renderer::new(width, height).unwrap();
    renderer.set_camera(Camera::new(Point3::new(0.0, 0.0, -10.0), Point3::origin()));
    renderer
}

/// Square facing the default camera, placed at depth `z`, as two triangles.
fn quad(z: f32, half: f32, color: Color) -> Mesh {
    let a = Point3::new(-half, -half, 0.0);
    let b = Point3::new(-half, half, 0.0);
    let c = Point3::new(half, half, 0.0);
    let d = Point3::new(half, -half, 0.0);
    let mut mesh = Mesh::new(vec![Triangle::new(a, b, c, color), Triangle::new(a, c, d, color)]);
    mesh.transform.position.z = z;
    mesh
}

fn full_ambient(renderer: &mut Renderer) {
    renderer.add_light(Light::new_ambient(Color::WHITE, 1.0));
}

#[test]
fn identity_transform_reproduces_local_silhouette() {
    let tri = Triangle::new(
        Point3::new(-2.0, -1.5, 0.5),
        Point3::new(0.5, 2.0, -0.5),
        Point3::new(2.5, -1.0, 0.0),
        Color::new(180, 90, 30),
    );
    let mesh = Mesh::new(vec![tri]);
    assert_eq!(mesh.transform, Default::default());

    let mut renderer = renderer(64, 48);
    renderer.set_cull_mode(CullMode::None);
    full_ambient(&mut renderer);
    renderer.clear(BG);
    renderer.render(&mesh);
    let rendered = renderer.buffer().clone();

    // Same triangle straight from local space, bypassing the transform.
    let camera = *renderer.camera();
    let basis = camera.basis();
    let focal = camera.focal_length(48);
    let view = tri.vertices.map(|v| camera.to_view(&basis, &v));
    let expected_tri = ScreenTriangle::new(
        view.map(|v| project(&v, focal, 64, 48)),
        view.map(|v| v.z),
        tri.color,
    );
    let mut expected = FrameBuffer::new(64, 48);
    expected.clear(BG);
    Rasterizer::new().draw(&mut expected, &expected_tri, true);

    assert!(rendered.count_differing(BG) > 0);
    assert_eq!(rendered.pixels(), expected.pixels());
}

#[test]
fn translation_moves_the_silhouette_like_moving_the_vertices() {
    let color = Color::new(40, 200, 90);
    let mut moved = quad(0.0, 1.0, color);
    moved.transform.position = Vector3::new(1.5, -0.5, 2.0);

    let offset = Vector3::new(1.5, -0.5, 2.0);
    let baked = Mesh::new(
        quad(0.0, 1.0, color)
            .triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = t.vertices;
                Triangle::new(a + offset, b + offset, c + offset, t.color)
            })
            .collect(),
    );

    let mut r = renderer(64, 64);
    full_ambient(&mut r);
    r.set_cull_mode(CullMode::None);

    r.clear(BG);
    r.render(&moved);
    let a = r.buffer().clone();
    r.clear(BG);
    r.render(&baked);
    let b = r.buffer().clone();

    assert!(a.count_differing(BG) > 0);
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn lighting_is_independent_of_light_order() {
    let lights = [
        Light::new_ambient(Color::new(20, 20, 40), 0.15),
        Light::new_point(Point3::new(0.0, 4.0, -6.0), Color::new(255, 220, 150), 3.0),
        Light::new_directional(Vector3::new(1.0, -0.5, 1.0), Color::new(100, 150, 255)),
        Light::new_point(Point3::new(-5.0, -2.0, -3.0), Color::new(30, 250, 60), 0.4),
    ];
    let mut cube = Mesh::create_cube(3.0).with_color(Color::new(200, 180, 160));
    cube.transform.rotation = Vector3::new(0.4, 0.7, 0.1);

    let render_with = |order: &[usize]| {
        let mut r = renderer(80, 60);
        for &i in order {
            r.add_light(lights[i]);
        }
        r.clear(BG);
        r.render(&cube);
        r.buffer().clone()
    };

    let reference = render_with(&[0, 1, 2, 3]);
    for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
        assert_eq!(render_with(&order).pixels(), reference.pixels());
    }
}

#[test]
fn geometry_outside_the_frustum_draws_nothing() {
    let mut r = renderer(40, 30);
    full_ambient(&mut r);
    r.set_cull_mode(CullMode::None);
    r.clear(BG);

    // Entirely behind the camera.
    r.render(&quad(-20.0, 1.0, Color::WHITE));
    // Far off to the side.
    let mut aside = quad(0.0, 1.0, Color::WHITE);
    aside.transform.position = Vector3::new(500.0, 0.0, 0.0);
    r.render(&aside);
    // Above the view.
    let mut above = Mesh::create_cube(1.0);
    above.transform.position = Vector3::new(0.0, 300.0, 5.0);
    r.render(&above);

    assert_eq!(r.buffer().count_differing(BG), 0);
}

#[test]
fn degenerate_triangles_are_skipped_silently() {
    let p = Point3::new(0.0, 0.0, 0.0);
    let q = Point3::new(1.0, 1.0, 0.0);
    let mesh = Mesh::new(vec![
        Triangle::new(p, p, p, Color::WHITE),
        Triangle::new(p, q, Point3::new(2.0, 2.0, 0.0), Color::WHITE),
    ]);
    let mut r = renderer(32, 32);
    full_ambient(&mut r);
    r.clear(BG);
    r.render(&mesh);
    assert_eq!(r.buffer().count_differing(BG), 0);
    assert_eq!(r.stats().culled, 2);
}

#[test]
fn clear_without_render_is_uniform() {
    for mode in [DepthMode::ZBuffer, DepthMode::Painter] {
        let mut r = renderer(17, 9);
        r.set_depth_mode(mode);
        let color = Color::new(12, 34, 56);
        r.clear(color);
        let fb = r.buffer();
        assert_eq!(fb.pixels().len(), 17 * 9);
        assert!(fb.pixels().iter().all(|&c| c == color));
    }
}

#[test]
fn wireframe_touches_fewer_pixels_than_fill() {
    let tri = Mesh::new(vec![Triangle::new(
        Point3::new(-3.0, -2.0, 0.0),
        Point3::new(0.0, 3.0, 0.0),
        Point3::new(3.0, -2.0, 0.0),
        Color::WHITE,
    )]);
    let mut r = renderer(64, 64);
    full_ambient(&mut r);
    r.set_cull_mode(CullMode::None);

    r.clear(BG);
    r.render(&tri);
    let solid = r.buffer().count_differing(BG);

    r.set_wireframe_mode(true);
    r.clear(BG);
    r.render(&tri);
    let wire = r.buffer().count_differing(BG);

    assert!(wire > 0);
    assert!(wire < solid, "wireframe {} vs solid {}", wire, solid);
}

#[test]
fn nearer_surface_wins_in_any_submission_order() {
    let near = quad(-2.0, 1.0, Color::new(255, 0, 0));
    let far = quad(2.0, 3.0, Color::new(0, 0, 255));

    for mode in [DepthMode::ZBuffer, DepthMode::Painter] {
        for near_first in [true, false] {
            let mut r = renderer(48, 48);
            full_ambient(&mut r);
            r.set_depth_mode(mode);
            r.clear(BG);
            if near_first {
                r.render(&near);
                r.render(&far);
            } else {
                r.render(&far);
                r.render(&near);
            }
            let fb = r.buffer();
            assert_eq!(
                fb.get_pixel(24, 24),
                Some(Color::new(255, 0, 0)),
                "{:?}, near first: {}",
                mode,
                near_first
            );
            assert_eq!(fb.get_pixel(15, 24), Some(Color::new(0, 0, 255)));
        }
    }
}

#[test]
fn camera_facing_triangles_off_the_mesh_origin_survive_default_culling() {
    // Wound toward the camera at -z; the mesh origin sits behind the far one.
    let facing = |z: f32, color: Color| {
        Triangle::new(
            Point3::new(-1.5, -1.0, z),
            Point3::new(0.0, 1.5, z),
            Point3::new(1.5, -1.0, z),
            color,
        )
    };
    let red = Color::new(255, 0, 0);
    let blue = Color::new(0, 0, 255);

    let mut r = renderer(48, 48);
    full_ambient(&mut r);
    r.clear(BG);
    r.render(&Mesh::new(vec![facing(2.0, red)]));
    assert_eq!(r.stats().rasterized, 1);
    let alone = r.buffer().count_differing(BG);
    assert!(alone > 0);
    assert_eq!(r.buffer().get_pixel(24, 24), Some(red));

    // Two layers on either side of the origin: both face the camera.
    r.clear(BG);
    r.render(&Mesh::new(vec![facing(-2.0, blue), facing(2.0, red)]));
    assert_eq!(r.stats().rasterized, 2);
    assert_eq!(r.stats().culled, 0);
    assert_eq!(r.buffer().get_pixel(24, 24), Some(blue));
}

#[test]
fn lit_cube_is_brighter_than_background() {
    let mut r = Renderer::new(200, 150).unwrap();
    r.set_camera(Camera::new(Point3::new(0.0, 0.0, -10.0), Point3::origin()));
    r.add_light(Light::new_ambient(Color::WHITE, 0.2));
    r.add_light(Light::new_directional(Vector3::new(0.0, 0.0, 1.0), Color::WHITE));

    let background = Color::new(10, 10, 10);
    r.clear(background);
    r.render(&Mesh::create_cube(2.0));

    let fb = r.buffer();
    let center = fb.get_pixel(100, 75).unwrap();
    let edge = fb.get_pixel(0, 0).unwrap();
    assert_eq!(edge, background);
    assert_ne!(center, Color::BLACK);
    assert!(center.luminance_sum() > edge.luminance_sum());
}

#[test]
fn invalid_resize_is_rejected_without_side_effects() {
    let mut r = renderer(20, 10);
    r.clear(BG);
    for (w, h) in [(0, 10), (10, 0), (0, 0)] {
        assert!(matches!(
            r.resize(w, h),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }
    assert_eq!((r.width(), r.height()), (20, 10));
    assert!(r.buffer().pixels().iter().all(|&c| c == BG));

    r.resize(30, 12).unwrap();
    r.clear(BG);
    assert_eq!(r.buffer().pixels().len(), 360);
}

#[test]
fn camera_looking_straight_down_still_renders() {
    let mut r = Renderer::new(40, 40).unwrap();
    r.set_camera(Camera::new(Point3::new(0.0, 10.0, 0.0), Point3::origin()));
    full_ambient(&mut r);
    r.clear(BG);
    r.render(&Mesh::create_cube(4.0));
    assert!(r.buffer().count_differing(BG) > 0);
}
