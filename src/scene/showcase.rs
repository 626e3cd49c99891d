//! Canned animated scenes used by the demo binary.
//!
//! Each mode builds its meshes once and animates their transforms from the
//! accumulated scene time. The camera orbits the origin under a fixed
//! three-light rig.

use crate::core::color::Color;
use crate::pipeline::render_loop::Scene;
use crate::pipeline::renderer::Renderer;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use log::info;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::f32::consts::{PI, TAU};
use std::fmt;

pub const DEFAULT_BACKGROUND: Color = Color::new(5, 5, 15);

pub const DEFAULT_CAMERA_DISTANCE: f32 = 25.0;
pub const DEFAULT_CAMERA_HEIGHT: f32 = 15.0;
/// Radians per second the camera drifts around the origin.
const CAMERA_DRIFT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SceneMode {
    #[default]
    SolarSystem,
    ParticleVortex,
    GeometricWave,
    SpinningGalaxy,
    CubeMatrix,
}

impl fmt::Display for SceneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneMode::SolarSystem => "solar system",
            SceneMode::ParticleVortex => "particle vortex",
            SceneMode::GeometricWave => "geometric wave",
            SceneMode::SpinningGalaxy => "spinning galaxy",
            SceneMode::CubeMatrix => "cube matrix",
        };
        f.write_str(name)
    }
}

/// One animated mesh. `base` is where the animation is anchored; how the
/// other fields are used depends on the scene mode.
#[derive(Debug, Clone)]
struct Body {
    mesh: Mesh,
    base: Vector3<f32>,
    orbit_radius: f32,
    orbit_speed: f32,
    spin: f32,
    /// Vortex particles only.
    phase: f32,
}

impl Body {
    fn new(mesh: Mesh, base: Vector3<f32>, color: Color, spin: f32) -> Self {
        let mut mesh = mesh.with_color(color);
        mesh.transform.position = base;
        Self {
            mesh,
            base,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            spin,
            phase: 0.0,
        }
    }

    fn orbiting(mut self, radius: f32, speed: f32) -> Self {
        self.orbit_radius = radius;
        self.orbit_speed = speed;
        self
    }

    /// Orbit about `base` (if any) and tumble about Y and X.
    fn orbit(&mut self, t: f32) {
        let transform = &mut self.mesh.transform;
        transform.position = if self.orbit_radius > 0.0 {
            let angle = t * self.orbit_speed;
            self.base
                + Vector3::new(
                    angle.cos() * self.orbit_radius,
                    (angle * 0.5).sin() * 2.0,
                    angle.sin() * self.orbit_radius,
                )
        } else {
            self.base
        };
        transform.rotation.y = t * self.spin;
        transform.rotation.x = t * self.spin * 0.7;
    }
}

pub struct Showcase {
    mode: SceneMode,
    bodies: Vec<Body>,
    time: f32,
    camera_angle: f32,
    /// Horizontal radius of the camera orbit.
    camera_distance: f32,
    /// Mean camera height; the camera bobs around it.
    camera_height: f32,
    background: Color,
    rng: StdRng,
}

impl Showcase {
    /// Builds `mode`; `seed` drives every random placement so runs repeat.
    pub fn new(mode: SceneMode, seed: u64) -> Self {
        let mut showcase = Self {
            mode,
            bodies: Vec::new(),
            time: 0.0,
            camera_angle: 0.0,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            camera_height: DEFAULT_CAMERA_HEIGHT,
            background: DEFAULT_BACKGROUND,
            rng: StdRng::seed_from_u64(seed),
        };
        showcase.rebuild();
        showcase
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_camera_orbit(mut self, height: f32, distance: f32) -> Self {
        self.camera_height = height;
        self.camera_distance = distance;
        self
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    /// Switches to `mode` and restarts its clock. The camera keeps drifting
    /// from where it is.
    pub fn set_mode(&mut self, mode: SceneMode) {
        self.mode = mode;
        self.time = 0.0;
        self.rebuild();
    }

    /// Restarts the current mode's clock and poses its meshes at time zero.
    /// The layout, including random placements, is kept.
    pub fn reset_time(&mut self) {
        self.time = 0.0;
        self.animate();
    }

    /// Seconds since the current mode started.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.bodies.iter().map(|b| &b.mesh)
    }

    pub fn mesh_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes().map(Mesh::triangle_count).sum()
    }

    /// Replaces the renderer's lights with the showcase rig: a dim blue
    /// ambient term, a golden point light in the middle of the scene and a
    /// blue rim light.
    pub fn install_lighting(renderer: &mut Renderer) {
        renderer.clear_lights();
        renderer.add_light(Light::new_ambient(Color::new(20, 20, 40), 0.15));
        renderer.add_light(Light::new_point(Point3::origin(), Color::new(255, 220, 150), 3.0));
        renderer.add_light(Light::new_directional(
            Vector3::new(1.0, -0.5, 1.0),
            Color::new(100, 150, 255),
        ));
    }

    /// The orbiting camera for the current time.
    pub fn camera(&self) -> Camera {
        let height = self.camera_height + (self.time * 0.5).sin() * 2.0;
        let position = Point3::new(
            self.camera_angle.cos() * self.camera_distance,
            height,
            self.camera_angle.sin() * self.camera_distance,
        );
        Camera::new(position, Point3::origin())
    }

    fn rebuild(&mut self) {
        self.bodies = match self.mode {
            SceneMode::SolarSystem => solar_system(),
            SceneMode::ParticleVortex => particle_vortex(&mut self.rng),
            SceneMode::GeometricWave => geometric_wave(),
            SceneMode::SpinningGalaxy => spinning_galaxy(&mut self.rng),
            SceneMode::CubeMatrix => cube_matrix(),
        };
        info!(
            "Scene '{}': {} meshes, {} triangles",
            self.mode,
            self.mesh_count(),
            self.triangle_count()
        );
    }

    fn animate(&mut self) {
        let t = self.time;
        match self.mode {
            SceneMode::SolarSystem => self.bodies.iter_mut().for_each(|b| b.orbit(t)),
            SceneMode::ParticleVortex => {
                for body in &mut self.bodies {
                    let ph = body.phase;
                    let transform = &mut body.mesh.transform;
                    transform.position = body.base
                        + Vector3::new(
                            (t + ph).sin() * 5.0,
                            (t * 0.7 + ph).cos() * 5.0,
                            (t * 1.3 + ph).sin() * 5.0,
                        );
                    transform.rotation.y = t * 2.0;
                    transform.rotation.x = t * 1.5;
                }
            }
            SceneMode::GeometricWave => {
                for body in &mut self.bodies {
                    body.orbit(t);
                    let p = body.mesh.transform.position;
                    let dist = (p.x * p.x + p.z * p.z).sqrt();
                    body.mesh.transform.position.y = (t * 2.0 + dist * 0.3).sin() * 3.0;
                }
            }
            SceneMode::SpinningGalaxy => {
                let Some((core, stars)) = self.bodies.split_first_mut() else {
                    return;
                };
                core.mesh.transform.rotation.y = t * 0.3;
                core.mesh.transform.rotation.x = t * 0.2;
                for star in stars {
                    let base = star.base;
                    let radius = (base.x * base.x + base.z * base.z).sqrt();
                    let angle = base.z.atan2(base.x) + t * 0.2;
                    star.mesh.transform.position = Vector3::new(
                        angle.cos() * radius,
                        base.y + (t * 3.0 + radius * 0.5).sin() * 0.5,
                        angle.sin() * radius,
                    );
                    star.mesh.transform.rotation.y = t * star.spin;
                }
            }
            SceneMode::CubeMatrix => {
                for (i, body) in self.bodies.iter_mut().enumerate() {
                    let pulse = (t * 2.0 + i as f32 * 0.1).sin();
                    let transform = &mut body.mesh.transform;
                    transform.scale = Vector3::repeat(1.0 + pulse * 0.3);
                    transform.rotation.y = t * body.spin;
                    transform.rotation.x = t * body.spin * 0.7;
                }
            }
        }
    }
}

impl Scene for Showcase {
    fn update(&mut self, renderer: &mut Renderer, dt: f32) {
        self.time += dt;
        self.camera_angle += dt * CAMERA_DRIFT;
        self.animate();

        let fov = renderer.camera().fov_y_rad;
        renderer.set_camera(self.camera().with_fov(fov));
    }

    fn draw(&mut self, renderer: &mut Renderer) {
        for mesh in self.meshes() {
            renderer.render(mesh);
        }
    }

    fn background(&self) -> Color {
        self.background
    }
}

fn solar_system() -> Vec<Body> {
    let sun = Body::new(Mesh::create_cube(3.0), Vector3::zeros(), Color::new(255, 200, 50), 0.2);
    // (mesh, color, orbit radius, orbit speed, spin)
    let planets = [
        (Mesh::create_cube(1.2), Color::new(100, 100, 255), 6.0, 1.0, 0.5),
        (Mesh::create_pyramid(1.5), Color::new(255, 100, 100), 10.0, 0.7, 0.3),
        (Mesh::create_cube(0.8), Color::new(100, 255, 100), 14.0, 0.5, 0.8),
        (Mesh::create_pyramid(2.0), Color::new(255, 150, 255), 18.0, 0.4, 0.4),
        (Mesh::create_cube(1.0), Color::new(255, 255, 100), 22.0, 0.3, 0.6),
    ];

    std::iter::once(sun)
        .chain(planets.into_iter().map(|(mesh, color, radius, speed, spin)| {
            Body::new(mesh, Vector3::zeros(), color, spin).orbiting(radius, speed)
        }))
        .collect()
}

fn particle_vortex(rng: &mut StdRng) -> Vec<Body> {
    const COUNT: usize = 80;
    (0..COUNT)
        .map(|i| {
            let f = i as f32 / COUNT as f32;
            let angle = f * PI * 4.0;
            let radius = f * 15.0;
            let base = Vector3::new(angle.cos() * radius, f * 15.0 - 7.5, angle.sin() * radius);
            let color = Color::new(100 + (f * 155.0) as u8, 150, 255 - (f * 155.0) as u8);
            let mut body = Body::new(Mesh::create_cube(0.4), base, color, 0.0);
            body.phase = rng.random_range(0.0..TAU);
            body
        })
        .collect()
}

fn geometric_wave() -> Vec<Body> {
    let mut bodies = Vec::with_capacity(121);
    for x in -5_i32..=5 {
        for z in -5_i32..=5 {
            let color = Color::new(
                (x.unsigned_abs() * 20 + 50) as u8,
                (z.unsigned_abs() * 20 + 50) as u8,
                200,
            );
            let base = Vector3::new(x as f32 * 2.5, 0.0, z as f32 * 2.5);
            let spin = 0.5 + (x + z) as f32 * 0.05;
            bodies.push(Body::new(Mesh::create_cube(0.6), base, color, spin));
        }
    }
    bodies
}

fn spinning_galaxy(rng: &mut StdRng) -> Vec<Body> {
    const ARMS: usize = 3;
    const STARS_PER_ARM: usize = 15;

    let mut bodies = Vec::with_capacity(1 + ARMS * STARS_PER_ARM);
    bodies.push(Body::new(
        Mesh::create_cube(2.5),
        Vector3::zeros(),
        Color::new(255, 220, 100),
        0.3,
    ));

    for arm in 0..ARMS {
        let arm_angle = arm as f32 / ARMS as f32 * TAU;
        for i in 0..STARS_PER_ARM {
            let dist = 5.0 + i as f32 * 1.2;
            let angle = arm_angle + i as f32 * 0.3;
            let size = 0.5 + rng.random::<f32>() * 0.3;
            let base = Vector3::new(
                angle.cos() * dist,
                (rng.random::<f32>() - 0.5) * 2.0,
                angle.sin() * dist,
            );
            let color = Color::new(
                rng.random_range(200..255),
                rng.random_range(150..255),
                rng.random_range(100..155),
            );
            let spin = 0.5 + rng.random::<f32>();
            bodies.push(Body::new(Mesh::create_cube(size), base, color, spin));
        }
    }
    bodies
}

fn cube_matrix() -> Vec<Body> {
    let mut bodies = Vec::new();
    for x in -3_i32..=3 {
        for y in -3_i32..=3 {
            for z in -3_i32..=3 {
                // Checkerboard: keep cells with odd coordinate sum.
                if (x + y + z) % 2 == 0 {
                    continue;
                }
                let color = Color::new(
                    (x.unsigned_abs() * 30 + 50) as u8,
                    (y.unsigned_abs() * 30 + 50) as u8,
                    (z.unsigned_abs() * 30 + 50) as u8,
                );
                let base = Vector3::new(x as f32 * 3.0, y as f32 * 3.0, z as f32 * 3.0);
                let spin = 0.3 + (x + y + z) as f32 * 0.05;
                bodies.push(Body::new(Mesh::create_cube(0.5), base, color, spin));
            }
        }
    }
    bodies
}
