use crate::core::color::Color;
use crate::core::rasterizer::CullMode;
use crate::error::Result;
use crate::pipeline::renderer::DepthMode;
use crate::scene::showcase::{DEFAULT_CAMERA_DISTANCE, DEFAULT_CAMERA_HEIGHT, SceneMode};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "none"
    #[serde(default = "default_depth_mode")]
    pub depth_mode: String, // "zbuffer", "painter"
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fov: default_fov(),
            wireframe: false,
            cull_mode: default_cull_mode(),
            depth_mode: default_depth_mode(),
            background: default_background(),
        }
    }
}

impl RenderConfig {
    /// Unknown values fall back to back-face culling.
    pub fn cull_mode(&self) -> CullMode {
        match self.cull_mode.to_ascii_lowercase().as_str() {
            "back" => CullMode::Back,
            "none" => CullMode::None,
            other => {
                warn!("Unknown cull_mode '{}', using 'back'", other);
                CullMode::Back
            }
        }
    }

    /// Unknown values fall back to the z-buffer.
    pub fn depth_mode(&self) -> DepthMode {
        match self.depth_mode.to_ascii_lowercase().as_str() {
            "zbuffer" | "z_buffer" => DepthMode::ZBuffer,
            "painter" => DepthMode::Painter,
            other => {
                warn!("Unknown depth_mode '{}', using 'zbuffer'", other);
                DepthMode::ZBuffer
            }
        }
    }

    pub fn background(&self) -> Color {
        Color::from(self.background)
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    450
}
fn default_fov() -> f32 {
    60.0
}
fn default_cull_mode() -> String {
    "back".to_string()
}
fn default_depth_mode() -> String {
    "zbuffer".to_string()
}
fn default_background() -> [u8; 3] {
    [5, 5, 15]
}

#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub mode: SceneMode,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Mean height of the orbiting camera.
    #[serde(default = "default_camera_height")]
    pub camera_height: f32,
    /// Horizontal radius of the camera orbit.
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mode: SceneMode::default(),
            seed: default_seed(),
            camera_height: default_camera_height(),
            camera_distance: default_camera_distance(),
        }
    }
}

fn default_seed() -> u64 {
    42
}
fn default_camera_height() -> f32 {
    DEFAULT_CAMERA_HEIGHT
}
fn default_camera_distance() -> f32 {
    DEFAULT_CAMERA_DISTANCE
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Fixed ticks simulated before the frame is saved.
    #[serde(default = "default_frames")]
    pub frames: u64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            frames: default_frames(),
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("showcase.png")
}
fn default_frames() -> u64 {
    120
}
fn default_tick_rate() -> f32 {
    60.0
}
