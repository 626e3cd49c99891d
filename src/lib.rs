//! A pure-software 3D rendering pipeline.
//!
//! Meshes, a camera and a set of lights go in; a flat-shaded RGB frame comes
//! out. Everything runs on the CPU: world/view transforms, per-triangle
//! lighting, perspective projection and rasterization.

pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod scene;

pub use error::{RenderError, Result};
