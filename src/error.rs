use thiserror::Error;

/// Errors surfaced by the rendering pipeline and its I/O helpers.
///
/// Degenerate or off-screen geometry is never reported here; the pipeline
/// skips it silently.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid framebuffer dimensions {width}x{height}: both must be at least 1")]
    InvalidDimensions { width: usize, height: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("render thread panicked")]
    LoopPanicked,
}

pub type Result<T> = std::result::Result<T, RenderError>;
