use crate::error::Result;
use crate::pipeline::presenter::Frame;
use log::info;
use std::fs;
use std::path::Path;

/// Encodes `frame` to `path`; the format follows the file extension.
/// Missing parent directories are created.
pub fn save_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    frame.to_rgb_image().save(path)?;
    info!(
        "Saved {}x{} frame #{} to {}",
        frame.width(),
        frame.height(),
        frame.sequence(),
        path.display()
    );
    Ok(())
}
