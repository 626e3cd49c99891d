//! Double-buffered hand-off of finished frames from the render thread to
//! whoever displays them.

use crate::core::color::Color;
use crate::core::framebuffer::FrameBuffer;
use image::{ImageBuffer, RgbImage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// An immutable snapshot of one completed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    sequence: u64,
}

impl Frame {
    /// Copies the current contents of `framebuffer`.
    pub fn capture(framebuffer: &FrameBuffer, sequence: u64) -> Self {
        Self {
            width: framebuffer.width,
            height: framebuffer.height,
            pixels: framebuffer.pixels().to_vec(),
            sequence,
        }
    }

    /// Overwrites this frame in place, reusing its allocation.
    fn copy_from(&mut self, framebuffer: &FrameBuffer, sequence: u64) {
        self.width = framebuffer.width;
        self.height = framebuffer.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(framebuffer.pixels());
        self.sequence = sequence;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 1-based publish counter; 0 for frames captured outside a presenter.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let mut img_buf: RgbImage = ImageBuffer::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
            *pixel = self.pixels[y as usize * self.width + x as usize].into();
        }
        img_buf
    }

    /// Packed `0RGB` pixels for window blitters.
    pub fn to_u32_buffer(&self) -> Vec<u32> {
        self.pixels.iter().map(|c| c.to_u32()).collect()
    }
}

/// Publishes completed frames. The render thread writes into a private back
/// buffer and swaps it in whole, so readers only ever see finished frames.
#[derive(Debug, Default)]
pub struct Presenter {
    front: Mutex<Option<Arc<Frame>>>,
    /// The previous front frame, recycled once no reader holds it.
    back: Mutex<Option<Frame>>,
    published: AtomicU64,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `framebuffer` into the back buffer and makes it the front
    /// frame. Returns the new frame's sequence number.
    pub fn publish(&self, framebuffer: &FrameBuffer) -> u64 {
        let sequence = self.published.fetch_add(1, Ordering::AcqRel) + 1;

        let recycled = self.back.lock().unwrap_or_else(PoisonError::into_inner).take();
        let frame = match recycled {
            Some(mut frame) => {
                frame.copy_from(framebuffer, sequence);
                frame
            }
            None => Frame::capture(framebuffer, sequence),
        };

        let previous = self
            .front
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(frame));

        // Readers may still hold the old frame; only reuse it if they don't.
        if let Some(old) = previous
            && let Ok(old) = Arc::try_unwrap(old)
        {
            *self.back.lock().unwrap_or_else(PoisonError::into_inner) = Some(old);
        }
        sequence
    }

    /// The most recently completed frame, if any.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.front.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }
}
