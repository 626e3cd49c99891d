use crate::core::color::Color;

/// A width × height grid of colors plus a matching grid of view depths used
/// only for occlusion.
///
/// Rows are stored contiguously so a rasterizer can hand disjoint rows to
/// parallel workers without locks.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub(crate) color_buffer: Vec<Color>,
    pub(crate) depth_buffer: Vec<f32>,
}

impl FrameBuffer {
    /// Allocates a buffer. Contents are meaningless until the first `clear`.
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color_buffer: vec![Color::BLACK; size],
            depth_buffer: vec![f32::INFINITY; size],
        }
    }

    /// Resets every pixel to `color` and every depth to infinity.
    pub fn clear(&mut self, color: Color) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(f32::INFINITY);
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color_buffer[self.index(x, y)])
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.depth_buffer[self.index(x, y)])
    }

    /// Writes one pixel, clipping silently at the edges.
    ///
    /// With `depth_test` the write only happens when `depth` is nearer than
    /// what is stored. Returns whether the pixel was written.
    #[inline]
    pub fn plot(&mut self, x: i64, y: i64, depth: f32, color: Color, depth_test: bool) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x as usize, y as usize);
        if depth_test {
            if depth >= self.depth_buffer[idx] {
                return false;
            }
            self.depth_buffer[idx] = depth;
        }
        self.color_buffer[idx] = color;
        true
    }

    /// Row-major color data.
    pub fn pixels(&self) -> &[Color] {
        &self.color_buffer
    }

    /// Mutable color and depth rows `start_y..=end_y`, for row-parallel writers.
    pub(crate) fn rows_mut(
        &mut self,
        start_y: usize,
        end_y: usize,
    ) -> (&mut [Color], &mut [f32]) {
        let start = start_y * self.width;
        let end = (end_y + 1) * self.width;
        (
            &mut self.color_buffer[start..end],
            &mut self.depth_buffer[start..end],
        )
    }

    /// Number of pixels whose color differs from `background`.
    pub fn count_differing(&self, background: Color) -> usize {
        self.color_buffer.iter().filter(|&&c| c != background).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_color_and_resets_depth() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.plot(1, 1, 2.0, Color::WHITE, true);
        fb.clear(Color::new(5, 5, 15));
        assert!(fb.pixels().iter().all(|&c| c == Color::new(5, 5, 15)));
        assert_eq!(fb.get_depth(1, 1), Some(f32::INFINITY));
    }

    #[test]
    fn plot_depth_tests_and_clips() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.clear(Color::BLACK);
        assert!(fb.plot(2, 2, 5.0, Color::WHITE, true));
        assert!(!fb.plot(2, 2, 6.0, Color::new(1, 2, 3), true));
        assert!(fb.plot(2, 2, 4.0, Color::new(1, 2, 3), true));
        assert_eq!(fb.get_pixel(2, 2), Some(Color::new(1, 2, 3)));

        assert!(!fb.plot(-1, 0, 1.0, Color::WHITE, false));
        assert!(!fb.plot(0, 4, 1.0, Color::WHITE, false));
        assert_eq!(fb.get_pixel(4, 0), None);
    }
}
