use nalgebra::Vector3;

/// An 8-bit RGB color. Alpha is a display-layer concern and never enters the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats in the 0..=255 range.
    #[inline]
    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.r as f32, self.g as f32, self.b as f32)
    }

    /// Applies accumulated light (0..=255 per channel, may exceed 255) to this
    /// base color: `channel / 255 * light`, rounded and clamped.
    pub fn shade(self, light: &Vector3<f32>) -> Color {
        let channel = |base: u8, l: f32| -> u8 {
            let v = base as f32 / 255.0 * l;
            if v.is_nan() {
                0
            } else {
                v.round().clamp(0.0, 255.0) as u8
            }
        };
        Color::new(
            channel(self.r, light.x),
            channel(self.g, light.y),
            channel(self.b, light.z),
        )
    }

    /// Sum of the three channels; a cheap brightness measure.
    #[inline]
    pub fn luminance_sum(self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    /// Packed `0RGB`, the layout most window blitters expect.
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl From<[u8; 3]> for Color {
    fn from(c: [u8; 3]) -> Self {
        Color::new(c[0], c[1], c[2])
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}
