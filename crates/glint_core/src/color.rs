use glam::Vec3;

/// Linear RGB color. Components are unbounded during accumulation and only
/// clamped when converting to a display format.
pub type Color = Vec3;

/// Pixel formats a [`FrameBuffer`](crate::FrameBuffer) can hold.
///
/// Render passes shade in linear [`Color`] and convert once per pixel, so a
/// target can store either the working format or a display format directly.
pub trait RenderPixel: Copy + Default + Send + Sync {
    fn from_color(color: Color) -> Self;
    fn to_color(self) -> Color;
}

impl RenderPixel for Color {
    fn from_color(color: Color) -> Self {
        color
    }

    fn to_color(self) -> Color {
        self
    }
}

/// 24-bit display pixel. Conversion truncates and clamps each channel to
/// `[0, 255]`, so out-of-range radiance saturates instead of wrapping.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RenderPixel for Rgb8 {
    fn from_color(color: Color) -> Self {
        Rgb8 {
            r: (color.x * 255.0).clamp(0.0, 255.0) as u8,
            g: (color.y * 255.0).clamp(0.0, 255.0) as u8,
            b: (color.z * 255.0).clamp(0.0, 255.0) as u8,
        }
    }

    fn to_color(self) -> Color {
        Color::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_clamps_out_of_range() {
        let px = Rgb8::from_color(Color::new(2.0, -1.0, 0.5));
        assert_eq!(px, Rgb8 { r: 255, g: 0, b: 127 });
    }

    #[test]
    fn test_rgb8_endpoints() {
        assert_eq!(Rgb8::from_color(Color::ZERO), Rgb8 { r: 0, g: 0, b: 0 });
        assert_eq!(
            Rgb8::from_color(Color::ONE),
            Rgb8 { r: 255, g: 255, b: 255 }
        );
    }

    #[test]
    fn test_color_passes_through() {
        let c = Color::new(0.25, 3.0, -0.5);
        assert_eq!(Color::from_color(c), c);
        assert_eq!(c.to_color(), c);
    }
}
