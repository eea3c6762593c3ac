use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An sRGB color with an alpha channel.
///
/// Unpremultiplied by convention.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color([u8; 4]);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(u8::MAX, u8::MAX, u8::MAX);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Creates a color from its RGBA components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Creates a color from RGB components with 100% alpha.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn green(&self) -> u8 {
        self.0[1]
    }

    pub fn blue(&self) -> u8 {
        self.0[2]
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }

    /// Gets the color as an array of values in RGBA order.
    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    /// Scales the color channels by alpha.
    pub fn premultiply(&self) -> PremultipliedColor {
        let [r, g, b, a] = self.0;
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        PremultipliedColor([scale(r), scale(g), scale(b), a])
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.red(), self.green(), self.blue(), self.alpha())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rgba = self.to_array();
        write!(f, "#{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2])?;
        if rgba[3] != u8::MAX {
            write!(f, "{:02x}", rgba[3])?;
        }
        Ok(())
    }
}

/// A color whose RGB channels are already scaled by alpha.
///
/// This is how the layout engine hands vertex colors to the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PremultipliedColor([u8; 4]);

impl PremultipliedColor {
    /// Creates a color from premultiplied RGBA components.
    ///
    /// Channels greater than `a` are clamped to `a`.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r.min(a), g.min(a), b.min(a), a])
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }

    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    /// Recovers the unpremultiplied color.
    pub fn demultiply(&self) -> Color {
        let [r, g, b, a] = self.0;
        if a == 0 {
            return Color::TRANSPARENT;
        }
        let a16 = u16::from(a);
        let unscale = |c: u8| ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8;
        Color::rgba(unscale(r), unscale(g), unscale(b), a)
    }

    /// Averages several colors channel by channel.
    pub(crate) fn average(colors: &[PremultipliedColor]) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        let mut sum = [0u32; 4];
        for color in colors {
            for (total, channel) in sum.iter_mut().zip(color.0) {
                *total += u32::from(channel);
            }
        }
        let n = colors.len() as u32;
        let avg = sum.map(|total| ((total + n / 2) / n) as u8);
        Self::rgba(avg[0], avg[1], avg[2], avg[3])
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, PremultipliedColor};

    #[test]
    fn hex_strings() {
        let color = Color::rgba(255, 254, 1, 255);
        assert_eq!(color.to_string(), "#fffe01");

        let color = Color::rgba(0, 0, 0, 128);
        assert_eq!(color.to_string(), "#00000080");
    }

    #[test]
    fn opaque_colors_survive_premultiplication() {
        for _ in 0..64 {
            let color = Color::rgb(fastrand::u8(..), fastrand::u8(..), fastrand::u8(..));
            assert_eq!(color.premultiply().to_array(), color.to_array());
            assert_eq!(color.premultiply().demultiply(), color);
        }
    }

    #[test]
    fn demultiply_half_alpha() {
        let color = PremultipliedColor::rgba(64, 0, 128, 128);
        assert_eq!(color.demultiply(), Color::rgba(128, 0, 255, 128));
        assert_eq!(
            PremultipliedColor::rgba(10, 10, 10, 0).demultiply(),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn average_rounds_each_channel() {
        let avg = PremultipliedColor::average(&[
            PremultipliedColor::rgba(255, 0, 0, 255),
            PremultipliedColor::rgba(0, 255, 0, 255),
        ]);
        assert_eq!(avg.to_array(), [128, 128, 0, 255]);
    }
}
