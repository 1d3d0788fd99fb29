/// Plain sRGB color with straight alpha, components in `[0, 1]`.
///
/// Color-space conversion math lives outside the toolkit core; this type is
/// only a value carrier for styles and themes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            1.0,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn from_rgb8_is_opaque() {
        let c = Color::from_rgb8(255, 0, 127);
        assert_eq!(c.a, 1.0);
        assert_eq!(c.r, 1.0);
        assert!((c.b - 127.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::BLACK.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::BLACK.with_alpha(-1.0).a, 0.0);
        assert!(Color::BLACK.with_alpha(0.0).is_transparent());
    }
}
