use crate::color::Color;
use crate::geometry::Point;

/// Algorithm deciding whether a point is inside a filled path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillStyle {
    pub color: Color,
    pub fill_rule: FillRule,
}

impl FillStyle {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            fill_rule: FillRule::NonZero,
        }
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }
}

impl From<Color> for FillStyle {
    fn from(color: Color) -> Self {
        Self::new(color)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub thickness: f64,
}

impl StrokeStyle {
    pub fn new(color: Color, thickness: f64) -> Self {
        Self { color, thickness }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowStyle {
    pub color: Color,
    pub blur: f64,
    pub offset: Point,
}

impl ShadowStyle {
    pub fn new(color: Color, blur: f64, offset: Point) -> Self {
        Self {
            color,
            blur,
            offset,
        }
    }
}

/// One pass of a draw call. Draw operations take a slice of styles and apply
/// them in order, matching the original paint model where a rectangle is
/// drawn once per style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Style {
    Fill(FillStyle),
    Stroke(StrokeStyle),
    Shadow(ShadowStyle),
}
