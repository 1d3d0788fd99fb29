use std::fmt;

use crate::geometry::{Rect, Size};
use crate::shape::Shape;
use crate::style::Style;

/// Error surfaced by a canvas backend while executing a draw operation.
///
/// The widget tree treats these as recoverable: a container logs the error
/// for the failing child and keeps drawing its siblings.
#[derive(Debug)]
pub enum DrawError {
    /// A geometry input could not be resolved to finite numbers.
    InvalidGeometry(String),
    /// The backend rejected or failed the operation.
    Backend(String),
}

impl DrawError {
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        DrawError::InvalidGeometry(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        DrawError::Backend(message.into())
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::InvalidGeometry(message) => write!(f, "invalid geometry: {message}"),
            DrawError::Backend(message) => write!(f, "draw failed: {message}"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Source of pixels for [`Canvas::draw_image`]. Concrete image types are a
/// backend concern; the core only needs intrinsic dimensions.
pub trait ImageSource {
    fn size(&self) -> Size;
}

/// Options applied when drawing or measuring text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_owned(),
            font_size: 16.0,
            line_height: 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
}

/// Drawing surface contract.
///
/// The application resizes the canvas to the viewport dimensions times the
/// scale factor before each redraw; backends interpret coordinates in
/// viewport units and apply the scale themselves.
pub trait Canvas {
    fn width(&self) -> f64;
    fn set_width(&mut self, width: f64);
    fn height(&self) -> f64;
    fn set_height(&mut self, height: f64);
    fn scale_factor(&self) -> f64;
    fn set_scale_factor(&mut self, scale_factor: f64);

    fn draw_rect(&mut self, rect: Rect, styles: &[Style]) -> Result<(), DrawError>;

    fn draw_shape(
        &mut self,
        shape: &dyn Shape,
        rect: Rect,
        styles: &[Style],
    ) -> Result<(), DrawError>;

    fn draw_image(
        &mut self,
        image: &dyn ImageSource,
        dest: Rect,
        src: Option<Rect>,
    ) -> Result<(), DrawError>;

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
        styles: &[Style],
    ) -> Result<(), DrawError>;

    fn draw_text_block(
        &mut self,
        text: &str,
        rect: Rect,
        options: &TextOptions,
        styles: &[Style],
    ) -> Result<(), DrawError>;

    fn measure_text(&mut self, text: &str, options: &TextOptions) -> TextMetrics;

    /// Clears the entire surface.
    fn clear(&mut self);
}
