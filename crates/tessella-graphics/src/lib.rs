//! Drawing data and canvas contracts for Tessella.
//!
//! This crate holds the pure value types (color, geometry, styles, paths)
//! and the traits the widget core draws through. No concrete rendering
//! backend lives here; hosts implement [`Canvas`] against whatever surface
//! they target.

mod canvas;
mod color;
mod geometry;
mod path;
mod shape;
mod style;

pub use canvas::{Canvas, DrawError, ImageSource, TextMetrics, TextOptions};
pub use color::Color;
pub use geometry::{Point, Rect, Size};
pub use path::{Path, PathCommand};
pub use shape::{RectangleShape, Shape};
pub use style::{FillRule, FillStyle, ShadowStyle, StrokeStyle, Style};
