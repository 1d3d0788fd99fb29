/// Rendering and layout participation of a widget.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Visibility {
    /// Drawn and hit-testable.
    #[default]
    Visible,
    /// Not drawn, but still occupies its resolved size.
    Hidden,
    /// Not drawn and reports zero width and height.
    Gone,
}
