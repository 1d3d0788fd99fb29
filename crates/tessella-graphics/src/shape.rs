use tessella_core::EventHandlerList;

use crate::geometry::Rect;
use crate::path::Path;
use crate::style::FillRule;

/// A drawable vector shape.
///
/// Shapes are sized at draw/hit-test time: the same shape instance can back
/// widgets of different dimensions. Mutable shapes announce geometry changes
/// through their `on_change` list so the owning widget can invalidate.
pub trait Shape {
    /// Returns the shape's outline for the requested dimensions.
    fn path(&self, width: f64, height: f64) -> Path;

    /// Tests a point in shape-local coordinates against the shape filled at
    /// `width × height`, optionally widened by a stroke of `stroke_width`.
    fn hit_test(
        &self,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
        stroke_width: f64,
        fill_rule: FillRule,
    ) -> bool;

    /// Fired after any mutation that changes the produced geometry.
    fn on_change(&self) -> &EventHandlerList<()>;
}

/// Axis-aligned rectangle; the default shape of surface widgets.
pub struct RectangleShape {
    on_change: EventHandlerList<()>,
}

impl RectangleShape {
    pub fn new() -> Self {
        Self {
            on_change: EventHandlerList::new(),
        }
    }
}

impl Default for RectangleShape {
    fn default() -> Self {
        Self::new()
    }
}

impl Shape for RectangleShape {
    fn path(&self, width: f64, height: f64) -> Path {
        let mut path = Path::new();
        path.move_to(0.0, 0.0)
            .line_to(width, 0.0)
            .line_to(width, height)
            .line_to(0.0, height)
            .close();
        path
    }

    fn hit_test(
        &self,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
        stroke_width: f64,
        _fill_rule: FillRule,
    ) -> bool {
        let reach = stroke_width / 2.0;
        Rect::new(-reach, -reach, width + stroke_width, height + stroke_width)
            .contains_inclusive(x, y)
    }

    fn on_change(&self) -> &EventHandlerList<()> {
        &self.on_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCommand;

    #[test]
    fn rectangle_path_outlines_the_bounds() {
        let shape = RectangleShape::new();
        let path = shape.path(10.0, 4.0);
        assert_eq!(path.commands().len(), 5);
        assert!(matches!(path.commands()[4], PathCommand::Close));
    }

    #[test]
    fn rectangle_exposes_its_change_list() {
        use std::cell::Cell;
        use std::rc::Rc;

        let shape = RectangleShape::new();
        let fired = Rc::new(Cell::new(false));

        let flag = fired.clone();
        let dynamic: &dyn Shape = &shape;
        dynamic.on_change().add(&tessella_core::handler(move |_: &()| {
            flag.set(true);
            false
        }));

        shape.on_change.invoke(&());
        assert!(fired.get());
    }

    #[test]
    fn rectangle_hit_test_includes_stroke_reach() {
        let shape = RectangleShape::new();
        assert!(shape.hit_test(10.0, 10.0, 10.0, 10.0, 0.0, FillRule::NonZero));
        assert!(!shape.hit_test(10.0, 10.0, 10.5, 10.0, 0.0, FillRule::NonZero));
        assert!(shape.hit_test(10.0, 10.0, 10.5, 10.0, 2.0, FillRule::NonZero));
        assert!(shape.hit_test(10.0, 10.0, -0.5, 0.0, 2.0, FillRule::NonZero));
    }
}
