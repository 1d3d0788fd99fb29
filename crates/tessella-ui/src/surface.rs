use std::cell::RefCell;
use std::rc::Rc;

use tessella_graphics::{
    Canvas, DrawError, FillStyle, RectangleShape, Shape, ShadowStyle, StrokeStyle, Style,
};

use crate::widget::{Widget, WidgetBehavior};

struct SurfaceState {
    background: RefCell<FillStyle>,
    stroke: RefCell<Option<StrokeStyle>>,
    shadow: RefCell<Option<ShadowStyle>>,
    shape: RefCell<Rc<dyn Shape>>,
}

struct SurfaceBehavior {
    state: Rc<SurfaceState>,
}

impl WidgetBehavior for SurfaceBehavior {
    fn draw(&self, widget: &Widget, canvas: &mut dyn Canvas) -> Result<(), DrawError> {
        let frame = widget
            .frame()
            .map_err(|err| DrawError::invalid_geometry(err.to_string()))?;
        let shape = Rc::clone(&self.state.shape.borrow());

        let mut styles = vec![Style::Fill(*self.state.background.borrow())];
        if let Some(shadow) = *self.state.shadow.borrow() {
            styles.push(Style::Shadow(shadow));
        }
        canvas.draw_shape(shape.as_ref(), frame, &styles)?;

        // Stroke goes in a second pass so it is never shadowed.
        if let Some(stroke) = *self.state.stroke.borrow() {
            canvas.draw_shape(shape.as_ref(), frame, &[Style::Stroke(stroke)])?;
        }
        Ok(())
    }

    fn hit_test(&self, widget: &Widget, x: f64, y: f64) -> bool {
        let frame = match widget.frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("hit test skipped, frame unresolved: {err}");
                return false;
            }
        };
        let stroke_width = self
            .state
            .stroke
            .borrow()
            .map(|stroke| stroke.thickness)
            .unwrap_or(0.0);
        let fill_rule = self.state.background.borrow().fill_rule;
        self.state.shape.borrow().hit_test(
            frame.width,
            frame.height,
            x - frame.x,
            y - frame.y,
            stroke_width,
            fill_rule,
        )
    }
}

/// A leaf widget drawing a filled [`Shape`], optionally stroked and
/// shadowed. Hit-testing delegates to the shape, widened by the stroke.
///
/// The shape defaults to a rectangle. Shape mutations flow back through
/// the shape's change list, so editing a shape in place invalidates the
/// surface without further wiring.
pub struct Surface {
    widget: Widget,
    state: Rc<SurfaceState>,
}

impl Clone for Surface {
    fn clone(&self) -> Self {
        Surface {
            widget: self.widget.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        let state = Rc::new(SurfaceState {
            background: RefCell::new(FillStyle::new(tessella_graphics::Color::TRANSPARENT)),
            stroke: RefCell::new(None),
            shadow: RefCell::new(None),
            shape: RefCell::new(Rc::new(RectangleShape::new())),
        });
        let widget = Widget::new_internal(
            Rc::new(SurfaceBehavior {
                state: Rc::clone(&state),
            }),
            None,
        );
        let surface = Surface { widget, state };
        surface
            .state
            .shape
            .borrow()
            .on_change()
            .add(&surface.widget.invalidate_hook());
        surface
    }

    pub fn as_widget(&self) -> Widget {
        self.widget.clone()
    }

    pub fn background(&self) -> FillStyle {
        *self.state.background.borrow()
    }

    pub fn set_background(&self, background: impl Into<FillStyle>) {
        *self.state.background.borrow_mut() = background.into();
        self.widget.invalidate();
    }

    pub fn stroke(&self) -> Option<StrokeStyle> {
        *self.state.stroke.borrow()
    }

    pub fn set_stroke(&self, stroke: Option<StrokeStyle>) {
        *self.state.stroke.borrow_mut() = stroke;
        self.widget.invalidate();
    }

    pub fn shadow(&self) -> Option<ShadowStyle> {
        *self.state.shadow.borrow()
    }

    pub fn set_shadow(&self, shadow: Option<ShadowStyle>) {
        *self.state.shadow.borrow_mut() = shadow;
        self.widget.invalidate();
    }

    pub fn shape(&self) -> Rc<dyn Shape> {
        Rc::clone(&self.state.shape.borrow())
    }

    pub fn set_shape(&self, shape: Rc<dyn Shape>) {
        let hook = self.widget.invalidate_hook();
        let previous = {
            let mut slot = self.state.shape.borrow_mut();
            std::mem::replace(&mut *slot, shape.clone())
        };
        previous.on_change().remove(&hook);
        shape.on_change().add(&hook);
        self.widget.invalidate();
    }
}
