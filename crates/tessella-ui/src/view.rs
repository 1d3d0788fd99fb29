use std::cell::RefCell;
use std::rc::Rc;

use tessella_graphics::{Canvas, Color, DrawError, FillStyle, Style};

use crate::container::Container;
use crate::length::Length;
use crate::widget::{Widget, WidgetBehavior};
use crate::widget_list::WidgetList;

struct ViewStyle {
    background: RefCell<Color>,
}

struct ViewBehavior {
    style: Rc<ViewStyle>,
}

impl WidgetBehavior for ViewBehavior {
    fn draw(&self, widget: &Widget, canvas: &mut dyn Canvas) -> Result<(), DrawError> {
        let frame = widget
            .frame()
            .map_err(|err| DrawError::invalid_geometry(err.to_string()))?;
        let background = *self.style.background.borrow();
        canvas.draw_rect(frame, &[Style::Fill(FillStyle::from(background))])?;
        if let Some(container) = widget.as_container() {
            container.draw_children(canvas);
        }
        Ok(())
    }
}

/// Root container of an application.
///
/// A view fills the viewport (its width and height default to 100% of the
/// parent) and paints a background color behind its children.
pub struct View {
    container: Container,
    style: Rc<ViewStyle>,
}

impl Clone for View {
    fn clone(&self) -> Self {
        View {
            container: self.container.clone(),
            style: Rc::clone(&self.style),
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        let style = Rc::new(ViewStyle {
            background: RefCell::new(Color::TRANSPARENT),
        });
        let container = Container::with_behavior(Rc::new(ViewBehavior {
            style: Rc::clone(&style),
        }));
        let widget = container.as_widget();
        // A view tracks its parent extent exactly.
        widget.set_width_length(Length::percentage(1.0, widget.parent_width_source()));
        widget.set_height_length(Length::percentage(1.0, widget.parent_height_source()));
        View { container, style }
    }

    pub fn as_widget(&self) -> Widget {
        self.container.as_widget()
    }

    pub fn as_container(&self) -> Container {
        self.container.clone()
    }

    pub fn background(&self) -> Color {
        *self.style.background.borrow()
    }

    pub fn set_background(&self, color: Color) {
        *self.style.background.borrow_mut() = color;
        self.as_widget().invalidate();
    }

    pub fn add_child(&self, widget: &Widget) {
        self.container.add_child(widget);
    }

    pub fn remove_child(&self, widget: &Widget) -> bool {
        self.container.remove_child(widget)
    }

    pub fn children(&self) -> WidgetList {
        self.container.children()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Widget> {
        self.container.find_by_id(id)
    }

    pub fn widgets_at(&self, x: f64, y: f64) -> Vec<Widget> {
        self.container.widgets_at(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessella_graphics::Rect;

    struct NullCanvas {
        width: f64,
        height: f64,
        rects: Vec<Rect>,
    }

    impl NullCanvas {
        fn new() -> Self {
            Self {
                width: 0.0,
                height: 0.0,
                rects: Vec::new(),
            }
        }
    }

    impl Canvas for NullCanvas {
        fn width(&self) -> f64 {
            self.width
        }
        fn set_width(&mut self, width: f64) {
            self.width = width;
        }
        fn height(&self) -> f64 {
            self.height
        }
        fn set_height(&mut self, height: f64) {
            self.height = height;
        }
        fn scale_factor(&self) -> f64 {
            1.0
        }
        fn set_scale_factor(&mut self, _scale_factor: f64) {}
        fn draw_rect(&mut self, rect: Rect, _styles: &[Style]) -> Result<(), DrawError> {
            self.rects.push(rect);
            Ok(())
        }
        fn draw_shape(
            &mut self,
            _shape: &dyn tessella_graphics::Shape,
            rect: Rect,
            _styles: &[Style],
        ) -> Result<(), DrawError> {
            self.rects.push(rect);
            Ok(())
        }
        fn draw_image(
            &mut self,
            _image: &dyn tessella_graphics::ImageSource,
            _dest: Rect,
            _src: Option<Rect>,
        ) -> Result<(), DrawError> {
            Ok(())
        }
        fn draw_text(
            &mut self,
            _text: &str,
            _x: f64,
            _y: f64,
            _options: &tessella_graphics::TextOptions,
            _styles: &[Style],
        ) -> Result<(), DrawError> {
            Ok(())
        }
        fn draw_text_block(
            &mut self,
            _text: &str,
            _rect: Rect,
            _options: &tessella_graphics::TextOptions,
            _styles: &[Style],
        ) -> Result<(), DrawError> {
            Ok(())
        }
        fn measure_text(
            &mut self,
            _text: &str,
            _options: &tessella_graphics::TextOptions,
        ) -> tessella_graphics::TextMetrics {
            tessella_graphics::TextMetrics::default()
        }
        fn clear(&mut self) {}
    }

    #[test]
    fn detached_view_has_zero_extent() {
        let view = View::new();
        assert_eq!(view.as_widget().width().unwrap(), 0.0);
        assert_eq!(view.as_widget().height().unwrap(), 0.0);
    }

    #[test]
    fn view_draws_background_then_children() {
        let view = View::new();
        view.set_background(Color::rgb(0.5, 0.5, 0.5));
        let child = Widget::new();
        child.set_width(10.0).unwrap();
        child.set_height(10.0).unwrap();
        view.add_child(&child);

        let mut canvas = NullCanvas::new();
        view.as_widget().draw(&mut canvas).unwrap();
        // Background rect only; the plain child widget draws nothing.
        assert_eq!(canvas.rects.len(), 1);
    }
}
