use std::cell::RefCell;
use std::rc::Rc;

use tessella_core::EventHandlerList;
use tessella_graphics::Canvas;

/// New viewport dimensions in viewport units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    pub width: f64,
    pub height: f64,
}

/// Host window or drawing region an application renders into.
///
/// Implementations own the backing [`Canvas`] and fire `on_resize`
/// whenever their dimensions change. All sizes are in viewport units; the
/// scale factor maps them to physical pixels.
pub trait Viewport {
    fn width(&self) -> f64;

    fn height(&self) -> f64;

    fn scale_factor(&self) -> f64;

    fn canvas(&self) -> Rc<RefCell<dyn Canvas>>;

    fn on_resize(&self) -> EventHandlerList<ResizeEvent>;
}
