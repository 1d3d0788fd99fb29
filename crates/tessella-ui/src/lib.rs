//! Retained-mode widget tree, invalidation and animation core for Tessella.
//!
//! A tree of [`Widget`]s hangs off an [`Application`] through a root
//! [`View`]. Mutating any visual property invalidates the application, which
//! coalesces redraws into at most one frame callback. Pointer input enters
//! through [`Application::dispatch_pointer`], is hit-tested back-to-front
//! against the tree and dispatched through [`tessella_core::EventHandlerList`]s.
//! [`Animator`]s drive interpolated values through the same frame-callback
//! primitive, independent of the tree.

mod animation;
mod application;
mod container;
mod length;
mod padding;
mod surface;
mod theme;
mod view;
mod viewport;
mod visibility;
mod widget;
mod widget_list;

pub use animation::{
    AnimationState, Animator, AnimatorError, Interpolator, InterpolatorError, NumberAnimator,
    NumberProducer, TimeAnimator, TimeProducer, ValueProducer,
};
pub use application::{Application, ApplicationError, PointerDispatch};
pub use container::Container;
pub use length::{Length, LengthError, LengthInput, ValueSource};
pub use padding::Padding;
pub use surface::Surface;
pub use theme::Theme;
pub use view::View;
pub use viewport::{ResizeEvent, Viewport};
pub use visibility::Visibility;
pub use widget::{PointerEvent, PointerEventKind, Widget, WidgetBehavior};
pub use widget_list::{ListObserver, WidgetList};
