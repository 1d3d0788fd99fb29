use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use tessella_core::{handler, EventHandlerList, Handler};
use tessella_graphics::{Canvas, DrawError, Rect};

use crate::application::{AppInner, Application, ApplicationError};
use crate::container::Container;
use crate::length::{Length, LengthError, LengthInput, ValueSource};
use crate::padding::Padding;
use crate::visibility::Visibility;
use crate::widget_list::WidgetList;

/// Pointer event payload in widget-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PointerEventKind {
    Click,
    Down,
    Move,
    Up,
}

/// Drawing and hit-testing strategy of a widget.
///
/// Concrete widget types supply a behavior at construction; the base
/// behavior draws nothing and hit-tests the resolved frame.
pub trait WidgetBehavior: 'static {
    fn draw(&self, widget: &Widget, canvas: &mut dyn Canvas) -> Result<(), DrawError> {
        let _ = (widget, canvas);
        Ok(())
    }

    fn hit_test(&self, widget: &Widget, x: f64, y: f64) -> bool {
        widget.default_hit_test(x, y)
    }
}

struct DefaultBehavior;

impl WidgetBehavior for DefaultBehavior {}

#[derive(Clone)]
pub(crate) enum ParentLink {
    None,
    Widget(Weak<WidgetInner>),
    Application(Weak<AppInner>),
}

pub(crate) struct WidgetEvents {
    pub(crate) on_click: EventHandlerList<PointerEvent>,
    pub(crate) on_pointer_down: EventHandlerList<PointerEvent>,
    pub(crate) on_pointer_move: EventHandlerList<PointerEvent>,
    pub(crate) on_pointer_up: EventHandlerList<PointerEvent>,
    pub(crate) on_focus: EventHandlerList<()>,
    pub(crate) on_focus_lost: EventHandlerList<()>,
}

impl WidgetEvents {
    fn new() -> Self {
        Self {
            on_click: EventHandlerList::new(),
            on_pointer_down: EventHandlerList::new(),
            on_pointer_move: EventHandlerList::new(),
            on_pointer_up: EventHandlerList::new(),
            on_focus: EventHandlerList::new(),
            on_focus_lost: EventHandlerList::new(),
        }
    }
}

struct WidgetProps {
    id: Option<String>,
    x: f64,
    y: f64,
    width: Length,
    height: Length,
    padding: Padding,
    visibility: Visibility,
    hit_test_enabled: bool,
    focusable: bool,
}

pub(crate) struct WidgetInner {
    props: RefCell<WidgetProps>,
    parent: RefCell<ParentLink>,
    events: WidgetEvents,
    behavior: RefCell<Rc<dyn WidgetBehavior>>,
    /// `Some` exactly for container widgets.
    children: Option<WidgetList>,
    /// Forwards change notifications from owned objects (padding, shapes)
    /// into [`Widget::invalidate`].
    invalidate_hook: OnceCell<Handler<()>>,
}

/// A node in the widget tree.
///
/// `Widget` is a cheap handle: clones share the same node and compare equal
/// by identity. Position is relative to the application origin, sizes are
/// [`Length`]s resolved lazily against the parent. Every mutation of a
/// visual property invalidates the owning application.
pub struct Widget {
    pub(crate) inner: Rc<WidgetInner>,
}

impl Clone for Widget {
    fn clone(&self) -> Self {
        Widget {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Widget {}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let props = self.inner.props.borrow();
        f.debug_struct("Widget")
            .field("id", &props.id)
            .field("x", &props.x)
            .field("y", &props.y)
            .finish_non_exhaustive()
    }
}

impl Default for Widget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget {
    pub fn new() -> Self {
        Self::new_internal(Rc::new(DefaultBehavior), None)
    }

    pub(crate) fn new_internal(
        behavior: Rc<dyn WidgetBehavior>,
        children: Option<WidgetList>,
    ) -> Self {
        let inner = Rc::new(WidgetInner {
            props: RefCell::new(WidgetProps {
                id: None,
                x: 0.0,
                y: 0.0,
                width: Length::zero(),
                height: Length::zero(),
                padding: Padding::zero(),
                visibility: Visibility::Visible,
                hit_test_enabled: true,
                focusable: false,
            }),
            parent: RefCell::new(ParentLink::None),
            events: WidgetEvents::new(),
            behavior: RefCell::new(behavior),
            children,
            invalidate_hook: OnceCell::new(),
        });
        let weak = Rc::downgrade(&inner);
        let hook = handler(move |_: &()| {
            if let Some(inner) = weak.upgrade() {
                Widget { inner }.invalidate();
            }
            false
        });
        let _ = inner.invalidate_hook.set(hook.clone());
        inner.props.borrow().padding.on_change().add(&hook);
        Widget { inner }
    }

    /// Identity comparison; clones of the same widget are the same node.
    pub fn same(&self, other: &Widget) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn invalidate_hook(&self) -> Handler<()> {
        match self.inner.invalidate_hook.get() {
            Some(hook) => hook.clone(),
            // Set in the constructor before the handle escapes.
            None => unreachable!("invalidate hook installed at construction"),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.inner.props.borrow().id.clone()
    }

    pub fn set_id(&self, id: Option<impl Into<String>>) {
        self.inner.props.borrow_mut().id = id.map(Into::into);
    }

    pub fn x(&self) -> f64 {
        self.inner.props.borrow().x
    }

    pub fn set_x(&self, x: f64) {
        self.inner.props.borrow_mut().x = x;
        self.invalidate();
    }

    pub fn y(&self) -> f64 {
        self.inner.props.borrow().y
    }

    pub fn set_y(&self, y: f64) {
        self.inner.props.borrow_mut().y = y;
        self.invalidate();
    }

    pub fn width_length(&self) -> Length {
        self.inner.props.borrow().width.clone()
    }

    pub fn height_length(&self) -> Length {
        self.inner.props.borrow().height.clone()
    }

    /// Accepts a number, a [`Length`], or a string in `"12"`, `"50%"` or
    /// `"24px"` form. Percentages resolve against the parent's width at
    /// evaluation time.
    pub fn set_width(&self, width: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = Length::parse_scaled(
            width,
            self.parent_extent_source(Axis::Width),
            self.scale_factor_source(),
        )?;
        self.inner.props.borrow_mut().width = length;
        self.invalidate();
        Ok(())
    }

    /// Like [`set_width`](Self::set_width); percentages resolve against
    /// the parent's height.
    pub fn set_height(&self, height: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = Length::parse_scaled(
            height,
            self.parent_extent_source(Axis::Height),
            self.scale_factor_source(),
        )?;
        self.inner.props.borrow_mut().height = length;
        self.invalidate();
        Ok(())
    }

    /// Resolved width in viewport units; zero while the widget is gone.
    pub fn width(&self) -> Result<f64, LengthError> {
        let (length, visibility) = {
            let props = self.inner.props.borrow();
            (props.width.clone(), props.visibility)
        };
        if visibility == Visibility::Gone {
            return Ok(0.0);
        }
        length.value()
    }

    pub fn height(&self) -> Result<f64, LengthError> {
        let (length, visibility) = {
            let props = self.inner.props.borrow();
            (props.height.clone(), props.visibility)
        };
        if visibility == Visibility::Gone {
            return Ok(0.0);
        }
        length.value()
    }

    /// Resolved bounds in application coordinates.
    pub fn frame(&self) -> Result<Rect, LengthError> {
        Ok(Rect::new(self.x(), self.y(), self.width()?, self.height()?))
    }

    pub fn padding(&self) -> Padding {
        self.inner.props.borrow().padding.clone()
    }

    pub fn set_padding(&self, padding: Padding) {
        let hook = self.invalidate_hook();
        let previous = {
            let mut props = self.inner.props.borrow_mut();
            std::mem::replace(&mut props.padding, padding.clone())
        };
        previous.on_change().remove(&hook);
        padding.on_change().add(&hook);
        self.invalidate();
    }

    pub fn visibility(&self) -> Visibility {
        self.inner.props.borrow().visibility
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.inner.props.borrow_mut().visibility = visibility;
        self.invalidate();
    }

    pub fn hit_test_enabled(&self) -> bool {
        self.inner.props.borrow().hit_test_enabled
    }

    pub fn set_hit_test_enabled(&self, enabled: bool) {
        self.inner.props.borrow_mut().hit_test_enabled = enabled;
    }

    pub fn focusable(&self) -> bool {
        self.inner.props.borrow().focusable
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.inner.props.borrow_mut().focusable = focusable;
    }

    pub fn on_click(&self) -> EventHandlerList<PointerEvent> {
        self.inner.events.on_click.clone()
    }

    pub fn on_pointer_down(&self) -> EventHandlerList<PointerEvent> {
        self.inner.events.on_pointer_down.clone()
    }

    pub fn on_pointer_move(&self) -> EventHandlerList<PointerEvent> {
        self.inner.events.on_pointer_move.clone()
    }

    pub fn on_pointer_up(&self) -> EventHandlerList<PointerEvent> {
        self.inner.events.on_pointer_up.clone()
    }

    pub fn pointer_events(&self, kind: PointerEventKind) -> EventHandlerList<PointerEvent> {
        match kind {
            PointerEventKind::Click => self.on_click(),
            PointerEventKind::Down => self.on_pointer_down(),
            PointerEventKind::Move => self.on_pointer_move(),
            PointerEventKind::Up => self.on_pointer_up(),
        }
    }

    pub fn on_focus(&self) -> EventHandlerList<()> {
        self.inner.events.on_focus.clone()
    }

    pub fn on_focus_lost(&self) -> EventHandlerList<()> {
        self.inner.events.on_focus_lost.clone()
    }

    /// Requests focus through the owning application.
    pub fn focus(&self) -> Result<(), ApplicationError> {
        match self.application() {
            Some(app) => app.set_focused(Some(self.clone())),
            None => Err(ApplicationError::Detached),
        }
    }

    pub fn blur(&self) {
        if let Some(app) = self.application() {
            if app
                .focused_widget()
                .is_some_and(|focused| focused.same(self))
            {
                // Clearing focus cannot fail.
                let _ = app.set_focused(None);
            }
        }
    }

    pub fn is_focused(&self) -> bool {
        self.application()
            .and_then(|app| app.focused_widget())
            .is_some_and(|focused| focused.same(self))
    }

    pub fn parent(&self) -> Option<Widget> {
        match &*self.inner.parent.borrow() {
            ParentLink::Widget(weak) => weak.upgrade().map(|inner| Widget { inner }),
            _ => None,
        }
    }

    pub(crate) fn parent_container(&self) -> Option<Container> {
        let parent = self.parent()?;
        parent.as_container()
    }

    pub(crate) fn set_parent_widget(&self, parent: &Widget) {
        *self.inner.parent.borrow_mut() = ParentLink::Widget(Rc::downgrade(&parent.inner));
    }

    pub(crate) fn set_parent_application(&self, app: Weak<AppInner>) {
        *self.inner.parent.borrow_mut() = ParentLink::Application(app);
    }

    pub(crate) fn clear_parent(&self) {
        *self.inner.parent.borrow_mut() = ParentLink::None;
    }

    pub(crate) fn parent_link(&self) -> ParentLink {
        self.inner.parent.borrow().clone()
    }

    /// The application this widget is attached to, through any number of
    /// container ancestors.
    pub fn application(&self) -> Option<Application> {
        let mut current = Rc::clone(&self.inner);
        loop {
            let link = current.parent.borrow().clone();
            match link {
                ParentLink::None => return None,
                ParentLink::Widget(weak) => current = weak.upgrade()?,
                ParentLink::Application(weak) => {
                    return weak.upgrade().map(Application::from_inner)
                }
            }
        }
    }

    /// The container view of this widget, if it is one.
    pub fn as_container(&self) -> Option<Container> {
        if self.inner.children.is_some() {
            Some(Container::from_inner(Rc::clone(&self.inner)))
        } else {
            None
        }
    }

    pub(crate) fn children(&self) -> Option<&WidgetList> {
        self.inner.children.as_ref()
    }

    /// Schedules a redraw of the owning application. Detached widgets
    /// invalidate nothing.
    pub fn invalidate(&self) {
        if let Some(app) = self.application() {
            app.invalidate();
        }
    }

    pub fn behavior(&self) -> Rc<dyn WidgetBehavior> {
        Rc::clone(&self.inner.behavior.borrow())
    }

    pub fn set_behavior(&self, behavior: Rc<dyn WidgetBehavior>) {
        *self.inner.behavior.borrow_mut() = behavior;
        self.invalidate();
    }

    /// True when the point in application coordinates lands on this
    /// widget. Disabled and gone widgets never hit.
    pub fn hit_test(&self, x: f64, y: f64) -> bool {
        {
            let props = self.inner.props.borrow();
            if !props.hit_test_enabled || props.visibility == Visibility::Gone {
                return false;
            }
        }
        self.behavior().hit_test(self, x, y)
    }

    /// Bounds hit test with inclusive edges, used by behaviors that do not
    /// override hit-testing.
    pub fn default_hit_test(&self, x: f64, y: f64) -> bool {
        match self.frame() {
            Ok(frame) => frame.contains_inclusive(x, y),
            Err(err) => {
                log::warn!("hit test skipped, frame unresolved: {err}");
                false
            }
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), DrawError> {
        self.behavior().draw(self, canvas)
    }

    pub(crate) fn set_width_length(&self, width: Length) {
        self.inner.props.borrow_mut().width = width;
        self.invalidate();
    }

    pub(crate) fn set_height_length(&self, height: Length) {
        self.inner.props.borrow_mut().height = height;
        self.invalidate();
    }

    pub(crate) fn parent_width_source(&self) -> ValueSource {
        self.parent_extent_source(Axis::Width)
    }

    pub(crate) fn parent_height_source(&self) -> ValueSource {
        self.parent_extent_source(Axis::Height)
    }

    fn parent_extent_source(&self, axis: Axis) -> ValueSource {
        let weak = Rc::downgrade(&self.inner);
        ValueSource::live(move || match weak.upgrade() {
            Some(inner) => parent_extent(&inner, axis),
            None => 0.0,
        })
    }

    fn scale_factor_source(&self) -> ValueSource {
        let weak = Rc::downgrade(&self.inner);
        ValueSource::live(move || {
            weak.upgrade()
                .and_then(|inner| Widget { inner }.application())
                .map(|app| app.scale_factor())
                .unwrap_or(1.0)
        })
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Width,
    Height,
}

/// Resolves the size of a widget's parent along one axis. A parent whose
/// own size fails to resolve yields NaN so the dependent percentage
/// surfaces the error instead of silently reading zero.
fn parent_extent(inner: &Rc<WidgetInner>, axis: Axis) -> f64 {
    let link = inner.parent.borrow().clone();
    match link {
        ParentLink::None => 0.0,
        ParentLink::Widget(weak) => match weak.upgrade() {
            Some(parent) => {
                let parent = Widget { inner: parent };
                let extent = match axis {
                    Axis::Width => parent.width(),
                    Axis::Height => parent.height(),
                };
                extent.unwrap_or(f64::NAN)
            }
            None => 0.0,
        },
        ParentLink::Application(weak) => match weak.upgrade() {
            Some(app) => {
                let app = Application::from_inner(app);
                match axis {
                    Axis::Width => app.width(),
                    Axis::Height => app.height(),
                }
            }
            None => 0.0,
        },
    }
}
