use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tessella_core::{handler, EventHandlerList, FrameTicket, Handler, RuntimeHandle};

use crate::theme::Theme;
use crate::view::View;
use crate::viewport::{ResizeEvent, Viewport};
use crate::widget::{ParentLink, PointerEvent, PointerEventKind, Widget};

thread_local! {
    static CURRENT: RefCell<Weak<AppInner>> = RefCell::new(Weak::new());
}

/// Error produced by application construction and focus changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationError {
    /// Only one application may exist per thread at a time.
    AlreadyRunning,
    /// The widget is not marked focusable.
    NotFocusable,
    /// The widget is not attached to an application.
    Detached,
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::AlreadyRunning => {
                write!(f, "an application is already running on this thread")
            }
            ApplicationError::NotFocusable => write!(f, "widget is not focusable"),
            ApplicationError::Detached => write!(f, "widget is not attached to an application"),
        }
    }
}

impl std::error::Error for ApplicationError {}

/// Application-level pointer event, fired after tree dispatch with the
/// full hit list and whether any widget handled the event.
#[derive(Clone, Debug)]
pub struct PointerDispatch {
    pub x: f64,
    pub y: f64,
    /// Widgets under the pointer, topmost first.
    pub widgets: Vec<Widget>,
    pub handled: bool,
}

pub(crate) struct AppInner {
    runtime: RuntimeHandle,
    viewport: Rc<dyn Viewport>,
    view: RefCell<Option<View>>,
    theme: RefCell<Option<Rc<Theme>>>,
    focused: RefCell<Option<Widget>>,
    on_click: EventHandlerList<PointerDispatch>,
    on_pointer_down: EventHandlerList<PointerDispatch>,
    on_pointer_move: EventHandlerList<PointerDispatch>,
    on_pointer_up: EventHandlerList<PointerDispatch>,
    on_resize: EventHandlerList<ResizeEvent>,
    /// Pending coalesced redraw, at most one per frame.
    draw_handle: RefCell<Option<FrameTicket>>,
    resize_hook: Handler<ResizeEvent>,
}

impl Drop for AppInner {
    fn drop(&mut self) {
        self.viewport.on_resize().remove(&self.resize_hook);
        CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            if current.upgrade().is_none() {
                *current = Weak::new();
            }
        });
    }
}

/// Root object connecting a widget tree to a [`Viewport`] and a runtime.
///
/// One application may exist per thread at a time; dropping every handle
/// releases the slot. `Application` is a cheap handle, clones share state.
///
/// Redraws are coalesced: any number of [`invalidate`](Self::invalidate)
/// calls between frames schedule exactly one draw on the next frame.
pub struct Application {
    inner: Rc<AppInner>,
}

impl Clone for Application {
    fn clone(&self) -> Self {
        Application {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Application {
    pub fn new(
        runtime: RuntimeHandle,
        viewport: Rc<dyn Viewport>,
    ) -> Result<Self, ApplicationError> {
        let occupied = CURRENT.with(|current| current.borrow().upgrade().is_some());
        if occupied {
            return Err(ApplicationError::AlreadyRunning);
        }

        let viewport_for_inner = Rc::clone(&viewport);
        let inner = Rc::new_cyclic(|weak: &Weak<AppInner>| {
            let resize_weak = weak.clone();
            let resize_hook = handler(move |event: &ResizeEvent| {
                if let Some(inner) = resize_weak.upgrade() {
                    Application::from_inner(inner).handle_resize(event);
                }
                false
            });

            // Focus follows clicks: first handler on the application click
            // list, so widget handlers observe the new focus state only on
            // the next event. Only the topmost hit counts; a focusable
            // widget buried under the hit does not attract focus.
            let focus_weak = weak.clone();
            let on_click = EventHandlerList::new();
            on_click.add(&handler(move |event: &PointerDispatch| {
                if let Some(inner) = focus_weak.upgrade() {
                    let app = Application::from_inner(inner);
                    match event.widgets.first() {
                        Some(widget) if widget.focusable() => {
                            let _ = app.set_focused(Some(widget.clone()));
                        }
                        _ => {
                            let _ = app.set_focused(None);
                        }
                    }
                }
                false
            }));

            AppInner {
                runtime,
                viewport: viewport_for_inner,
                view: RefCell::new(None),
                theme: RefCell::new(None),
                focused: RefCell::new(None),
                on_click,
                on_pointer_down: EventHandlerList::new(),
                on_pointer_move: EventHandlerList::new(),
                on_pointer_up: EventHandlerList::new(),
                on_resize: EventHandlerList::new(),
                draw_handle: RefCell::new(None),
                resize_hook,
            }
        });

        viewport.on_resize().add(&inner.resize_hook);
        CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(&inner));

        let app = Application { inner };
        app.handle_resize(&ResizeEvent {
            width: viewport.width(),
            height: viewport.height(),
        });
        Ok(app)
    }

    pub(crate) fn from_inner(inner: Rc<AppInner>) -> Self {
        Application { inner }
    }

    /// The application running on this thread, if any.
    pub fn current() -> Option<Application> {
        CURRENT.with(|current| current.borrow().upgrade().map(Application::from_inner))
    }

    pub fn runtime(&self) -> RuntimeHandle {
        self.inner.runtime.clone()
    }

    pub fn viewport(&self) -> Rc<dyn Viewport> {
        Rc::clone(&self.inner.viewport)
    }

    pub fn width(&self) -> f64 {
        self.inner.viewport.width()
    }

    pub fn height(&self) -> f64 {
        self.inner.viewport.height()
    }

    pub fn scale_factor(&self) -> f64 {
        self.inner.viewport.scale_factor()
    }

    pub fn view(&self) -> Option<View> {
        self.inner.view.borrow().clone()
    }

    /// Replaces the root view. The previous view is detached.
    pub fn set_view(&self, view: Option<View>) {
        let weak = Rc::downgrade(&self.inner);
        let previous = std::mem::replace(&mut *self.inner.view.borrow_mut(), view.clone());
        if let Some(previous) = previous {
            let widget = previous.as_widget();
            if let ParentLink::Application(parent) = widget.parent_link() {
                if parent.ptr_eq(&weak) {
                    widget.clear_parent();
                }
            }
        }
        if let Some(view) = &view {
            view.as_widget().set_parent_application(weak);
        }
        self.invalidate();
    }

    pub fn theme(&self) -> Option<Rc<Theme>> {
        self.inner.theme.borrow().clone()
    }

    pub fn set_theme(&self, theme: Option<Theme>) {
        *self.inner.theme.borrow_mut() = theme.map(Rc::new);
        self.invalidate();
    }

    pub fn find_by_id(&self, id: &str) -> Option<Widget> {
        self.view().and_then(|view| view.find_by_id(id))
    }

    pub fn focused_widget(&self) -> Option<Widget> {
        self.inner.focused.borrow().clone()
    }

    /// Moves focus. The newly focused widget's `on_focus` fires before the
    /// previous widget's `on_focus_lost`.
    pub fn set_focused(&self, widget: Option<Widget>) -> Result<(), ApplicationError> {
        if let Some(widget) = &widget {
            if !widget.focusable() {
                return Err(ApplicationError::NotFocusable);
            }
        }
        let unchanged = match (&widget, &*self.inner.focused.borrow()) {
            (None, None) => true,
            (Some(next), Some(current)) => next.same(current),
            _ => false,
        };
        if unchanged {
            return Ok(());
        }
        let previous = std::mem::replace(&mut *self.inner.focused.borrow_mut(), widget.clone());
        if let Some(widget) = &widget {
            widget.on_focus().invoke(&());
        }
        if let Some(previous) = &previous {
            previous.on_focus_lost().invoke(&());
        }
        Ok(())
    }

    pub fn on_click(&self) -> EventHandlerList<PointerDispatch> {
        self.inner.on_click.clone()
    }

    pub fn on_pointer_down(&self) -> EventHandlerList<PointerDispatch> {
        self.inner.on_pointer_down.clone()
    }

    pub fn on_pointer_move(&self) -> EventHandlerList<PointerDispatch> {
        self.inner.on_pointer_move.clone()
    }

    pub fn on_pointer_up(&self) -> EventHandlerList<PointerDispatch> {
        self.inner.on_pointer_up.clone()
    }

    pub fn on_resize(&self) -> EventHandlerList<ResizeEvent> {
        self.inner.on_resize.clone()
    }

    fn pointer_list(&self, kind: PointerEventKind) -> EventHandlerList<PointerDispatch> {
        match kind {
            PointerEventKind::Click => self.on_click(),
            PointerEventKind::Down => self.on_pointer_down(),
            PointerEventKind::Move => self.on_pointer_move(),
            PointerEventKind::Up => self.on_pointer_up(),
        }
    }

    /// Routes a pointer event at application coordinates through the tree.
    ///
    /// Hit widgets receive the event topmost first in local coordinates;
    /// dispatch stops at the first widget whose handlers report it
    /// handled. The application-level list always fires afterwards with
    /// the full hit list.
    pub fn dispatch_pointer(&self, kind: PointerEventKind, x: f64, y: f64) {
        let widgets = self
            .view()
            .map(|view| view.widgets_at(x, y))
            .unwrap_or_default();

        let mut handled = false;
        for widget in &widgets {
            let local = PointerEvent {
                x: x - widget.x(),
                y: y - widget.y(),
            };
            if widget.pointer_events(kind).invoke(&local) {
                handled = true;
                break;
            }
        }

        self.pointer_list(kind).invoke(&PointerDispatch {
            x,
            y,
            widgets,
            handled,
        });
    }

    /// Schedules a redraw on the next frame. Calls between frames coalesce
    /// into a single draw.
    pub fn invalidate(&self) {
        let mut pending = self.inner.draw_handle.borrow_mut();
        if pending.is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let ticket = self.inner.runtime.on_next_frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                let app = Application::from_inner(inner);
                app.inner.draw_handle.borrow_mut().take();
                app.draw();
            }
        });
        *pending = Some(ticket);
    }

    /// Draws the tree into the viewport canvas immediately.
    pub fn draw(&self) {
        let viewport = self.viewport();
        let scale = viewport.scale_factor();
        let canvas = viewport.canvas();
        let view = self.view();

        let mut canvas = canvas.borrow_mut();
        canvas.set_width(viewport.width() * scale);
        canvas.set_height(viewport.height() * scale);
        canvas.set_scale_factor(scale);
        canvas.clear();
        if let Some(view) = view {
            if let Err(err) = view.as_widget().draw(&mut *canvas) {
                log::error!("view draw failed: {err}");
            }
        }
    }

    fn handle_resize(&self, event: &ResizeEvent) {
        self.inner.on_resize.invoke(event);
        self.invalidate();
    }
}
