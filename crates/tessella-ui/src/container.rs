use std::rc::Rc;

use tessella_graphics::{Canvas, DrawError};

use crate::visibility::Visibility;
use crate::widget::{Widget, WidgetBehavior, WidgetInner};
use crate::widget_list::{ListObserver, WidgetList};

pub(crate) struct ContainerBehavior;

impl WidgetBehavior for ContainerBehavior {
    fn draw(&self, widget: &Widget, canvas: &mut dyn Canvas) -> Result<(), DrawError> {
        if let Some(container) = widget.as_container() {
            container.draw_children(canvas);
        }
        Ok(())
    }
}

/// A widget holding an ordered list of children.
///
/// The child list enforces the single-parent invariant through a list
/// observer: adding a widget detaches it from its previous container, so
/// reparenting is a single `add_child` call. Adding a widget that is
/// already a child moves it to the end of the list. Every membership
/// change invalidates the container.
pub struct Container {
    inner: Rc<WidgetInner>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Container {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_behavior(Rc::new(ContainerBehavior))
    }

    pub(crate) fn with_behavior(behavior: Rc<dyn WidgetBehavior>) -> Self {
        let widget = Widget::new_internal(behavior, Some(WidgetList::new()));
        let container = Container {
            inner: Rc::clone(&widget.inner),
        };
        container.install_observer();
        container
    }

    pub(crate) fn from_inner(inner: Rc<WidgetInner>) -> Self {
        Container { inner }
    }

    pub fn as_widget(&self) -> Widget {
        Widget {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn children(&self) -> WidgetList {
        match self.as_widget().children() {
            Some(list) => list.clone(),
            // Containers are constructed with a child list.
            None => unreachable!("container without a child list"),
        }
    }

    pub fn add_child(&self, widget: &Widget) {
        self.children().add(widget);
    }

    /// Inserts at `index` in draw order, clamped to the child count.
    pub fn insert_child(&self, index: usize, widget: &Widget) -> usize {
        self.children().insert(index, widget)
    }

    pub fn remove_child(&self, widget: &Widget) -> bool {
        self.children().remove(widget)
    }

    pub fn child(&self, index: usize) -> Option<Widget> {
        self.children().get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Depth-first search for a widget by id, this container excluded.
    pub fn find_by_id(&self, id: &str) -> Option<Widget> {
        for child in self.children().to_vec() {
            if child.id().as_deref() == Some(id) {
                return Some(child);
            }
            if let Some(container) = child.as_container() {
                if let Some(found) = container.find_by_id(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All widgets hit by the point, topmost first, this container
    /// included when its own hit test passes.
    ///
    /// Children are visited in reverse draw order. Subtrees are searched
    /// even when the container itself misses, so children overflowing
    /// their container's bounds stay reachable. A hit container appears
    /// after the hits inside it, so the innermost widget under the
    /// pointer is always first.
    pub fn widgets_at(&self, x: f64, y: f64) -> Vec<Widget> {
        let mut hits = Vec::new();
        self.collect_hits(x, y, &mut hits);
        hits
    }

    fn collect_hits(&self, x: f64, y: f64, hits: &mut Vec<Widget>) {
        let children = self.children().to_vec();
        for child in children.iter().rev() {
            match child.as_container() {
                Some(container) => container.collect_hits(x, y, hits),
                None => {
                    if child.hit_test(x, y) {
                        hits.push(child.clone());
                    }
                }
            }
        }
        let own = self.as_widget();
        if own.hit_test(x, y) {
            hits.push(own);
        }
    }

    /// Draws every visible child in order, logging and skipping children
    /// whose draw fails.
    pub fn draw_children(&self, canvas: &mut dyn Canvas) {
        for child in self.children().to_vec() {
            if child.visibility() != Visibility::Visible {
                continue;
            }
            if let Err(err) = child.draw(canvas) {
                log::error!("widget draw failed: {err}");
            }
        }
    }

    fn install_observer(&self) {
        let weak = Rc::downgrade(&self.inner);
        let observer: ListObserver = Rc::new(move |_, added, removed| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let container = Container { inner };
            for widget in added {
                if let Some(previous) = widget.parent_container() {
                    previous.children().remove(widget);
                }
                widget.set_parent_widget(&container.as_widget());
            }
            for widget in removed {
                if widget
                    .parent_container()
                    .is_some_and(|parent| parent.as_widget().same(&container.as_widget()))
                {
                    widget.clear_parent();
                }
            }
            container.as_widget().invalidate();
        });
        self.children().observe(&observer);
    }
}
