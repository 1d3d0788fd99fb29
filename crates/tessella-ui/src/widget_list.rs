use std::cell::RefCell;
use std::rc::Rc;

use crate::widget::Widget;

/// Observer invoked after a list mutation with the widgets added and
/// removed by that mutation.
pub type ListObserver = Rc<dyn Fn(&WidgetList, &[Widget], &[Widget])>;

struct WidgetListInner {
    items: RefCell<Vec<Widget>>,
    observers: RefCell<Vec<ListObserver>>,
}

/// Ordered child list with mutation observers.
///
/// List order is draw order: later entries draw on top. Containers install
/// an observer to maintain the single-parent invariant, so plain list
/// operations are all that is needed to reparent a widget.
pub struct WidgetList {
    inner: Rc<WidgetListInner>,
}

impl Clone for WidgetList {
    fn clone(&self) -> Self {
        WidgetList {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for WidgetList {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetList {
    pub fn new() -> Self {
        WidgetList {
            inner: Rc::new(WidgetListInner {
                items: RefCell::new(Vec::new()),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Widget> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Index of the first occurrence, by identity.
    pub fn index_of(&self, widget: &Widget) -> Option<usize> {
        self.inner
            .items
            .borrow()
            .iter()
            .position(|item| item.same(widget))
    }

    pub fn contains(&self, widget: &Widget) -> bool {
        self.index_of(widget).is_some()
    }

    pub fn to_vec(&self) -> Vec<Widget> {
        self.inner.items.borrow().clone()
    }

    /// Appends `widget` and notifies observers. Re-adding a widget already
    /// in an observed container list moves it to the end.
    pub fn add(&self, widget: &Widget) {
        self.inner.items.borrow_mut().push(widget.clone());
        self.notify(&[widget.clone()], &[]);
    }

    /// Inserts at `index`, clamped to the list length. Returns the index
    /// actually used.
    pub fn insert(&self, index: usize, widget: &Widget) -> usize {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, widget.clone());
            index
        };
        self.notify(&[widget.clone()], &[]);
        index
    }

    /// Removes the first occurrence of `widget`. Returns whether anything
    /// was removed.
    pub fn remove(&self, widget: &Widget) -> bool {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            match items.iter().position(|item| item.same(widget)) {
                Some(index) => {
                    items.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.notify(&[], &[widget.clone()]);
        }
        removed
    }

    /// Registers an observer by identity. Observing twice with the same
    /// `Rc` is a no-op, so a mutation never notifies an observer twice.
    pub fn observe(&self, observer: &ListObserver) {
        let mut observers = self.inner.observers.borrow_mut();
        if observers
            .iter()
            .any(|candidate| Rc::ptr_eq(candidate, observer))
        {
            return;
        }
        observers.push(Rc::clone(observer));
    }

    pub fn unobserve(&self, observer: &ListObserver) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        match observers
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, observer))
        {
            Some(index) => {
                observers.remove(index);
                true
            }
            None => false,
        }
    }

    fn notify(&self, added: &[Widget], removed: &[Widget]) {
        // Snapshot so observers can mutate the observer list.
        let observers: Vec<ListObserver> = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(self, added, removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn add_and_remove_preserve_order() {
        let list = WidgetList::new();
        let first = Widget::new();
        let second = Widget::new();
        let third = Widget::new();

        list.add(&first);
        list.add(&second);
        list.insert(1, &third);
        assert_eq!(list.len(), 3);
        assert_eq!(list.index_of(&third), Some(1));

        assert!(list.remove(&first));
        assert!(!list.remove(&first));
        assert_eq!(list.index_of(&third), Some(0));
        assert_eq!(list.index_of(&second), Some(1));
    }

    #[test]
    fn insert_clamps_out_of_range_indices() {
        let list = WidgetList::new();
        let widget = Widget::new();
        assert_eq!(list.insert(10, &widget), 0);
        let tail = Widget::new();
        assert_eq!(list.insert(99, &tail), 1);
    }

    #[test]
    fn observers_see_additions_and_removals() {
        let list = WidgetList::new();
        let log: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let observer: ListObserver = Rc::new(move |_, added, removed| {
            sink.borrow_mut().push((added.len(), removed.len()));
        });
        list.observe(&observer);

        let widget = Widget::new();
        list.add(&widget);
        list.remove(&widget);
        assert_eq!(*log.borrow(), vec![(1, 0), (0, 1)]);

        assert!(list.unobserve(&observer));
        list.add(&widget);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn re_observing_the_same_observer_notifies_once() {
        let list = WidgetList::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&count);
        let observer: ListObserver = Rc::new(move |_, _, _| {
            *sink.borrow_mut() += 1;
        });
        list.observe(&observer);
        list.observe(&observer);

        list.add(&Widget::new());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn identity_distinguishes_equal_looking_widgets() {
        let list = WidgetList::new();
        let widget = Widget::new();
        let other = Widget::new();
        list.add(&widget);
        assert!(list.contains(&widget));
        assert!(list.contains(&widget.clone()));
        assert!(!list.contains(&other));
    }
}
