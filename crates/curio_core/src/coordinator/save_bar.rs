//! Shared commit/revert affordance.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type VisibilityListener = Rc<dyn Fn(bool)>;

#[derive(Default)]
struct SaveBarState {
    visible: Cell<bool>,
    busy: Cell<bool>,
    listeners: RefCell<Vec<VisibilityListener>>,
}

/// Cloneable handle to the single save/cancel bar of a view.
///
/// Clones share state; managers and the coordinator all drive the same bar.
#[derive(Clone, Default)]
pub struct SaveBar {
    state: Rc<SaveBarState>,
}

impl SaveBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the bar visible; listeners fire only on an actual change.
    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    /// Whether a commit is running; the save button is disabled meanwhile.
    pub fn is_busy(&self) -> bool {
        self.state.busy.get()
    }

    pub fn set_busy(&self, busy: bool) {
        self.state.busy.set(busy);
    }

    /// Register a listener called with the new visibility on every change.
    pub fn on_toggle(&self, listener: impl Fn(bool) + 'static) {
        self.state.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn set_visible(&self, visible: bool) {
        if self.state.visible.replace(visible) == visible {
            return;
        }
        let listeners: Vec<VisibilityListener> = self.state.listeners.borrow().clone();
        for listener in listeners {
            listener(visible);
        }
    }
}

impl fmt::Debug for SaveBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveBar")
            .field("visible", &self.is_visible())
            .field("busy", &self.is_busy())
            .finish()
    }
}
