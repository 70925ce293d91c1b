//! One batch manager per navigable scope.
//!
//! A scope is whatever the user navigates between: a folder, a hierarchy
//! level, a tag-category list. The registry builds a manager on the first
//! visit and rebinds the same manager on later visits, so the slot is never
//! silently replaced.

use crate::batch::{BatchManager, BatchOptions, SharedList, SharedManager};
use crate::coordinator::{ManagerAccessor, TrackedHandle};
use crate::models::Item;
use crate::CoreError;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

type OptionsFactory<K, T> = Box<dyn Fn(&K) -> BatchOptions<T>>;

/// Registry of managers keyed by scope identity.
///
/// Methods take `&self` and never hold the map borrowed while a manager runs
/// its callbacks, so accessors handed to a save coordinator can resolve
/// during a rebind.
pub struct ScopeRegistry<K, T> {
    managers: RefCell<HashMap<K, SharedManager<T>>>,
    options: OptionsFactory<K, T>,
}

impl<K, T> ScopeRegistry<K, T>
where
    K: Eq + Hash + Clone + Debug + 'static,
    T: Item + 'static,
{
    /// Create a registry whose managers get options from `options`.
    pub fn new(options: impl Fn(&K) -> BatchOptions<T> + 'static) -> Self {
        Self {
            managers: RefCell::new(HashMap::new()),
            options: Box::new(options),
        }
    }

    /// Show scope `key` backed by `list`.
    ///
    /// # Returns
    /// The scope's manager: newly built on the first visit, rebound with
    /// [`BatchManager::set_list`] when `list` is a different list than the
    /// one it governs, untouched otherwise.
    pub fn visit(&self, key: K, list: SharedList<T>) -> SharedManager<T> {
        let existing = self.managers.borrow().get(&key).cloned();
        match existing {
            Some(manager) => {
                let same_list = Rc::ptr_eq(&manager.borrow().list(), &list);
                if !same_list {
                    tracing::debug!(scope = ?key, "rebinding scope manager");
                    manager.borrow_mut().set_list(list);
                }
                manager
            }
            None => {
                tracing::debug!(scope = ?key, "creating scope manager");
                let manager = BatchManager::shared(list, (self.options)(&key));
                self.managers
                    .borrow_mut()
                    .insert(key, Rc::clone(&manager));
                manager
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<SharedManager<T>> {
        self.managers.borrow().get(key).cloned()
    }

    /// Tear down the manager for `key`.
    pub fn remove(&self, key: &K) -> Option<SharedManager<T>> {
        self.managers.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.managers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.borrow().is_empty()
    }

    fn all(&self) -> Vec<SharedManager<T>> {
        self.managers.borrow().values().cloned().collect()
    }

    pub fn any_dirty(&self) -> bool {
        self.all().iter().any(|manager| manager.borrow().is_dirty())
    }

    /// Reset every manager to its baseline.
    ///
    /// # Errors
    /// Returns the first reset error after attempting every manager.
    pub fn reset_all(&self) -> Result<(), CoreError> {
        let mut first_error = None;
        for manager in self.all() {
            if let Err(err) = manager.borrow_mut().reset() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn clear_selections(&self) {
        for manager in self.all() {
            manager.borrow_mut().clear_selection();
        }
    }

    /// Accessor resolving the manager for `key` at call time.
    ///
    /// Resolves to `None` until the scope is first visited, after it is
    /// removed, or once the registry is dropped.
    pub fn accessor(self: &Rc<Self>, key: K) -> ManagerAccessor {
        let registry = Rc::downgrade(self);
        Box::new(move || {
            let manager = registry.upgrade()?.get(&key)?;
            let handle: TrackedHandle = manager;
            Some(handle)
        })
    }
}

/// Manager slot filled on first use.
pub struct LazyManager<T> {
    slot: Rc<OnceCell<SharedManager<T>>>,
}

impl<T> Clone for LazyManager<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for LazyManager<T> {
    fn default() -> Self {
        Self {
            slot: Rc::new(OnceCell::new()),
        }
    }
}

impl<T: Item + 'static> LazyManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<SharedManager<T>> {
        self.slot.get().cloned()
    }

    /// Return the manager, building it with `init` on first call.
    pub fn get_or_init(&self, init: impl FnOnce() -> SharedManager<T>) -> SharedManager<T> {
        Rc::clone(self.slot.get_or_init(init))
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Accessor resolving to `None` until the slot is filled.
    pub fn accessor(&self) -> ManagerAccessor {
        let slot = Rc::clone(&self.slot);
        Box::new(move || {
            let handle: TrackedHandle = slot.get()?.clone();
            Some(handle)
        })
    }
}
