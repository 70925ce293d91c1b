//! Batch manager: ordered selection, reorder and soft delete over one list.
//!
//! A manager governs exactly one shared list, one [`OrderedSelection`] and
//! one [`Snapshot`] baseline. It mutates the list in place so every other
//! holder of the same [`SharedList`] sees the change.

mod options;


pub use options::{BatchOptions, ChangeCallback, ItemClass, UpdateCallback};

use crate::commit::CommitPlan;
use crate::coordinator::SaveBar;
use crate::models::Item;
use crate::reorder::{move_selected, MoveOutcome};
use crate::selection::OrderedSelection;
use crate::snapshot::Snapshot;
use crate::CoreError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Ordered list shared between a hosting feature and its manager.
pub type SharedList<T> = Rc<RefCell<Vec<T>>>;

/// Manager handle shared between views, registries and the save coordinator.
pub type SharedManager<T> = Rc<RefCell<BatchManager<T>>>;

/// Key identifying one dirty-state hook on a manager.
pub type HookKey = Uuid;

/// Hook fired after every dirty re-evaluation with the manager id and flag.
///
/// Returns `false` once its owner is gone; the manager then drops it.
pub type ChangeHook = Rc<dyn Fn(ManagerId, bool) -> bool>;

/// Wrap items into a [`SharedList`].
pub fn shared_list<T>(items: Vec<T>) -> SharedList<T> {
    Rc::new(RefCell::new(items))
}

/// Stable identity of a manager instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagerId(Uuid);

impl ManagerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Select/move/delete state machine bound to one list.
pub struct BatchManager<T> {
    id: ManagerId,
    list: SharedList<T>,
    selection: OrderedSelection,
    baseline: Snapshot,
    transient_fields: Vec<String>,
    affordance: Option<SaveBar>,
    on_update: Option<UpdateCallback<T>>,
    on_change: Option<ChangeCallback>,
    hooks: Vec<(HookKey, ChangeHook)>,
}

impl<T: Item> BatchManager<T> {
    /// Bind a manager to `list` and take the initial baseline.
    ///
    /// A list that cannot be serialized is logged and baselined as empty.
    pub fn new(list: SharedList<T>, options: BatchOptions<T>) -> Self {
        let mut manager = Self {
            id: ManagerId::new(),
            list,
            selection: OrderedSelection::new(),
            baseline: Snapshot::default(),
            transient_fields: options.transient_fields,
            affordance: options.affordance,
            on_update: options.on_update,
            on_change: options.on_change,
            hooks: Vec::new(),
        };
        manager.baseline = manager.capture_or_empty();
        manager
    }

    /// Build a manager already wrapped for sharing.
    pub fn shared(list: SharedList<T>, options: BatchOptions<T>) -> SharedManager<T> {
        Rc::new(RefCell::new(Self::new(list, options)))
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    /// Handle to the governed list.
    pub fn list(&self) -> SharedList<T> {
        Rc::clone(&self.list)
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    pub fn selection(&self) -> &OrderedSelection {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// Pick or un-pick `position`. Out-of-range positions are ignored.
    pub fn toggle_select(&mut self, position: usize) {
        if position >= self.len() {
            tracing::debug!(manager = %self.id, position, "toggle_select out of range");
            return;
        }
        self.selection.toggle(position);
        self.notify_update();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.notify_update();
    }

    /// Move every picked item to just after `target`, in pick order.
    ///
    /// Picking a target that is itself selected cancels the move and clears
    /// the selection instead.
    ///
    /// # Returns
    /// What the reorder engine did.
    pub fn move_to(&mut self, target: usize) -> MoveOutcome {
        let outcome = {
            let mut list = self.list.borrow_mut();
            move_selected(&mut *list, self.selection.positions(), target)
        };
        match outcome {
            MoveOutcome::Ignored => {}
            MoveOutcome::Cancelled => {
                tracing::debug!(manager = %self.id, target, "move cancelled inside selection");
                self.clear_selection();
            }
            MoveOutcome::Moved { inserted_at, count } => {
                tracing::debug!(manager = %self.id, target, inserted_at, count, "moved items");
                self.selection.clear();
                self.notify_update();
                self.refresh_dirty();
            }
        }
        outcome
    }

    /// Flip the soft-delete marker at `position`.
    ///
    /// The item stays in the list; a selected item is dropped from the
    /// selection. Out-of-range positions are ignored.
    pub fn toggle_delete(&mut self, position: usize) {
        let flipped = {
            let mut list = self.list.borrow_mut();
            match list.get_mut(position) {
                Some(item) => {
                    let deleted = !item.is_deleted();
                    item.set_deleted(deleted);
                    true
                }
                None => false,
            }
        };
        if !flipped {
            tracing::debug!(manager = %self.id, position, "toggle_delete out of range");
            return;
        }
        self.selection.remove(position);
        self.notify_update();
        self.refresh_dirty();
    }

    pub fn is_deleted(&self, position: usize) -> bool {
        self.list
            .borrow()
            .get(position)
            .map(Item::is_deleted)
            .unwrap_or(false)
    }

    /// Selection rank and delete marker for `position`. Side-effect free.
    pub fn classification_of(&self, position: usize) -> ItemClass {
        ItemClass {
            rank: self.selection.rank_of(position),
            deleted: self.is_deleted(position),
        }
    }

    /// Take a fresh baseline from the current content.
    ///
    /// # Errors
    /// Returns the serialization error and keeps the previous baseline.
    pub fn snapshot(&mut self) -> Result<(), CoreError> {
        self.baseline = self.capture()?;
        Ok(())
    }

    /// Whether current content differs from the baseline.
    ///
    /// Content that cannot be serialized counts as dirty.
    pub fn is_dirty(&self) -> bool {
        match self.capture() {
            Ok(current) => !current.matches(&self.baseline),
            Err(err) => {
                tracing::error!(manager = %self.id, "Snapshot failed: {}", err);
                true
            }
        }
    }

    /// Overwrite the list in place with the baseline and clear the selection.
    ///
    /// # Errors
    /// Returns the deserialization error; the list is left untouched.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        let restored: Vec<T> = self.baseline.restore().map_err(|err| {
            tracing::error!(manager = %self.id, "Reset failed: {}", err);
            err
        })?;
        {
            let mut list = self.list.borrow_mut();
            list.clear();
            list.extend(restored);
        }
        self.selection.clear();
        self.refresh_dirty();
        self.notify_update();
        Ok(())
    }

    /// Full rebind: govern `list`, clear the selection and re-baseline.
    ///
    /// Does not fire the update callback; callers render the new scope.
    pub fn set_list(&mut self, list: SharedList<T>) {
        self.list = list;
        self.selection.clear();
        self.baseline = self.capture_or_empty();
        self.refresh_dirty();
    }

    /// Partial rebind after a reload: keep baseline and selection, drop
    /// picked positions that no longer exist.
    pub fn update_list_reference(&mut self, list: SharedList<T>) {
        self.list = list;
        let len = self.len();
        let dropped = self.selection.retain_in_bounds(len);
        if dropped > 0 {
            tracing::debug!(manager = %self.id, dropped, "pruned stale selection");
        }
    }

    /// Split the list into deletions and surviving order.
    pub fn commit_plan(&self) -> CommitPlan<T> {
        CommitPlan::from_items(self.list.borrow().as_slice())
    }

    /// Physically remove soft-deleted items, in place.
    ///
    /// # Returns
    /// Number of items removed.
    pub fn purge_deleted(&mut self) -> usize {
        let removed = {
            let mut list = self.list.borrow_mut();
            let before = list.len();
            list.retain(|item| !item.is_deleted());
            before - list.len()
        };
        if removed > 0 {
            self.selection.clear();
        }
        removed
    }

    /// Record a successful save: purge deletions, clear the selection and
    /// re-baseline.
    ///
    /// # Errors
    /// Returns the serialization error when the new baseline cannot be taken.
    pub fn mark_committed(&mut self) -> Result<(), CoreError> {
        self.purge_deleted();
        self.selection.clear();
        self.snapshot()?;
        self.refresh_dirty();
        self.notify_update();
        Ok(())
    }

    /// Unified diff of pending changes against the baseline.
    pub fn pending_diff(&self) -> String {
        match self.capture() {
            Ok(current) => self.baseline.diff(&current),
            Err(err) => format!("<unserializable list: {}>", err),
        }
    }

    /// Register a dirty-state hook under `key`.
    ///
    /// # Returns
    /// `false` when a hook with the same key is already present; the
    /// existing hook is kept so it never fires twice.
    pub fn hook_changes(&mut self, key: HookKey, hook: ChangeHook) -> bool {
        if self.hooks.iter().any(|(existing, _)| *existing == key) {
            return false;
        }
        self.hooks.push((key, hook));
        true
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Remove the hook registered under `key`.
    pub fn unhook_changes(&mut self, key: HookKey) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(existing, _)| *existing != key);
        before != self.hooks.len()
    }

    /// Re-evaluate dirtiness and tell the save bar, callback and hooks.
    ///
    /// # Returns
    /// The fresh dirty flag.
    pub fn refresh_dirty(&mut self) -> bool {
        let dirty = self.is_dirty();
        if let Some(bar) = &self.affordance {
            if dirty {
                bar.show();
            } else {
                bar.hide();
            }
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback(dirty);
        }
        let hooks: Vec<(HookKey, ChangeHook)> = self
            .hooks
            .iter()
            .map(|(key, hook)| (*key, Rc::clone(hook)))
            .collect();
        let mut retired = Vec::new();
        for (key, hook) in hooks {
            if !hook(self.id, dirty) {
                retired.push(key);
            }
        }
        if !retired.is_empty() {
            self.hooks.retain(|(key, _)| !retired.contains(key));
            tracing::debug!(manager = %self.id, pruned = retired.len(), "dropped retired hooks");
        }
        dirty
    }

    fn notify_update(&mut self) {
        // Taken out so the callback can borrow the whole manager.
        if let Some(mut callback) = self.on_update.take() {
            callback(self);
            if self.on_update.is_none() {
                self.on_update = Some(callback);
            }
        }
    }

    fn capture(&self) -> Result<Snapshot, CoreError> {
        Snapshot::capture(self.list.borrow().as_slice(), &self.transient_fields)
    }

    fn capture_or_empty(&self) -> Snapshot {
        self.capture().unwrap_or_else(|err| {
            tracing::error!(manager = %self.id, "Snapshot failed: {}", err);
            Snapshot::default()
        })
    }
}
