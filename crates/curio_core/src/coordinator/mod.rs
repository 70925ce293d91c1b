//! Cross-manager save coordination.
//!
//! One [`SaveCoordinator`] fronts a single [`SaveBar`] for any number of batch
//! managers. Managers are reached through accessors so the ones created
//! lazily (a tag drawer opened for the first time, say) can join later via
//! [`SaveCoordinator::rehook`].
//!
//! While a commit is pending, both a second commit and a revert are refused;
//! while a revert is pending, a commit is refused.

mod save_bar;


pub use save_bar::SaveBar;

use crate::batch::{BatchManager, ChangeHook, HookKey, ManagerId, SharedManager};
use crate::models::Item;
use crate::CoreError;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Object-safe view of a batch manager used for aggregate dirty checks.
pub trait TrackedManager {
    fn manager_id(&self) -> ManagerId;

    fn is_dirty(&self) -> bool;

    /// Register `hook` under `key`; `false` when the key is already hooked.
    fn hook_changes(&mut self, key: HookKey, hook: ChangeHook) -> bool;

    fn reset(&mut self) -> Result<(), CoreError>;

    fn clear_selection(&mut self);
}

impl<T: Item> TrackedManager for BatchManager<T> {
    fn manager_id(&self) -> ManagerId {
        self.id()
    }

    fn is_dirty(&self) -> bool {
        BatchManager::is_dirty(self)
    }

    fn hook_changes(&mut self, key: HookKey, hook: ChangeHook) -> bool {
        BatchManager::hook_changes(self, key, hook)
    }

    fn reset(&mut self) -> Result<(), CoreError> {
        BatchManager::reset(self)
    }

    fn clear_selection(&mut self) {
        BatchManager::clear_selection(self)
    }
}

/// Shared, type-erased manager handle.
pub type TrackedHandle = Rc<RefCell<dyn TrackedManager>>;

/// Resolves a manager at call time; `None` while it does not exist yet.
pub type ManagerAccessor = Box<dyn Fn() -> Option<TrackedHandle>>;

type LocalFuture<T> = Pin<Box<dyn Future<Output = T>>>;
type JointProcedure = Box<dyn FnMut() -> LocalFuture<Result<(), CoreError>>>;

/// Accessor for a manager that already exists.
pub fn track<T: Item + 'static>(manager: &SharedManager<T>) -> ManagerAccessor {
    let handle: TrackedHandle = manager.clone();
    Box::new(move || Some(Rc::clone(&handle)))
}

/// Address of the manager behind a handle; stable while the handle lives.
type HandleAddress = *const ();

fn handle_address(handle: &TrackedHandle) -> HandleAddress {
    Rc::as_ptr(handle).cast::<()>()
}

/// State pushed by a manager's hook while that manager is borrowed.
#[derive(Debug, Clone, Copy)]
struct Reported {
    address: HandleAddress,
    id: ManagerId,
    dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Committing,
    Reverting,
}

struct CoordinatorState {
    hook_key: HookKey,
    bar: SaveBar,
    accessors: RefCell<Vec<ManagerAccessor>>,
    on_save: RefCell<JointProcedure>,
    on_cancel: RefCell<JointProcedure>,
    phase: Cell<Phase>,
    last_committed_at: Cell<Option<DateTime<Utc>>>,
    /// Last dirty flag seen per manager, read when it is borrowed elsewhere.
    last_seen: RefCell<HashMap<HandleAddress, bool>>,
}

impl CoordinatorState {
    /// Recompute aggregate dirtiness and show/hide the bar.
    ///
    /// A borrowed manager cannot be queried. The notifying one is covered by
    /// its reported flag; any other keeps the last flag seen for it, or
    /// counts as dirty when it was never seen.
    fn refresh(&self, reported: Option<Reported>) -> bool {
        let mut dirty = false;
        {
            let mut last_seen = self.last_seen.borrow_mut();
            let mut live = Vec::new();
            for accessor in self.accessors.borrow().iter() {
                let Some(handle) = accessor() else {
                    continue;
                };
                let address = handle_address(&handle);
                live.push(address);
                let manager_dirty = match handle.try_borrow() {
                    Ok(manager) => manager.is_dirty(),
                    Err(_) => match reported {
                        Some(report) if report.address == address => {
                            tracing::trace!(manager = %report.id, dirty = report.dirty, "using reported state");
                            report.dirty
                        }
                        _ => last_seen.get(&address).copied().unwrap_or(true),
                    },
                };
                last_seen.insert(address, manager_dirty);
                dirty |= manager_dirty;
            }
            last_seen.retain(|address, _| live.contains(address));
        }
        if dirty {
            self.bar.show();
        } else {
            self.bar.hide();
        }
        dirty
    }
}

/// Aggregates dirty state and commit/revert across batch managers.
#[derive(Clone)]
pub struct SaveCoordinator {
    state: Rc<CoordinatorState>,
}

impl SaveCoordinator {
    /// Build a coordinator and hook every manager that already resolves.
    ///
    /// # Arguments
    /// - `bar`: The shared save bar this coordinator drives.
    /// - `accessors`: Manager accessors; lazy ones may resolve to `None`.
    /// - `on_save`: Joint save, typically each manager's own save in turn.
    /// - `on_cancel`: Joint cancel, typically `reset()` on every manager.
    pub fn new<S, SF, C, CF>(
        bar: SaveBar,
        accessors: Vec<ManagerAccessor>,
        mut on_save: S,
        mut on_cancel: C,
    ) -> Self
    where
        S: FnMut() -> SF + 'static,
        SF: Future<Output = Result<(), CoreError>> + 'static,
        C: FnMut() -> CF + 'static,
        CF: Future<Output = Result<(), CoreError>> + 'static,
    {
        let on_save: JointProcedure =
            Box::new(move || -> LocalFuture<Result<(), CoreError>> { Box::pin(on_save()) });
        let on_cancel: JointProcedure =
            Box::new(move || -> LocalFuture<Result<(), CoreError>> { Box::pin(on_cancel()) });
        let coordinator = Self {
            state: Rc::new(CoordinatorState {
                hook_key: Uuid::new_v4(),
                bar,
                accessors: RefCell::new(accessors),
                on_save: RefCell::new(on_save),
                on_cancel: RefCell::new(on_cancel),
                phase: Cell::new(Phase::Idle),
                last_committed_at: Cell::new(None),
                last_seen: RefCell::new(HashMap::new()),
            }),
        };
        coordinator.rehook();
        coordinator
    }

    pub fn bar(&self) -> &SaveBar {
        &self.state.bar
    }

    pub fn is_committing(&self) -> bool {
        self.state.phase.get() == Phase::Committing
    }

    pub fn last_committed_at(&self) -> Option<DateTime<Utc>> {
        self.state.last_committed_at.get()
    }

    /// Add an accessor after construction and hook it if it resolves.
    pub fn add_accessor(&self, accessor: ManagerAccessor) {
        self.state.accessors.borrow_mut().push(accessor);
        self.rehook();
    }

    /// Hook every manager that currently resolves, then re-evaluate.
    ///
    /// Safe to call repeatedly: a manager already hooked by this coordinator
    /// keeps its single hook.
    ///
    /// # Returns
    /// Number of managers hooked by this call.
    pub fn rehook(&self) -> usize {
        let handles: Vec<TrackedHandle> = self
            .state
            .accessors
            .borrow()
            .iter()
            .filter_map(|accessor| accessor())
            .collect();

        let mut hooked = 0;
        for handle in handles {
            let Ok(mut manager) = handle.try_borrow_mut() else {
                tracing::warn!("Skipping hook on a manager that is busy");
                continue;
            };
            let address = handle_address(&handle);
            let weak: Weak<CoordinatorState> = Rc::downgrade(&self.state);
            let hook: ChangeHook = Rc::new(move |id: ManagerId, dirty: bool| {
                let Some(state) = weak.upgrade() else {
                    return false;
                };
                state.refresh(Some(Reported { address, id, dirty }));
                true
            });
            if manager.hook_changes(self.state.hook_key, hook) {
                tracing::debug!(manager = %manager.manager_id(), "hooked manager");
                hooked += 1;
            }
        }
        self.refresh();
        hooked
    }

    /// Recompute aggregate dirtiness and show/hide the bar.
    ///
    /// # Returns
    /// `true` when any resolvable manager is dirty.
    pub fn refresh(&self) -> bool {
        self.state.refresh(None)
    }

    /// Run the joint save, then re-evaluate dirtiness whatever the outcome.
    ///
    /// # Errors
    /// Returns [`CoreError::CommitInFlight`] / [`CoreError::RevertInFlight`]
    /// when another operation is pending, or [`CoreError::SaveFailed`] when
    /// the joint save fails. Managers whose own save did not complete stay
    /// dirty and keep the bar visible.
    pub async fn commit(&self) -> Result<(), CoreError> {
        self.begin(Phase::Committing)?;
        self.state.bar.set_busy(true);

        let pending = {
            let mut on_save = self.state.on_save.borrow_mut();
            on_save()
        };
        let result = pending.await;

        self.state.bar.set_busy(false);
        self.state.phase.set(Phase::Idle);
        let dirty = self.refresh();

        match result {
            Ok(()) => {
                self.state.last_committed_at.set(Some(Utc::now()));
                tracing::info!(still_dirty = dirty, "Joint save completed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(still_dirty = dirty, "Joint save failed: {}", err);
                Err(match err {
                    CoreError::SaveFailed(message) => CoreError::SaveFailed(message),
                    other => CoreError::SaveFailed(other.to_string()),
                })
            }
        }
    }

    /// Run the joint cancel, then re-evaluate dirtiness.
    ///
    /// # Errors
    /// Returns [`CoreError::CommitInFlight`] while a commit is pending, or
    /// [`CoreError::CancelFailed`] when the joint cancel fails.
    pub async fn revert(&self) -> Result<(), CoreError> {
        self.begin(Phase::Reverting)?;

        let pending = {
            let mut on_cancel = self.state.on_cancel.borrow_mut();
            on_cancel()
        };
        let result = pending.await;

        self.state.phase.set(Phase::Idle);
        self.refresh();

        result.map_err(|err| {
            tracing::warn!("Joint cancel failed: {}", err);
            match err {
                CoreError::CancelFailed(message) => CoreError::CancelFailed(message),
                other => CoreError::CancelFailed(other.to_string()),
            }
        })
    }

    fn begin(&self, next: Phase) -> Result<(), CoreError> {
        match self.state.phase.get() {
            Phase::Idle => {
                self.state.phase.set(next);
                Ok(())
            }
            Phase::Committing => {
                tracing::warn!(requested = ?next, "Refused while a commit is in flight");
                Err(CoreError::CommitInFlight)
            }
            Phase::Reverting => {
                tracing::warn!(requested = ?next, "Refused while a revert is in flight");
                Err(CoreError::RevertInFlight)
            }
        }
    }
}
