//! Core list-editing library for Curio (batch selection, reorder, soft delete,
//! dirty tracking, save coordination and list reconciliation).

/// Batch manager: ordered selection, reorder and soft delete over one list.
pub mod batch;
/// Commit planning and sequential persistence.
pub mod commit;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Cross-manager save coordination and the shared save bar.
pub mod coordinator;
/// Scoped environment overrides for tests.
#[cfg(test)]
pub(crate) mod env;
/// Error types.
pub mod error;
/// Item model and identity keys.
pub mod models;
/// Visual list reconciliation and bulk painting.
pub mod reconcile;
/// One manager per navigable scope.
pub mod registry;
/// Move-to-target reorder engine.
pub mod reorder;
/// Click-ordered selection.
pub mod selection;
/// Serialized baselines for dirty tracking and revert.
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{
    shared_list, BatchManager, BatchOptions, ChangeHook, HookKey, ItemClass, ManagerId,
    SharedList, SharedManager,
};
pub use commit::{apply_plan, CollectionStore, CommitPlan, CommitReport};
pub use config::Config;
pub use constants::{DEFAULT_PAINT_CHUNK, DEFAULT_TRANSIENT_FIELDS};
pub use coordinator::{
    track, ManagerAccessor, SaveBar, SaveCoordinator, TrackedHandle, TrackedManager,
};
pub use error::CoreError;
pub use models::{Item, ItemKey, Record};
pub use reconcile::{
    reconcile, BulkPaint, HeadlessContainer, HeadlessNode, HeadlessRenderer, ItemRenderer,
    ListRenderer, PaintProgress, ReconcileStats, RenderEntry, RenderPass, VisualContainer,
};
pub use registry::{LazyManager, ScopeRegistry};
pub use reorder::{move_selected, MoveOutcome};
pub use selection::OrderedSelection;
pub use snapshot::Snapshot;
