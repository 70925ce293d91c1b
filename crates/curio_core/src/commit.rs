//! Commit planning and sequential persistence.
//!
//! Soft-deleted items are removed remotely one call at a time, in list order,
//! before a single reorder of the survivors, so the remote side never sees an
//! order that still references a pending deletion.

use crate::models::Item;
use crate::CoreError;
use chrono::{DateTime, Utc};

/// Deletions and surviving order derived from a managed list.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan<T> {
    /// Soft-deleted items, in list order.
    pub deletions: Vec<T>,
    /// Items that survive the commit, in list order.
    pub order: Vec<T>,
}

impl<T: Item> CommitPlan<T> {
    /// Partition `items` by their soft-delete marker.
    pub fn from_items(items: &[T]) -> Self {
        let (deletions, order) = items.iter().cloned().partition(Item::is_deleted);
        Self { deletions, order }
    }

    /// Identities of the items to delete; positional items are skipped.
    pub fn deletion_ids(&self) -> Vec<String> {
        self.deletions.iter().filter_map(Item::identity).collect()
    }
}

/// Summary of an applied [`CommitPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub deleted: usize,
    pub kept: usize,
    pub committed_at: DateTime<Utc>,
}

/// Remote side of a managed collection.
#[allow(async_fn_in_trait)]
pub trait CollectionStore<T> {
    /// Delete one item.
    async fn delete(&mut self, item: &T) -> Result<(), CoreError>;

    /// Persist the full surviving order.
    async fn reorder(&mut self, order: &[T]) -> Result<(), CoreError>;
}

/// Apply `plan` against `store`, awaiting each call before the next.
///
/// # Arguments
/// - `store`: Remote collection.
/// - `plan`: Deletions and surviving order.
///
/// # Returns
/// A [`CommitReport`] once every call succeeded.
///
/// # Errors
/// Returns the first store error; later calls are not attempted.
pub async fn apply_plan<T, S>(store: &mut S, plan: &CommitPlan<T>) -> Result<CommitReport, CoreError>
where
    S: CollectionStore<T>,
{
    for (index, item) in plan.deletions.iter().enumerate() {
        if let Err(err) = store.delete(item).await {
            tracing::warn!(
                completed = index,
                pending = plan.deletions.len() - index,
                "Commit stopped during deletions: {}",
                err
            );
            return Err(err);
        }
    }
    store.reorder(&plan.order).await.map_err(|err| {
        tracing::warn!("Commit stopped during reorder: {}", err);
        err
    })?;

    Ok(CommitReport {
        deleted: plan.deletions.len(),
        kept: plan.order.len(),
        committed_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::test_support::records;

    #[derive(Default)]
    struct RecordingStore {
        calls: Vec<String>,
        fail_on_delete: Option<String>,
    }

    impl CollectionStore<Record> for RecordingStore {
        async fn delete(&mut self, item: &Record) -> Result<(), CoreError> {
            let id = item.identity().unwrap_or_default();
            tokio::task::yield_now().await;
            if self.fail_on_delete.as_deref() == Some(id.as_str()) {
                return Err(CoreError::Store(format!("cannot delete {}", id)));
            }
            self.calls.push(format!("delete:{}", id));
            Ok(())
        }

        async fn reorder(&mut self, order: &[Record]) -> Result<(), CoreError> {
            let ids: Vec<String> = order.iter().filter_map(Item::identity).collect();
            self.calls.push(format!("reorder:{}", ids.join(",")));
            Ok(())
        }
    }

    fn plan_with_deletions() -> CommitPlan<Record> {
        let mut items = records(&["a", "b", "c", "d"]);
        items[1].set_deleted(true);
        items[3].set_deleted(true);
        CommitPlan::from_items(&items)
    }

    #[test]
    fn plan_partitions_by_delete_marker_in_list_order() {
        let plan = plan_with_deletions();
        assert_eq!(plan.deletion_ids(), vec!["b", "d"]);
        let kept: Vec<String> = plan.order.iter().filter_map(Item::identity).collect();
        assert_eq!(kept, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn deletes_run_sequentially_before_reorder() {
        let mut store = RecordingStore::default();
        let report = apply_plan(&mut store, &plan_with_deletions())
            .await
            .expect("apply");

        assert_eq!(store.calls, vec!["delete:b", "delete:d", "reorder:a,c"]);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.kept, 2);
    }

    #[tokio::test]
    async fn first_failure_stops_remaining_calls() {
        let mut store = RecordingStore {
            fail_on_delete: Some("b".to_string()),
            ..RecordingStore::default()
        };
        let err = apply_plan(&mut store, &plan_with_deletions())
            .await
            .expect_err("delete of b fails");

        assert!(matches!(err, CoreError::Store(_)));
        assert!(store.calls.is_empty(), "calls: {:?}", store.calls);
    }
}
