//! Shared test-only helpers for curio_core.

use crate::batch::{shared_list, SharedList};
use crate::models::{Item, Record};
use serde::{Deserialize, Serialize};

/// Build id-keyed records whose ids double as titles.
pub(crate) fn records(ids: &[&str]) -> Vec<Record> {
    ids.iter()
        .map(|id| Record::new().with("id", *id).with("title", *id))
        .collect()
}

/// Shared list of id-keyed records.
pub(crate) fn shared_records(ids: &[&str]) -> SharedList<Record> {
    shared_list(records(ids))
}

/// Current identities in list order.
///
/// # Panics
/// Panics when an item has no identity.
pub(crate) fn ids_of<T: Item>(list: &SharedList<T>) -> Vec<String> {
    list.borrow()
        .iter()
        .map(|item| item.identity().expect("fixture items carry ids"))
        .collect()
}

/// Typed item used to exercise the [`Item`] trait outside of [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Track {
    pub id: u32,
    pub title: String,
    #[serde(default, rename = "_deleted", skip_serializing_if = "is_false")]
    pub deleted: bool,
    #[serde(default, rename = "domElement", skip_serializing_if = "Option::is_none")]
    pub dom_element: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Track {
    pub(crate) fn new(id: u32, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            deleted: false,
            dom_element: None,
        }
    }
}

impl Item for Track {
    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}
