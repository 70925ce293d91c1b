//! JSON file backing for replayed collections.

use curio_core::{CollectionStore, CoreError, Item, Record};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Load a JSON array of objects.
pub fn load_records(path: &Path) -> Result<Vec<Record>, CoreError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| CoreError::Store(format!("read {}: {}", path.display(), err)))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let serde_json::Value::Array(values) = value else {
        return Err(CoreError::Store(format!(
            "{} must hold a JSON array",
            path.display()
        )));
    };
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Record::from_value(value)
                .map_err(|err| CoreError::Store(format!("item {}: {}", index, err)))
        })
        .collect()
}

/// Collection persisted as one JSON file.
///
/// Deletions apply in memory; the reorder that ends every commit writes the
/// surviving items back in a single atomic replace.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    items: Vec<Record>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, items: Vec<Record>) -> Self {
        Self {
            path: path.into(),
            items,
        }
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    fn persist(&self) -> Result<(), CoreError> {
        let store_err =
            |err: std::io::Error| CoreError::Store(format!("write {}: {}", self.path.display(), err));
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(store_err)?;
        serde_json::to_writer_pretty(&mut tmp, &self.items)?;
        tmp.write_all(b"\n").map_err(store_err)?;
        tmp.as_file().sync_all().map_err(store_err)?;
        tmp.persist(&self.path)
            .map_err(|err| store_err(err.error))?;
        Ok(())
    }
}

impl CollectionStore<Record> for JsonFileStore {
    async fn delete(&mut self, item: &Record) -> Result<(), CoreError> {
        let mut target = item.clone();
        target.set_deleted(false);
        let before = self.items.len();
        match item.identity() {
            Some(id) => self
                .items
                .retain(|stored| stored.identity().as_deref() != Some(id.as_str())),
            None => {
                if let Some(index) = self.items.iter().position(|stored| *stored == target) {
                    self.items.remove(index);
                }
            }
        }
        if self.items.len() == before {
            tracing::warn!(item = %item.label(), "Delete matched nothing in the store");
        }
        Ok(())
    }

    async fn reorder(&mut self, order: &[Record]) -> Result<(), CoreError> {
        self.items = order.to_vec();
        self.persist()?;
        tracing::debug!(path = %self.path.display(), count = order.len(), "persisted order");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_list(dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join("list.json");
        std::fs::write(&path, value.to_string()).expect("write list");
        path
    }

    #[test]
    fn load_rejects_non_arrays_and_non_objects() {
        let dir = TempDir::new().expect("temp dir");
        let object = write_list(&dir, json!({"id": "a"}));
        assert!(load_records(&object).is_err());

        let mixed = write_list(&dir, json!([{"id": "a"}, 3]));
        let err = load_records(&mixed).expect_err("number item");
        assert!(err.to_string().contains("item 1"), "{}", err);
    }

    #[tokio::test]
    async fn reorder_persists_survivors_atomically() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_list(&dir, json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]));
        let items = load_records(&path).expect("load");
        let mut store = JsonFileStore::new(&path, items.clone());

        let mut doomed = items[1].clone();
        doomed.set_deleted(true);
        store.delete(&doomed).await.expect("delete");
        store
            .reorder(&[items[2].clone(), items[0].clone()])
            .await
            .expect("reorder");

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(written, json!([{"id": "c"}, {"id": "a"}]));
        let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn positional_items_are_deleted_by_content() {
        let untitled = Record::new().with("title", "draft");
        let other = Record::new().with("title", "final");
        let mut store = JsonFileStore::new("unused.json", vec![untitled.clone(), other.clone()]);

        let mut marked = untitled;
        marked.set_deleted(true);
        store.delete(&marked).await.expect("delete");

        assert_eq!(store.items(), &[other]);
    }
}
