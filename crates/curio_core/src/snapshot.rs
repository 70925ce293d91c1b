//! Serialized baselines for dirty tracking and revert.
//!
//! A [`Snapshot`] is the canonical JSON form of a list with transient fields
//! stripped at every depth. Object keys serialize in sorted order, so two
//! lists with equal content always produce equal canonical text; the
//! fingerprint is a `blake3` hash of that text.

use crate::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use similar::TextDiff;

const EMPTY_LIST: &str = "[]";

/// Immutable serialized copy of a list's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    canonical: String,
    fingerprint: blake3::Hash,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::from_canonical(EMPTY_LIST.to_string())
    }
}

impl Snapshot {
    /// Serialize `items`, dropping any field named in `transient`.
    ///
    /// # Arguments
    /// - `items`: List content to capture.
    /// - `transient`: Field names excluded at every nesting level.
    ///
    /// # Returns
    /// The captured snapshot.
    ///
    /// # Errors
    /// Returns [`CoreError::Serialization`] when an item cannot be represented
    /// as JSON (for example a map with non-string keys).
    pub fn capture<T: Serialize>(items: &[T], transient: &[String]) -> Result<Self, CoreError> {
        let mut value = serde_json::to_value(items)?;
        strip_transient(&mut value, transient);
        Ok(Self::from_canonical(serde_json::to_string(&value)?))
    }

    fn from_canonical(canonical: String) -> Self {
        let fingerprint = blake3::hash(canonical.as_bytes());
        Self {
            canonical,
            fingerprint,
        }
    }

    /// Canonical JSON text.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn fingerprint(&self) -> blake3::Hash {
        self.fingerprint
    }

    /// Whether `other` captures the same content.
    pub fn matches(&self, other: &Snapshot) -> bool {
        self.fingerprint == other.fingerprint
    }

    /// Deserialize the captured content back into items.
    ///
    /// Transient fields are absent from the result; item types must default
    /// them for the restore to succeed.
    ///
    /// # Errors
    /// Returns [`CoreError::Serialization`] when the canonical text no longer
    /// fits `T`.
    pub fn restore<T: DeserializeOwned>(&self) -> Result<Vec<T>, CoreError> {
        Ok(serde_json::from_str(&self.canonical)?)
    }

    /// Line diff from this snapshot to `current`, pretty-printed.
    ///
    /// # Returns
    /// A unified diff, or an empty string when the contents match.
    pub fn diff(&self, current: &Snapshot) -> String {
        if self.matches(current) {
            return String::new();
        }
        let before = pretty(&self.canonical);
        let after = pretty(&current.canonical);
        TextDiff::from_lines(&before, &after)
            .unified_diff()
            .context_radius(2)
            .header("baseline", "current")
            .to_string()
    }
}

fn pretty(canonical: &str) -> String {
    let mut text = serde_json::from_str::<Value>(canonical)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| canonical.to_string());
    text.push('\n');
    text
}

fn strip_transient(value: &mut Value, transient: &[String]) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !transient.iter().any(|field| field == key));
            for nested in map.values_mut() {
                strip_transient(nested, transient);
            }
        }
        Value::Array(values) => {
            for nested in values {
                strip_transient(nested, transient);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, Record};
    use crate::test_support::{records, Track};
    use serde_json::json;

    fn transient() -> Vec<String> {
        vec!["parent".to_string(), "domElement".to_string()]
    }

    #[test]
    fn default_snapshot_is_an_empty_list() {
        let empty: Vec<Record> = Vec::new();
        let captured = Snapshot::capture(&empty, &transient()).expect("capture");
        assert!(captured.matches(&Snapshot::default()));
        assert_eq!(Snapshot::default().canonical(), "[]");
    }

    #[test]
    fn transient_fields_are_stripped_at_every_depth() {
        let record = Record::from_value(json!({
            "id": "a",
            "parent": {"id": "root"},
            "children": [{"id": "b", "domElement": "<li>", "parent": "a"}]
        }))
        .expect("record");

        let snapshot = Snapshot::capture(&[record], &transient()).expect("capture");
        assert_eq!(snapshot.canonical(), r#"[{"children":[{"id":"b"}],"id":"a"}]"#);
    }

    #[test]
    fn transient_changes_do_not_affect_fingerprint() {
        let mut track = Track::new(1, "Intro");
        let before = Snapshot::capture(&[track.clone()], &transient()).expect("capture");
        track.dom_element = Some("row-1".to_string());
        let after = Snapshot::capture(&[track], &transient()).expect("capture");
        assert!(before.matches(&after));
    }

    #[test]
    fn restore_round_trips_typed_items_without_transients() {
        let mut track = Track::new(7, "Outro");
        track.dom_element = Some("row-7".to_string());
        track.set_deleted(true);

        let snapshot = Snapshot::capture(&[track], &transient()).expect("capture");
        let restored: Vec<Track> = snapshot.restore().expect("restore");
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].title, "Outro");
        assert!(restored[0].deleted);
        assert_eq!(restored[0].dom_element, None);
    }

    #[test]
    fn diff_is_empty_for_matching_content_and_marks_changes_otherwise() {
        let before = Snapshot::capture(&records(&["a", "b"]), &transient()).expect("capture");
        let same = Snapshot::capture(&records(&["a", "b"]), &transient()).expect("capture");
        assert!(before.diff(&same).is_empty());

        let after = Snapshot::capture(&records(&["b", "a"]), &transient()).expect("capture");
        let diff = before.diff(&after);
        assert!(diff.contains("--- baseline"), "diff: {}", diff);
        assert!(diff.contains("+++ current"), "diff: {}", diff);
        assert!(diff.lines().any(|line| line.starts_with('-')));
        assert!(diff.lines().any(|line| line.starts_with('+')));
    }
}
