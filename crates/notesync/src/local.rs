//! Local backend: the whole note collection as one JSON document in a slot.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::note::Note;
use crate::provider::{NoteProvider, Outcome, StorageMode};
use crate::storage::SlotStore;

/// Slot name used when none is configured.
pub const DEFAULT_SLOT_KEY: &str = "notes:data";

/// Notes persisted as a JSON array in a single slot.
///
/// Missing or blank slot content, or content that is not a JSON array, reads
/// as an empty collection. Array elements that are not notes are skipped and
/// the rest are kept. Failures of the slot store itself propagate.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: Arc<SlotStore>,
    key: String,
}

impl LocalBackend {
    /// Create a backend over `store`, using the slot named `key`.
    #[must_use]
    pub fn new(store: Arc<SlotStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The slot this backend reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying slot store.
    #[must_use]
    pub fn store(&self) -> &Arc<SlotStore> {
        &self.store
    }

    fn read(&self) -> Result<Vec<Note>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                debug!(slot = %self.key, error = %err, "Slot content is not a JSON array; treating as empty");
                return Ok(Vec::new());
            }
        };

        let notes = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Note>(item) {
                Ok(note) => Some(note),
                Err(err) => {
                    debug!(slot = %self.key, index, error = %err, "Skipping unreadable note");
                    None
                }
            })
            .collect();
        Ok(notes)
    }

    fn write(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        self.store.put(&self.key, &raw)
    }
}

#[async_trait]
impl NoteProvider for LocalBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }

    fn describe(&self) -> String {
        "Local storage".to_string()
    }

    async fn list(&self) -> Result<Outcome<Vec<Note>>> {
        self.read().map(Outcome::Primary)
    }

    async fn save_all(&self, notes: &[Note]) -> Result<Outcome<()>> {
        self.write(notes)?;
        Ok(Outcome::Primary(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> LocalBackend {
        let store = Arc::new(SlotStore::open_in_memory().unwrap());
        LocalBackend::new(store, DEFAULT_SLOT_KEY)
    }

    fn note(id: &str, updated_at: i64) -> Note {
        Note {
            id: id.to_string(),
            title: format!("title {id}"),
            content: String::new(),
            created_at: Some(updated_at),
            updated_at: Some(updated_at),
        }
    }

    #[tokio::test]
    async fn test_list_empty_slot() {
        let local = backend();
        let listed = local.list().await.unwrap();
        assert!(!listed.is_degraded());
        assert!(listed.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_save_all_then_list() {
        let local = backend();
        let notes = vec![note("a", 2), note("b", 1)];
        local.save_all(&notes).await.unwrap();
        assert_eq!(local.list().await.unwrap().into_inner(), notes);
    }

    #[tokio::test]
    async fn test_save_all_replaces_collection() {
        let local = backend();
        local.save_all(&[note("a", 1), note("b", 2)]).await.unwrap();
        local.save_all(&[note("c", 3)]).await.unwrap();

        let ids: Vec<String> = local
            .list()
            .await
            .unwrap()
            .into_inner()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_slot_holds_camel_case_json_array() {
        let local = backend();
        local.save_all(&[note("a", 7)]).await.unwrap();

        let raw = local.store().get(DEFAULT_SLOT_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["updatedAt"], 7);
    }

    #[tokio::test]
    async fn test_corrupt_slot_reads_as_empty() {
        let local = backend();
        for garbage in ["{not json", r#"{"id":"a"}"#, "42", "   ", r#"[1, 2]"#] {
            local.store().put(DEFAULT_SLOT_KEY, garbage).unwrap();
            let listed = local.list().await.unwrap().into_inner();
            assert!(listed.is_empty(), "expected empty for {garbage:?}");
        }
    }

    #[tokio::test]
    async fn test_unreadable_elements_are_skipped() {
        let local = backend();
        local
            .store()
            .put(
                DEFAULT_SLOT_KEY,
                r#"[{"id":"keep-1","title":"Keep","content":"","updatedAt":1},{"id":42,"title":"foreign"},"text",{"id":"keep-2"}]"#,
            )
            .unwrap();

        let listed = local.list().await.unwrap().into_inner();
        let ids: Vec<&str> = listed.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["keep-1", "keep-2"]);
        assert_eq!(listed[0].updated_at, Some(1));
    }

    #[tokio::test]
    async fn test_reads_foreign_notes_without_timestamps() {
        let local = backend();
        local
            .store()
            .put(DEFAULT_SLOT_KEY, r#"[{"id":"x","title":"Hello"}]"#)
            .unwrap();

        let listed = local.list().await.unwrap().into_inner();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Hello");
        assert_eq!(listed[0].updated_at, None);
    }

    #[tokio::test]
    async fn test_custom_slot_key_is_isolated() {
        let store = Arc::new(SlotStore::open_in_memory().unwrap());
        let work = LocalBackend::new(Arc::clone(&store), "work:notes");
        let home = LocalBackend::new(store, DEFAULT_SLOT_KEY);

        work.save_all(&[note("w", 1)]).await.unwrap();
        assert!(home.list().await.unwrap().into_inner().is_empty());
        assert_eq!(work.key(), "work:notes");
    }

    #[test]
    fn test_mode_and_describe() {
        let local = backend();
        assert_eq!(local.mode(), StorageMode::Local);
        assert_eq!(local.describe(), "Local storage");
    }
}
