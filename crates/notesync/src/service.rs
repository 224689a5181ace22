//! The notes domain API.
//!
//! [`NotesService`] owns sort order, default population and timestamp
//! assignment. Every mutation is a whole-collection read-modify-write against
//! the provider it was built with.

use std::cmp::Reverse;

use tracing::{debug, warn};

use crate::error::Result;
use crate::note::{new_id, now_millis, Note, NoteDraft, NotePatch};
use crate::provider::{NoteProvider, Outcome};

/// Notes operations over a single provider.
#[derive(Debug, Clone)]
pub struct NotesService<P> {
    provider: P,
}

impl<P: NoteProvider> NotesService<P> {
    /// Create a service over `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The provider this service reads and writes through.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Diagnostic description of the active storage.
    #[must_use]
    pub fn storage_info(&self) -> String {
        self.provider.describe()
    }

    /// All notes, most recently updated first, with the origin of the read.
    ///
    /// Notes with equal `updatedAt` keep their stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn list_with_origin(&self) -> Result<Outcome<Vec<Note>>> {
        let listed = self.read().await?;
        Ok(listed.map(|mut notes| {
            notes.sort_by_key(|n| Reverse(n.sort_key()));
            notes
        }))
    }

    /// All notes, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn list(&self) -> Result<Vec<Note>> {
        Ok(self.list_with_origin().await?.into_inner())
    }

    /// Create a note from `draft` and prepend it to the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn create(&self, draft: NoteDraft) -> Result<Note> {
        let note = Note::from_draft(new_id(), draft, now_millis());

        let mut notes = self.read().await?.into_inner();
        notes.insert(0, note.clone());
        self.write(&notes).await?;

        debug!(id = %note.id, "Created note");
        Ok(note)
    }

    /// Apply `patch` to the note with `id`. `None` if no such note exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn update(&self, id: &str, patch: &NotePatch) -> Result<Option<Note>> {
        let mut notes = self.read().await?.into_inner();
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            debug!(id, "Update target not found");
            return Ok(None);
        };

        patch.apply_to(note);
        note.touch(now_millis());
        let updated = note.clone();

        self.write(&notes).await?;
        debug!(id, "Updated note");
        Ok(Some(updated))
    }

    /// Remove the note with `id`. Returns whether anything was removed.
    ///
    /// The filtered collection is written back even when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let notes = self.read().await?.into_inner();
        let before = notes.len();
        let kept: Vec<Note> = notes.into_iter().filter(|n| n.id != id).collect();
        let removed = kept.len() != before;

        self.write(&kept).await?;
        debug!(id, removed, "Deleted note");
        Ok(removed)
    }

    /// The note with `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn get(&self, id: &str) -> Result<Option<Note>> {
        let notes = self.read().await?.into_inner();
        Ok(notes.into_iter().find(|n| n.id == id))
    }

    /// Sorted notes whose title or content contains `query`, ignoring case.
    ///
    /// A blank query returns every note.
    ///
    /// # Errors
    ///
    /// Returns an error if the local slot store fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let notes = self.list().await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(notes);
        }
        Ok(notes.into_iter().filter(|n| n.matches(&needle)).collect())
    }

    async fn read(&self) -> Result<Outcome<Vec<Note>>> {
        let listed = self.provider.list().await?;
        if listed.is_degraded() {
            warn!(storage = %self.provider.describe(), "Serving notes from local fallback");
        }
        Ok(listed)
    }

    async fn write(&self, notes: &[Note]) -> Result<()> {
        let saved = self.provider.save_all(notes).await?;
        if saved.is_degraded() {
            warn!(storage = %self.provider.describe(), "Notes saved to local fallback");
        }
        Ok(())
    }
}
