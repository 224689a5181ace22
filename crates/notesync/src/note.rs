//! Core note types for notesync.
//!
//! [`Note`] is the canonical shape used everywhere above the remote backend:
//! flat fields, camelCase when serialized, timestamps in epoch milliseconds.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Title given to notes created without one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A single note.
///
/// Timestamps are optional because rows read from the remote table may lack
/// them. An absent timestamp is distinct from a real zero and sorts as `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque unique identifier, immutable after creation.
    pub id: String,

    /// Note title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Note body.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    /// Creation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Last modification time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Note {
    /// Build a new note from a draft, applying defaults.
    ///
    /// An absent or empty title becomes [`DEFAULT_TITLE`]; absent content
    /// becomes the empty string. Both timestamps are set to `now`.
    #[must_use]
    pub fn from_draft(id: String, draft: NoteDraft, now: i64) -> Self {
        let title = draft
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Self {
            id,
            title,
            content: draft.content.unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// The `updatedAt` value used for ordering, `0` when absent.
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        self.updated_at.unwrap_or(0)
    }

    /// Stamp a modification time.
    ///
    /// Never moves `updated_at` below the existing `created_at` or
    /// `updated_at`, so the ordering invariant survives a clock step.
    pub fn touch(&mut self, now: i64) {
        let floor = self
            .updated_at
            .into_iter()
            .chain(self.created_at)
            .max()
            .unwrap_or(i64::MIN);
        self.updated_at = Some(now.max(floor));
    }

    /// Case-insensitive substring match on title or content.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

/// Fields supplied when creating a note. Absent fields get defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Initial title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Initial content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NoteDraft {
    /// An empty draft; the note gets the default title and empty content.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// A partial update. Only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Check whether the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Merge the present fields over `note`. Timestamps are left alone.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a fresh note identifier (UUID v4, hyphenated).
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
