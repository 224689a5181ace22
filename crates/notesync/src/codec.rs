//! Conversion between the canonical [`Note`] and the remote row shape.
//!
//! The remote table uses snake_case columns and ISO-8601 timestamp strings.
//! This module is the only place that boundary is crossed.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::note::{Note, NotePatch};

/// Offset-less layouts produced by Postgres `timestamp` columns.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Postgres text output for `timestamptz` (`2024-05-01 10:00:00.5+00`).
const PG_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// A row as returned by the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRow {
    /// Primary key.
    pub id: String,
    /// Title column, nullable.
    #[serde(default)]
    pub title: Option<String>,
    /// Content column, nullable.
    #[serde(default)]
    pub content: Option<String>,
    /// Server-defaulted creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A full row written by insert and upsert. `created_at` is left to the
/// server default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWrite {
    /// Primary key.
    pub id: String,
    /// Title column.
    pub title: String,
    /// Content column.
    pub content: String,
    /// Update timestamp, ISO-8601.
    pub updated_at: String,
}

/// A partial row update. Always stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePatch {
    /// Replacement title, if patched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement content, if patched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Update timestamp, ISO-8601.
    pub updated_at: String,
}

/// Map a remote row into the canonical shape.
///
/// Returns `None` when `row` is absent. Absent or unparseable timestamps stay
/// absent rather than becoming zero.
#[must_use]
pub fn to_canonical(row: Option<RemoteRow>) -> Option<Note> {
    let row = row?;
    Some(Note {
        id: row.id,
        title: row.title.unwrap_or_default(),
        content: row.content.unwrap_or_default(),
        created_at: row.created_at.as_deref().and_then(iso_to_millis),
        updated_at: row.updated_at.as_deref().and_then(iso_to_millis),
    })
}

/// Build a partial update from `patch`, stamped with the current time.
#[must_use]
pub fn to_remote_patch(patch: &NotePatch) -> RemotePatch {
    to_remote_patch_at(patch, Utc::now())
}

/// Build a partial update from `patch`, stamped with `now`.
#[must_use]
pub fn to_remote_patch_at(patch: &NotePatch, now: DateTime<Utc>) -> RemotePatch {
    RemotePatch {
        title: patch.title.clone(),
        content: patch.content.clone(),
        updated_at: format_iso(now),
    }
}

/// Build the row written for `note` on insert or upsert.
///
/// Uses the note's `updatedAt`, or the current time when it is absent.
#[must_use]
pub fn to_remote_row(note: &Note) -> RowWrite {
    RowWrite {
        id: note.id.clone(),
        title: note.title.clone(),
        content: note.content.clone(),
        updated_at: note
            .updated_at
            .and_then(millis_to_iso)
            .unwrap_or_else(|| format_iso(Utc::now())),
    }
}

/// Format epoch milliseconds as ISO-8601 (`2024-05-01T10:00:00.000Z`).
///
/// Returns `None` if the value is outside chrono's representable range.
#[must_use]
pub fn millis_to_iso(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(format_iso)
}

/// Parse a remote timestamp string into epoch milliseconds.
///
/// Accepts RFC 3339 and the Postgres text layouts. Offset-less values are
/// read as UTC.
#[must_use]
pub fn iso_to_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, PG_OFFSET_FORMAT) {
        return Some(dt.timestamp_millis());
    }
    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis())
    })
}

fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
