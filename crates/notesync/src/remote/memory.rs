//! In-process [`RemoteTable`] with failure injection, for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::RemoteTable;
use crate::codec::{iso_to_millis, RemotePatch, RemoteRow, RowWrite};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct State {
    rows: Vec<RemoteRow>,
    failing: HashSet<&'static str>,
    fail_all: bool,
    calls: Vec<&'static str>,
}

/// A shared, clonable table. Clones see the same rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTable {
    state: Arc<Mutex<State>>,
}

impl MemoryTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(rows: Vec<RemoteRow>) -> Self {
        let table = Self::new();
        table.state.lock().unwrap().rows = rows;
        table
    }

    /// Snapshot of the stored rows, in storage order.
    pub(crate) fn rows(&self) -> Vec<RemoteRow> {
        self.state.lock().unwrap().rows.clone()
    }

    /// Operations invoked so far, in order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Make one operation fail from now on.
    pub(crate) fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    /// Make every operation fail from now on.
    pub(crate) fn fail_all(&self) {
        self.state.lock().unwrap().fail_all = true;
    }

    fn enter(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if state.fail_all || state.failing.contains(operation) {
            return Err(Error::RemoteStatus {
                operation,
                status: 503,
                body: "injected failure".to_string(),
            });
        }
        Ok(state)
    }
}

fn stored(row: &RowWrite, created_at: Option<String>) -> RemoteRow {
    RemoteRow {
        id: row.id.clone(),
        title: Some(row.title.clone()),
        content: Some(row.content.clone()),
        created_at: created_at.or_else(|| Some(row.updated_at.clone())),
        updated_at: Some(row.updated_at.clone()),
    }
}

#[async_trait]
impl RemoteTable for MemoryTable {
    async fn select_all(&self) -> Result<Vec<RemoteRow>> {
        let state = self.enter("select_all")?;
        let mut rows = state.rows.clone();
        rows.sort_by_key(|r| {
            std::cmp::Reverse(r.updated_at.as_deref().and_then(iso_to_millis).unwrap_or(0))
        });
        Ok(rows)
    }

    async fn insert(&self, row: &RowWrite) -> Result<RemoteRow> {
        let mut state = self.enter("insert")?;
        if state.rows.iter().any(|r| r.id == row.id) {
            return Err(Error::RemoteStatus {
                operation: "insert",
                status: 409,
                body: "duplicate key".to_string(),
            });
        }
        let inserted = stored(row, None);
        state.rows.push(inserted.clone());
        Ok(inserted)
    }

    async fn update(&self, id: &str, patch: &RemotePatch) -> Result<Option<RemoteRow>> {
        let mut state = self.enter("update")?;
        let Some(existing) = state.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            existing.title = Some(title.clone());
        }
        if let Some(content) = &patch.content {
            existing.content = Some(content.clone());
        }
        existing.updated_at = Some(patch.updated_at.clone());
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.enter("delete")?;
        state.rows.retain(|r| r.id != id);
        Ok(())
    }

    async fn upsert(&self, rows: &[RowWrite]) -> Result<()> {
        let mut state = self.enter("upsert")?;
        for row in rows {
            match state.rows.iter_mut().find(|r| r.id == row.id) {
                Some(existing) => {
                    let created_at = existing.created_at.take();
                    *existing = stored(row, created_at);
                }
                None => state.rows.push(stored(row, None)),
            }
        }
        Ok(())
    }

    async fn select_ids(&self) -> Result<Vec<String>> {
        let state = self.enter("select_ids")?;
        Ok(state.rows.iter().map(|r| r.id.clone()).collect())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut state = self.enter("delete_many")?;
        state.rows.retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}
