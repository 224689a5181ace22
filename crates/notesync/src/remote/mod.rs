//! Remote backend: notes in a relational table, with local fallback.
//!
//! [`RemoteTable`] is the transport seam; [`PostgrestTable`] speaks the
//! PostgREST dialect. [`RemoteBackend`] layers fallback and reconciliation on
//! top. Remote failures are logged here and never returned to callers.

#[cfg(test)]
pub(crate) mod memory;
mod postgrest;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::codec::{to_canonical, to_remote_patch, to_remote_row, RemotePatch, RemoteRow, RowWrite};
use crate::error::Result;
use crate::local::LocalBackend;
use crate::note::{Note, NotePatch};
use crate::provider::{NoteProvider, Outcome, StorageMode};

pub use postgrest::PostgrestTable;

/// Row-level access to the remote `notes` table, keyed by `id`.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// All rows, most recently updated first.
    async fn select_all(&self) -> Result<Vec<RemoteRow>>;

    /// Insert one row and return it as stored.
    async fn insert(&self, row: &RowWrite) -> Result<RemoteRow>;

    /// Patch the row with `id`. `Ok(None)` when no row matched.
    async fn update(&self, id: &str, patch: &RemotePatch) -> Result<Option<RemoteRow>>;

    /// Delete the row with `id`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Insert or replace `rows`, resolving conflicts on `id`.
    async fn upsert(&self, rows: &[RowWrite]) -> Result<()>;

    /// The ids of all rows.
    async fn select_ids(&self) -> Result<Vec<String>>;

    /// Delete every row whose id is in `ids`.
    async fn delete_many(&self, ids: &[String]) -> Result<()>;
}

type Connector<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// A remote client built on first use, at most once.
///
/// If construction fails the failure is logged once and the handle stays
/// unavailable for its whole lifetime; there is no retry.
pub struct RemoteHandle<T> {
    cell: OnceCell<Option<Arc<T>>>,
    connect: Connector<T>,
}

impl<T: RemoteTable> RemoteHandle<T> {
    /// Create a handle that runs `connect` the first time it is needed.
    pub fn new(connect: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            connect: Box::new(connect),
        }
    }

    /// The client, constructing it on first call. `None` if construction
    /// failed, now or on an earlier call.
    pub async fn get(&self) -> Option<Arc<T>> {
        self.cell
            .get_or_init(|| async {
                match (self.connect)() {
                    Ok(table) => {
                        info!("Remote table client ready");
                        Some(Arc::new(table))
                    }
                    Err(err) => {
                        error!(error = %err, "Remote client unavailable; local storage will be used for this session");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Check whether construction has been attempted.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> std::fmt::Debug for RemoteHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Some(_)) => "ready",
            Some(None) => "unavailable",
        };
        f.debug_struct("RemoteHandle").field("state", &state).finish()
    }
}

/// Notes stored in a remote table, falling back to a [`LocalBackend`].
#[derive(Debug)]
pub struct RemoteBackend<T> {
    handle: RemoteHandle<T>,
    local: LocalBackend,
    label: String,
}

impl<T: RemoteTable> RemoteBackend<T> {
    /// Create a remote backend. `label` is the diagnostic name reported by
    /// [`NoteProvider::describe`].
    #[must_use]
    pub fn new(handle: RemoteHandle<T>, local: LocalBackend, label: impl Into<String>) -> Self {
        Self {
            handle,
            local,
            label: label.into(),
        }
    }

    /// The lazily-built client handle.
    #[must_use]
    pub fn handle(&self) -> &RemoteHandle<T> {
        &self.handle
    }

    /// The fallback backend.
    #[must_use]
    pub fn local(&self) -> &LocalBackend {
        &self.local
    }

    /// Insert a single note. `None` if the remote is unavailable or the
    /// insert failed.
    pub async fn create(&self, note: &Note) -> Option<Note> {
        let table = self.handle.get().await?;
        match table.insert(&to_remote_row(note)).await {
            Ok(row) => to_canonical(Some(row)),
            Err(err) => {
                error!(id = %note.id, error = %err, "Remote create failed");
                None
            }
        }
    }

    /// Patch the title and/or content of one note, stamping `updated_at`.
    /// `None` if the remote is unavailable, nothing matched, or the update
    /// failed.
    pub async fn update(&self, id: &str, patch: &NotePatch) -> Option<Note> {
        let table = self.handle.get().await?;
        match table.update(id, &to_remote_patch(patch)).await {
            Ok(row) => to_canonical(row),
            Err(err) => {
                error!(id, error = %err, "Remote update failed");
                None
            }
        }
    }

    /// Delete one note. `false` if the remote is unavailable or the delete
    /// failed.
    pub async fn remove(&self, id: &str) -> bool {
        let Some(table) = self.handle.get().await else {
            return false;
        };
        match table.delete(id).await {
            Ok(()) => true,
            Err(err) => {
                error!(id, error = %err, "Remote delete failed");
                false
            }
        }
    }

    /// Make the remote table hold exactly `notes`: upsert all of them, then
    /// delete every row whose id is not among them.
    async fn reconcile(table: &T, notes: &[Note]) -> Result<()> {
        if !notes.is_empty() {
            let rows: Vec<RowWrite> = notes.iter().map(to_remote_row).collect();
            table.upsert(&rows).await?;
        }

        let keep: HashSet<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        let stale: Vec<String> = table
            .select_ids()
            .await?
            .into_iter()
            .filter(|id| !keep.contains(id.as_str()))
            .collect();

        if !stale.is_empty() {
            table.delete_many(&stale).await?;
            debug!("Deleted {} stale remote rows", stale.len());
        }
        Ok(())
    }
}

#[async_trait]
impl<T: RemoteTable> NoteProvider for RemoteBackend<T> {
    fn mode(&self) -> StorageMode {
        StorageMode::Remote
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn list(&self) -> Result<Outcome<Vec<Note>>> {
        let Some(table) = self.handle.get().await else {
            return Ok(self.local.list().await?.degrade());
        };
        match table.select_all().await {
            Ok(rows) => Ok(Outcome::Primary(
                rows.into_iter()
                    .filter_map(|row| to_canonical(Some(row)))
                    .collect(),
            )),
            Err(err) => {
                error!(error = %err, "Remote list failed; falling back to local storage");
                Ok(self.local.list().await?.degrade())
            }
        }
    }

    async fn save_all(&self, notes: &[Note]) -> Result<Outcome<()>> {
        let Some(table) = self.handle.get().await else {
            return Ok(self.local.save_all(notes).await?.degrade());
        };
        match Self::reconcile(&table, notes).await {
            Ok(()) => Ok(Outcome::Primary(())),
            Err(err) => {
                error!(error = %err, "Remote save failed; falling back to local storage");
                Ok(self.local.save_all(notes).await?.degrade())
            }
        }
    }
}
