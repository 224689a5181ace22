//! Storage providers and the selection between them.
//!
//! A provider persists the whole note collection. [`select`] picks the local
//! or the remote provider once, from configuration alone.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Config, RemoteConfig};
use crate::error::Result;
use crate::local::LocalBackend;
use crate::note::Note;
use crate::remote::{PostgrestTable, RemoteBackend, RemoteHandle};
use crate::storage::SlotStore;

/// Where a provider result came from.
///
/// `DegradedFallback` means the remote path failed (or was unavailable) and
/// the value was served by the local backend instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Served by the provider's own medium.
    Primary(T),
    /// Served by the local backend after the remote path failed.
    DegradedFallback(T),
}

impl<T> Outcome<T> {
    /// Discard the origin and return the value.
    pub fn into_inner(self) -> T {
        match self {
            Self::Primary(value) | Self::DegradedFallback(value) => value,
        }
    }

    /// Borrow the value.
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Primary(value) | Self::DegradedFallback(value) => value,
        }
    }

    /// Check whether the value came from the fallback path.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::DegradedFallback(_))
    }

    /// Transform the value, keeping the origin.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Primary(value) => Outcome::Primary(f(value)),
            Self::DegradedFallback(value) => Outcome::DegradedFallback(f(value)),
        }
    }

    /// Mark the value as served by the fallback path.
    #[must_use]
    pub fn degrade(self) -> Self {
        Self::DegradedFallback(self.into_inner())
    }
}

/// The persistence medium a provider targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// The local slot store.
    Local,
    /// The remote table, with local fallback.
    Remote,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// A backend that persists the full note collection.
///
/// Implementations must not surface remote failures as errors. `Err` is
/// reserved for faults of the local slot store, which has nothing below it
/// to fall back to.
#[async_trait]
pub trait NoteProvider: Send + Sync {
    /// The medium this provider targets.
    fn mode(&self) -> StorageMode;

    /// Human-readable name of the active storage, for display only.
    fn describe(&self) -> String;

    /// Read the full collection, in the provider's own order.
    async fn list(&self) -> Result<Outcome<Vec<Note>>>;

    /// Replace the full collection with `notes`.
    async fn save_all(&self, notes: &[Note]) -> Result<Outcome<()>>;
}

/// The provider chosen at startup.
#[derive(Debug)]
pub enum Provider {
    /// Local slot store only.
    Local(LocalBackend),
    /// Remote table with local fallback.
    Remote(RemoteBackend<PostgrestTable>),
}

#[async_trait]
impl NoteProvider for Provider {
    fn mode(&self) -> StorageMode {
        match self {
            Self::Local(local) => local.mode(),
            Self::Remote(remote) => remote.mode(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Local(local) => local.describe(),
            Self::Remote(remote) => remote.describe(),
        }
    }

    async fn list(&self) -> Result<Outcome<Vec<Note>>> {
        match self {
            Self::Local(local) => local.list().await,
            Self::Remote(remote) => remote.list().await,
        }
    }

    async fn save_all(&self, notes: &[Note]) -> Result<Outcome<()>> {
        match self {
            Self::Local(local) => local.save_all(notes).await,
            Self::Remote(remote) => remote.save_all(notes).await,
        }
    }
}

/// The mode configuration selects: remote iff both URL and key are set.
#[must_use]
pub fn mode_for(config: &Config) -> StorageMode {
    if config.remote.is_configured() {
        StorageMode::Remote
    } else {
        StorageMode::Local
    }
}

/// Diagnostic name of the storage configuration selects. Display only.
#[must_use]
pub fn storage_info(config: &Config) -> String {
    match mode_for(config) {
        StorageMode::Local => "Local storage".to_string(),
        StorageMode::Remote => remote_label(&config.remote),
    }
}

/// Build the provider for `config`.
///
/// The local slot store is opened in both modes; the remote provider needs
/// it as its fallback. The remote client itself is not built here but on
/// first use.
///
/// # Errors
///
/// Returns an error if the slot store cannot be opened.
pub fn select(config: &Config) -> Result<Provider> {
    let store = Arc::new(SlotStore::open(config.slot_path())?);
    let local = LocalBackend::new(store, config.storage.slot_key.clone());

    match mode_for(config) {
        StorageMode::Local => {
            info!("Using local storage at {}", config.slot_path().display());
            Ok(Provider::Local(local))
        }
        StorageMode::Remote => {
            let remote = config.remote.clone();
            info!("Using remote table '{}' with local fallback", remote.table);
            let label = remote_label(&remote);
            let handle = RemoteHandle::new(move || PostgrestTable::connect(&remote));
            Ok(Provider::Remote(RemoteBackend::new(handle, local, label)))
        }
    }
}

fn remote_label(remote: &RemoteConfig) -> String {
    format!("Remote ({})", remote.table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.storage.slot_path = Some(dir.path().join("notes.db"));
        config
    }

    #[test]
    fn test_outcome_helpers() {
        let primary = Outcome::Primary(vec![1, 2]);
        assert!(!primary.is_degraded());
        assert_eq!(primary.value().len(), 2);

        let degraded = primary.degrade();
        assert!(degraded.is_degraded());

        let mapped = degraded.map(|v| v.len());
        assert_eq!(mapped, Outcome::DegradedFallback(2));
        assert_eq!(mapped.into_inner(), 2);
    }

    #[test]
    fn test_storage_mode_display() {
        assert_eq!(StorageMode::Local.to_string(), "local");
        assert_eq!(StorageMode::Remote.to_string(), "remote");
    }

    #[test]
    fn test_mode_requires_both_values() {
        let mut config = Config::default();
        assert_eq!(mode_for(&config), StorageMode::Local);

        config.remote.url = Some("https://example.supabase.co".to_string());
        assert_eq!(mode_for(&config), StorageMode::Local);

        config.remote.key = Some("  ".to_string());
        assert_eq!(mode_for(&config), StorageMode::Local);

        config.remote.key = Some("anon-key".to_string());
        assert_eq!(mode_for(&config), StorageMode::Remote);
    }

    #[test]
    fn test_storage_info() {
        let mut config = Config::default();
        assert_eq!(storage_info(&config), "Local storage");

        config.remote.url = Some("https://example.supabase.co".to_string());
        config.remote.key = Some("anon-key".to_string());
        assert_eq!(storage_info(&config), "Remote (notes)");
    }

    #[tokio::test]
    async fn test_select_local() {
        let dir = tempfile::tempdir().unwrap();
        let provider = select(&config_in(&dir)).unwrap();

        assert_eq!(provider.mode(), StorageMode::Local);
        assert_eq!(provider.describe(), "Local storage");
        assert!(matches!(provider, Provider::Local(_)));
        assert!(provider.list().await.unwrap().into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_select_remote_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.remote.url = Some("https://example.supabase.co".to_string());
        config.remote.key = Some("anon-key".to_string());

        let provider = select(&config).unwrap();
        assert_eq!(provider.mode(), StorageMode::Remote);
        assert_eq!(provider.describe(), "Remote (notes)");
        match &provider {
            Provider::Remote(remote) => assert!(!remote.handle().is_initialized()),
            Provider::Local(_) => panic!("expected remote provider"),
        }
    }

    #[tokio::test]
    async fn test_select_remote_with_unusable_endpoint_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.remote.url = Some("not a url".to_string());
        config.remote.key = Some("anon-key".to_string());

        let provider = select(&config).unwrap();
        let listed = provider.list().await.unwrap();
        assert!(listed.is_degraded());
        assert!(listed.into_inner().is_empty());

        let saved = provider.save_all(&[]).await.unwrap();
        assert!(saved.is_degraded());
    }
}
