//! `notesync` - Note storage with a remote table and a local fallback
//!
//! Notes live either in a local key-value slot or in a remote PostgREST
//! table, chosen once at startup from configuration. Remote failures degrade
//! to the local slot instead of surfacing as errors; [`Outcome`] records
//! which one actually served a call.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod note;
pub mod provider;
pub mod remote;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use local::LocalBackend;
pub use logging::init_logging;
pub use note::{Note, NoteDraft, NotePatch};
pub use provider::{NoteProvider, Outcome, Provider, StorageMode};
pub use remote::{PostgrestTable, RemoteBackend, RemoteHandle, RemoteTable};
pub use service::NotesService;
pub use storage::SlotStore;
