//! Schema versioning for the slot store.
//!
//! The version lives in the `metadata` table. Each pending step from
//! [`MIGRATIONS`] runs in its own transaction together with the version bump.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, MIGRATIONS};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The schema version this build expects.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Bring the schema up to [`current_version`].
///
/// # Errors
///
/// Returns an error if the stored version is unreadable, newer than this
/// build, or a migration statement fails.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let from = schema_version(conn)?;
    let target = current_version();
    if from > target {
        return Err(Error::DatabaseMigration {
            message: format!("slot store is at version {from}, this build supports {target}"),
        });
    }

    for (version, statements) in MIGRATIONS.iter().filter(|(v, _)| *v > from) {
        let tx = conn.transaction()?;
        for statement in *statements {
            tx.execute(statement, [])?;
        }
        set_schema_version(&tx, *version)?;
        tx.commit()?;
        debug!("Applied slot store migration {}", version);
    }

    Ok(())
}

/// Read the stored schema version; `0` for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
