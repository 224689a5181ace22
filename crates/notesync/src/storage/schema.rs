//! `SQLite` schema for the slot store.

/// Bookkeeping table; holds the schema version. Created before any migration.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// One row per named slot. `value` is an opaque serialized document.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Statements applied by each migration, indexed by target version.
pub const MIGRATIONS: &[(i32, &[&str])] = &[(1, &[CREATE_SLOTS_TABLE])];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_from_one() {
        for (index, (version, statements)) in MIGRATIONS.iter().enumerate() {
            assert_eq!(*version, i32::try_from(index).unwrap() + 1);
            assert!(!statements.is_empty());
        }
    }

    #[test]
    fn test_slots_table_columns() {
        assert!(CREATE_SLOTS_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_SLOTS_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_SLOTS_TABLE.contains("updated_at TEXT NOT NULL"));
    }
}
