//! Workspace bookkeeping schema and migration ladder.
//!
//! This is the *workspace* schema — project registry, backup registry,
//! lock/event bookkeeping — tracked via `PRAGMA user_version` exactly like
//! the analysis schema (functions, call_edges, patterns, violations,...),
//! which is a separate migration ladder owned by `drift-storage`, applied
//! to the same database file. Both ladders
//! are append-only and never remove or renumber a prior entry.

use rusqlite::Connection;

use super::errors::WorkspaceResult;

/// One migration step: raw SQL applied atomically when upgrading from the
/// previous version to this one. Entries are never reordered or deleted.
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: r#"
            CREATE TABLE IF NOT EXISTS workspace_config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            ) STRICT;

            CREATE TABLE IF NOT EXISTS project_registry (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                root_path TEXT NOT NULL UNIQUE,
                drift_path TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_accessed_at INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 0
            ) STRICT;

            CREATE UNIQUE INDEX IF NOT EXISTS idx_project_active
                ON project_registry(is_active) WHERE is_active = 1;

            CREATE TABLE IF NOT EXISTS backup_registry (
                id TEXT PRIMARY KEY,
                reason TEXT NOT NULL,
                tier TEXT NOT NULL DEFAULT 'operational',
                created_at INTEGER NOT NULL,
                db_size_bytes INTEGER NOT NULL,
                schema_version INTEGER NOT NULL,
                tool_version TEXT NOT NULL,
                backup_path TEXT NOT NULL,
                integrity_verified INTEGER NOT NULL DEFAULT 0
            ) STRICT;

            CREATE INDEX IF NOT EXISTS idx_backup_created ON backup_registry(created_at);
            CREATE INDEX IF NOT EXISTS idx_backup_tier ON backup_registry(tier);

            CREATE TABLE IF NOT EXISTS workspace_context (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            ) STRICT;

            CREATE TABLE IF NOT EXISTS workspace_packages (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                path TEXT NOT NULL UNIQUE,
                language TEXT,
                framework TEXT,
                dependencies_json TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL
            ) STRICT;

            CREATE TABLE IF NOT EXISTS workspace_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type TEXT NOT NULL,
                details_json TEXT,
                created_at INTEGER NOT NULL
            ) STRICT;

            CREATE INDEX IF NOT EXISTS idx_events_type ON workspace_events(event_type);
            CREATE INDEX IF NOT EXISTS idx_events_created ON workspace_events(created_at);
        "#,
    },
];

/// Open or initialize a workspace database connection: set every pragma
pub fn initialize_workspace_db(conn: &Connection) -> WorkspaceResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA mmap_size = 268435456;
        PRAGMA temp_store = MEMORY;
        ",
    )?;

    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.sql)?;
        conn.pragma_update(None, "user_version", migration.version)?;
    }
    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> WorkspaceResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_lands_on_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), latest_schema_version());
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        initialize_workspace_db(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM workspace_config", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
