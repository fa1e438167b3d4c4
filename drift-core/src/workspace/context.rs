//! Event-driven context refresh — a small key/value cache of workspace
//! facts (detected languages/frameworks, project name) that consumer
//! surfaces read without re-running detection on every call. Refreshed
//! whenever `workspace_init` or a scan changes the underlying facts, never
//! interpolated lazily — "zero staleness" means the cache is only ever
//! written by the event that changed the fact it holds.

use rusqlite::{Connection, OptionalExtension};

use super::errors::WorkspaceResult;

pub fn set_context(conn: &Connection, key: &str, value: &str, now: i64) -> WorkspaceResult<()> {
    conn.execute(
        "INSERT INTO workspace_context (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value, now],
    )?;
    Ok(())
}

pub fn get_context(conn: &Connection, key: &str) -> WorkspaceResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM workspace_context WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

/// Refresh the cached languages/frameworks facts. Called once at the end
/// of `workspace_init` and again whenever a scan's detected set changes.
pub fn refresh_workspace_context(
    conn: &Connection,
    languages: &[String],
    frameworks: &[String],
    now: i64,
) -> WorkspaceResult<()> {
    set_context(
        conn,
        "languages",
        &serde_json::to_string(languages).unwrap_or_else(|_| "[]".into()),
        now,
    )?;
    set_context(
        conn,
        "frameworks",
        &serde_json::to_string(frameworks).unwrap_or_else(|_| "[]".into()),
        now,
    )?;
    Ok(())
}
