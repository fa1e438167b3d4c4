//! Project registry bookkeeping: a lightweight multi-project switching
//! convenience for consumer surfaces that manage several workspaces from
//! one process.

use rusqlite::{Connection, OptionalExtension};

use super::errors::WorkspaceResult;

#[derive(Debug, Clone)]
pub struct ProjectRegistryEntry {
    pub id: String,
    pub name: String,
    pub root_path: String,
    pub drift_path: String,
    pub is_active: bool,
}

pub fn generate_project_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("proj-{nanos:x}")
}

pub fn register_project(
    conn: &Connection,
    id: &str,
    name: &str,
    root_path: &str,
    drift_path: &str,
    now: i64,
) -> WorkspaceResult<()> {
    conn.execute(
        "INSERT INTO project_registry (id, name, root_path, drift_path, created_at, last_accessed_at, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, 0)
         ON CONFLICT(root_path) DO UPDATE SET last_accessed_at = excluded.last_accessed_at",
        rusqlite::params![id, name, root_path, drift_path, now],
    )?;
    Ok(())
}

pub fn list_projects(conn: &Connection) -> WorkspaceResult<Vec<ProjectRegistryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, root_path, drift_path, is_active FROM project_registry ORDER BY last_accessed_at DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ProjectRegistryEntry {
                id: row.get(0)?,
                name: row.get(1)?,
                root_path: row.get(2)?,
                drift_path: row.get(3)?,
                is_active: row.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_active_project(conn: &Connection) -> WorkspaceResult<Option<ProjectRegistryEntry>> {
    let entry = conn
        .query_row(
            "SELECT id, name, root_path, drift_path, is_active FROM project_registry WHERE is_active = 1",
            [],
            |row| {
                Ok(ProjectRegistryEntry {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    root_path: row.get(2)?,
                    drift_path: row.get(3)?,
                    is_active: row.get::<_, i64>(4)? != 0,
                })
            },
        )
        .optional()?;
    Ok(entry)
}

/// Switch the active project by id or unambiguous name prefix.
pub fn switch_project(conn: &Connection, identifier: &str) -> WorkspaceResult<ProjectRegistryEntry> {
    let target = conn
        .query_row(
            "SELECT id, name, root_path, drift_path, is_active FROM project_registry
             WHERE id = ?1 OR name = ?1",
            [identifier],
            |row| {
                Ok(ProjectRegistryEntry {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    root_path: row.get(2)?,
                    drift_path: row.get(3)?,
                    is_active: row.get::<_, i64>(4)? != 0,
                })
            },
        )
        .optional()?;

    let target = match target {
        Some(t) => t,
        None => {
            return Err(super::errors::WorkspaceError::NotInitialized);
        }
    };

    conn.execute("UPDATE project_registry SET is_active = 0", [])?;
    conn.execute(
        "UPDATE project_registry SET is_active = 1 WHERE id = ?1",
        [&target.id],
    )?;
    Ok(target)
}
