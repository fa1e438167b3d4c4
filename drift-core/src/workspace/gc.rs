//! Garbage collection plus workspace-event
//! retention. Runs after retention purges; a full rebuild only when the
//! free-page ratio justifies it, otherwise a cheap WAL checkpoint.

use rusqlite::Connection;

use super::errors::WorkspaceResult;

#[derive(Debug, Clone)]
pub struct GcOptions {
    pub event_retention_days: u32,
    pub dry_run: bool,
}

impl Default for GcOptions {
    fn default() -> Self {
        Self {
            event_retention_days: 90,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GcReport {
    pub old_events_deleted: u64,
    pub freelist_pages_before: u64,
    pub freelist_pages_after: u64,
    pub rebuilt: bool,
    pub wal_checkpointed: bool,
    pub duration_ms: u64,
}

/// Run garbage collection.
/// if free-page ratio exceeds 20%, otherwise checkpoint the WAL.
pub fn garbage_collect(conn: &Connection, opts: &GcOptions) -> WorkspaceResult<GcReport> {
    let start = std::time::Instant::now();
    let mut report = GcReport::default();

    let page_count: u64 = conn.pragma_query_value(None, "page_count", |row| row.get(0))?;
    report.freelist_pages_before = conn.pragma_query_value(None, "freelist_count", |row| row.get(0))?;

    let cutoff_epoch_seconds =
        (chrono_now_seconds()).saturating_sub(opts.event_retention_days as i64 * 86_400);

    if opts.dry_run {
        report.old_events_deleted = conn.query_row(
            "SELECT COUNT(*) FROM workspace_events WHERE created_at < ?1",
            [cutoff_epoch_seconds],
            |row| row.get(0),
        )?;
        report.freelist_pages_after = report.freelist_pages_before;
        report.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(report);
    }

    report.old_events_deleted = conn.execute(
        "DELETE FROM workspace_events WHERE created_at < ?1",
        [cutoff_epoch_seconds],
    )? as u64;

    let free_ratio = if page_count == 0 {
        0.0
    } else {
        report.freelist_pages_before as f64 / page_count as f64
    };

    if free_ratio > 0.20 {
        conn.execute_batch("VACUUM;")?;
        report.rebuilt = true;
    } else {
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        report.wal_checkpointed = true;
    }

    report.freelist_pages_after = conn.pragma_query_value(None, "freelist_count", |row| row.get(0))?;
    report.duration_ms = start.elapsed().as_millis() as u64;
    Ok(report)
}

/// Seconds since the Unix epoch. Isolated behind a function so callers in
/// the analysis crates can stamp timestamps from a single, injectable
/// clock rather than each calling `SystemTime::now()` directly.
fn chrono_now_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::migration::initialize_workspace_db;

    #[test]
    fn dry_run_reports_without_deleting() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO workspace_events (event_type, created_at) VALUES ('x', 0)",
            [],
        )
        .unwrap();

        let report = garbage_collect(&conn, &GcOptions { dry_run: true, ..Default::default() }).unwrap();
        assert_eq!(report.old_events_deleted, 1);
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM workspace_events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn live_run_deletes_stale_events() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO workspace_events (event_type, created_at) VALUES ('x', 0)",
            [],
        )
        .unwrap();

        garbage_collect(&conn, &GcOptions::default()).unwrap();
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM workspace_events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
