//! Analysis-schema migration ladder.
//!
//! Applied to the same `drift.db` file as `drift-core`'s workspace
//! bookkeeping ladder, tracked with its own `PRAGMA user_version` so the two
//! ladders never collide: drift-core owns versions under its own counter by
//! running first and drift-storage's migrations are additive `CREATE TABLE
//! IF NOT EXISTS` statements, safe to apply in either order.

use drift_core::errors::StorageError;
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const SCHEMA_VERSION_KEY: &str = "drift_analysis_schema_version";

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: r#"
        CREATE TABLE IF NOT EXISTS file_metadata (
            path TEXT PRIMARY KEY,
            language TEXT,
            file_size INTEGER NOT NULL,
            content_hash BLOB NOT NULL,
            last_scanned_revision INTEGER NOT NULL,
            has_parse_errors INTEGER NOT NULL DEFAULT 0,
            function_count INTEGER NOT NULL DEFAULT 0,
            class_count INTEGER NOT NULL DEFAULT 0,
            error TEXT
        ) STRICT;

        CREATE TABLE IF NOT EXISTS parse_cache (
            content_hash BLOB PRIMARY KEY,
            language TEXT NOT NULL,
            tool_version TEXT NOT NULL,
            file_index_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_parse_cache_tool_version ON parse_cache(tool_version);

        CREATE TABLE IF NOT EXISTS functions (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            name TEXT NOT NULL,
            qualified_name TEXT NOT NULL,
            language TEXT NOT NULL,
            line INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            signature_json TEXT NOT NULL,
            return_type TEXT,
            decorators_json TEXT NOT NULL DEFAULT '[]',
            is_exported INTEGER NOT NULL DEFAULT 0,
            is_async INTEGER NOT NULL DEFAULT 0,
            is_entry_point INTEGER NOT NULL DEFAULT 0,
            doc_comment TEXT,
            body_hash BLOB NOT NULL,
            signature_hash BLOB NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_functions_file ON functions(file);
        CREATE INDEX IF NOT EXISTS idx_functions_qualified_name ON functions(qualified_name);

        CREATE TABLE IF NOT EXISTS classes (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            base_types_json TEXT NOT NULL DEFAULT '[]',
            implemented_interfaces_json TEXT NOT NULL DEFAULT '[]',
            properties_json TEXT NOT NULL DEFAULT '[]',
            decorators_json TEXT NOT NULL DEFAULT '[]',
            line INTEGER NOT NULL,
            end_line INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_classes_file ON classes(file);

        CREATE TABLE IF NOT EXISTS call_edges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file TEXT NOT NULL,
            caller_symbol INTEGER NOT NULL,
            callee_symbol INTEGER,
            callee_text TEXT NOT NULL,
            call_site_line INTEGER NOT NULL,
            strategy TEXT NOT NULL,
            confidence REAL NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_call_edges_file ON call_edges(file);
        CREATE INDEX IF NOT EXISTS idx_call_edges_caller ON call_edges(caller_symbol);
        CREATE INDEX IF NOT EXISTS idx_call_edges_callee ON call_edges(callee_symbol);

        CREATE TABLE IF NOT EXISTS patterns (
            pattern_id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            evidence_count INTEGER NOT NULL,
            module_spread INTEGER NOT NULL,
            alpha REAL NOT NULL,
            beta REAL NOT NULL,
            posterior_mean REAL NOT NULL,
            momentum REAL NOT NULL,
            status TEXT NOT NULL,
            confidence_score REAL NOT NULL,
            discovered_at INTEGER NOT NULL,
            last_updated INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_patterns_category ON patterns(category);
        CREATE INDEX IF NOT EXISTS idx_patterns_status ON patterns(status);

        CREATE TABLE IF NOT EXISTS pattern_locations (
            pattern_id TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            column_num INTEGER NOT NULL,
            enclosing_function TEXT,
            enclosing_class TEXT
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_pattern_locations_pattern ON pattern_locations(pattern_id);

        CREATE TABLE IF NOT EXISTS outliers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pattern_id TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            deviation_score REAL NOT NULL,
            significance TEXT NOT NULL,
            method TEXT NOT NULL,
            created_at INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_outliers_pattern ON outliers(pattern_id);

        CREATE TABLE IF NOT EXISTS scans (
            scan_id INTEGER PRIMARY KEY AUTOINCREMENT,
            revision INTEGER NOT NULL,
            root_path TEXT NOT NULL,
            started_at INTEGER NOT NULL,
            completed_at INTEGER,
            total_files INTEGER,
            added_files INTEGER,
            modified_files INTEGER,
            removed_files INTEGER,
            unchanged_files INTEGER,
            partial INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            error TEXT
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_scans_started ON scans(started_at);

        CREATE TABLE IF NOT EXISTS boundaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            framework TEXT NOT NULL,
            table_name TEXT NOT NULL,
            field_name TEXT NOT NULL,
            operation TEXT NOT NULL,
            sensitivity TEXT,
            confidence REAL NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_boundaries_file ON boundaries(file);
        CREATE INDEX IF NOT EXISTS idx_boundaries_sensitivity ON boundaries(sensitivity);

        CREATE TABLE IF NOT EXISTS contracts (
            id TEXT PRIMARY KEY,
            http_method TEXT NOT NULL,
            normalised_path TEXT NOT NULL,
            source_file TEXT NOT NULL,
            framework TEXT NOT NULL,
            backend_fields_json TEXT NOT NULL,
            frontend_fields_json TEXT,
            confidence REAL NOT NULL,
            status TEXT NOT NULL
        ) STRICT;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_contracts_route ON contracts(http_method, normalised_path);
        CREATE INDEX IF NOT EXISTS idx_contracts_status ON contracts(status);

        CREATE TABLE IF NOT EXISTS contract_mismatches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contract_id TEXT NOT NULL,
            field_path TEXT NOT NULL,
            mismatch_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_contract_mismatches_contract ON contract_mismatches(contract_id);

        CREATE TABLE IF NOT EXISTS secrets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider_label TEXT NOT NULL,
            redacted_value TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            severity TEXT NOT NULL,
            entropy REAL NOT NULL,
            confidence REAL NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_secrets_file ON secrets(file);

        CREATE TABLE IF NOT EXISTS coupling_metrics (
            module TEXT PRIMARY KEY,
            ca INTEGER NOT NULL,
            ce INTEGER NOT NULL,
            instability REAL NOT NULL,
            abstractness REAL NOT NULL,
            distance REAL NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS coupling_cycles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            members_json TEXT NOT NULL,
            break_suggestions_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS violations (
            id TEXT PRIMARY KEY,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            column_num INTEGER,
            pattern_id TEXT,
            rule_id TEXT,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            fix_suggestion_json TEXT,
            cwe_ids_json TEXT,
            owasp_category TEXT,
            status TEXT NOT NULL,
            match_key TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_violations_severity ON violations(severity);
        CREATE INDEX IF NOT EXISTS idx_violations_status ON violations(status);
        CREATE INDEX IF NOT EXISTS idx_violations_created ON violations(created_at);

        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            violation_id TEXT NOT NULL,
            rule_id TEXT NOT NULL,
            action TEXT NOT NULL,
            reason TEXT,
            created_at INTEGER NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_feedback_rule ON feedback(rule_id, created_at);

        CREATE TABLE IF NOT EXISTS rule_auto_disabled (
            rule_id TEXT PRIMARY KEY,
            disabled INTEGER NOT NULL DEFAULT 0
        ) STRICT;
    "#,
}];

pub fn apply_pending_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: u32 = conn
        .query_row(
            "SELECT CAST(value AS INTEGER) FROM workspace_config WHERE key = ?1",
            [SCHEMA_VERSION_KEY],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let mut applied_any = false;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.sql)
            .map_err(|e| StorageError::MigrationFailed {
                version: migration.version,
                message: e.to_string(),
            })?;
        applied_any = true;
    }

    if applied_any {
        let latest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
        // `workspace_config` belongs to drift-core's own ladder; it may not
        // exist yet if drift-storage opens the database before drift-core
        // does (e.g. a test harness that only links this crate).
        let _ = conn.execute(
            "CREATE TABLE IF NOT EXISTS workspace_config (
                key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at INTEGER NOT NULL
            )",
            [],
        );
        conn.execute(
            "INSERT INTO workspace_config (key, value, updated_at) VALUES (?1, ?2, 0)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![SCHEMA_VERSION_KEY, latest.to_string()],
        )
        .map_err(|e| StorageError::MigrationFailed {
            version: latest,
            message: e.to_string(),
        })?;
    }

    Ok(())
}

pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_creates_every_table() {
        let conn = Connection::open_in_memory().unwrap();
        apply_pending_migrations(&conn).unwrap();
        for table in ["file_metadata", "functions", "call_edges", "patterns", "violations", "contracts"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_pending_migrations(&conn).unwrap();
        apply_pending_migrations(&conn).unwrap();
    }
}
