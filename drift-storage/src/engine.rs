//! `DriftStorageEngine` — the single concrete type implementing every
//! storage trait `drift-core` declares.
//!
//! Owns a `DatabaseManager` (write connection + reader pool) and a
//! `BatchWriter` (async batch writes via the channel-fed writer thread).
//! Synchronous trait methods go through `with_writer`/`with_reader`
//! directly; the async path is `IDriftBatchWriter::send`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use drift_core::errors::StorageError;
use drift_core::traits::storage::drift_analysis::{
    CallEdgeRow, ClassRow, FunctionRow, IDriftAnalysis, OutlierRow, PatternLocationRow, PatternRow,
    ScanCounts, ScanRunRow,
};
use drift_core::traits::storage::drift_batch::{IDriftBatchWriter, WriteBatch, WriteStats};
use drift_core::traits::storage::drift_enforcement::{
    FeedbackRow, IDriftEnforcement, RuleFeedbackStats, ViolationRow,
};
use drift_core::traits::storage::drift_files::{FileMetadataRow, IDriftFiles, ParseCacheRow};
use drift_core::traits::storage::drift_structural::{
    BoundaryRow, ContractMismatchRow, ContractRow, CouplingCycleRow, CouplingMetricsRow,
    IDriftStructural, SecretRow,
};
use drift_core::traits::storage::workspace::IWorkspaceStorage;
use drift_core::traits::storage::workspace_types::{
    BackupResult, GcStats, IntegrityResult, ProjectInfo, StatusSnapshot, WorkspaceStatus,
};
use rusqlite::{params, OptionalExtension};

use crate::batch::BatchWriter;
use crate::connection::DatabaseManager;
use crate::pagination::{clamp_limit, split_page};
use crate::writes;

fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError { message: e.to_string() }
}

pub struct DriftStorageEngine {
    db: DatabaseManager,
    batch: BatchWriter,
    drift_dir: Option<PathBuf>,
    project_root: Option<PathBuf>,
}

impl DriftStorageEngine {
    /// Open a file-backed engine at `<project_root>/.drift/drift.db`.
    pub fn open(project_root: &Path) -> Result<Self, StorageError> {
        let drift_dir = project_root.join(".drift");
        std::fs::create_dir_all(&drift_dir).map_err(|e| StorageError::Io { message: e.to_string() })?;
        let db_path = drift_dir.join("drift.db");
        let db = DatabaseManager::open(&db_path)?;
        let batch_conn = db.open_batch_connection()?;
        Ok(Self {
            db,
            batch: BatchWriter::new(batch_conn),
            drift_dir: Some(drift_dir),
            project_root: Some(project_root.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = DatabaseManager::open_in_memory()?;
        // In-memory engines share one connection for both the synchronous
        // and batch write paths — there is no file to open a second handle
        // against.
        let batch = db.with_writer(|_| Ok(()))?;
        let _ = batch;
        let batch_conn = rusqlite::Connection::open_in_memory().map_err(sqe)?;
        crate::migrations::apply_pending_migrations(&batch_conn)?;
        Ok(Self {
            db,
            batch: BatchWriter::new(batch_conn),
            drift_dir: None,
            project_root: None,
        })
    }

    pub fn send_batch(&self, command: WriteBatch) -> Result<(), StorageError> {
        self.batch.send(command)
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }

    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    pub fn flush_batch(&self) -> Result<(), StorageError> {
        self.batch.flush()
    }

    pub fn flush_batch_sync(&self) -> Result<WriteStats, StorageError> {
        self.batch.flush_sync()
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_reader(f)
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_writer(f)
    }
}

// ═══ IDriftFiles ═════════════════════════════════════════════════════════

impl IDriftFiles for DriftStorageEngine {
    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT path, language, file_size, content_hash, last_scanned_revision, has_parse_errors, function_count, class_count, error FROM file_metadata")
                .map_err(sqe)?;
            let rows = stmt
                .query_map([], row_to_file_metadata)
                .map_err(sqe)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqe)?;
            Ok(rows)
        })
    }

    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                "SELECT path, language, file_size, content_hash, last_scanned_revision, has_parse_errors, function_count, class_count, error FROM file_metadata WHERE path = ?1",
                [path],
                row_to_file_metadata,
            )
            .optional()
            .map_err(sqe)
        })
    }

    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_file_metadata(conn, std::slice::from_ref(row)).map(|_| ()))
    }

    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM file_metadata WHERE path = ?1", [path]).map_err(sqe)?;
            Ok(())
        })
    }

    fn update_file_error(&self, path: &str, error_msg: Option<&str>) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "UPDATE file_metadata SET error = ?2 WHERE path = ?1",
                params![path, error_msg],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn count_files(&self) -> Result<i64, StorageError> {
        self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM file_metadata", [], |r| r.get(0)).map_err(sqe))
    }

    fn get_parse_cache_by_hash(&self, content_hash: &[u8]) -> Result<Option<ParseCacheRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                "SELECT content_hash, language, tool_version, file_index_json, created_at FROM parse_cache WHERE content_hash = ?1",
                [content_hash],
                |row| {
                    Ok(ParseCacheRow {
                        content_hash: row.get(0)?,
                        language: row.get(1)?,
                        tool_version: row.get(2)?,
                        file_index_json: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(sqe)
        })
    }

    fn insert_parse_cache(&self, row: &ParseCacheRow) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO parse_cache (content_hash, language, tool_version, file_index_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(content_hash) DO UPDATE SET language = excluded.language, tool_version = excluded.tool_version, file_index_json = excluded.file_index_json, created_at = excluded.created_at",
                params![row.content_hash, row.language, row.tool_version, row.file_index_json, row.created_at],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn invalidate_parse_cache(&self, content_hash: &[u8]) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM parse_cache WHERE content_hash = ?1", [content_hash]).map_err(sqe)?;
            Ok(())
        })
    }

    fn evict_stale_tool_version(&self, tool_version: &str) -> Result<u64, StorageError> {
        self.with_writer(|conn| {
            let n = conn
                .execute("DELETE FROM parse_cache WHERE tool_version != ?1", [tool_version])
                .map_err(sqe)?;
            Ok(n as u64)
        })
    }

    fn count_parse_cache(&self) -> Result<i64, StorageError> {
        self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM parse_cache", [], |r| r.get(0)).map_err(sqe))
    }
}

fn row_to_file_metadata(row: &rusqlite::Row) -> rusqlite::Result<FileMetadataRow> {
    Ok(FileMetadataRow {
        path: row.get(0)?,
        language: row.get(1)?,
        file_size: row.get(2)?,
        content_hash: row.get(3)?,
        last_scanned_revision: row.get(4)?,
        has_parse_errors: row.get::<_, i64>(5)? != 0,
        function_count: row.get(6)?,
        class_count: row.get(7)?,
        error: row.get(8)?,
    })
}

// ═══ IDriftAnalysis ══════════════════════════════════════════════════════

fn row_to_function(row: &rusqlite::Row) -> rusqlite::Result<FunctionRow> {
    Ok(FunctionRow {
        id: row.get(0)?,
        file: row.get(1)?,
        name: row.get(2)?,
        qualified_name: row.get(3)?,
        language: row.get(4)?,
        line: row.get(5)?,
        end_line: row.get(6)?,
        signature_json: row.get(7)?,
        return_type: row.get(8)?,
        decorators_json: row.get(9)?,
        is_exported: row.get::<_, i64>(10)? != 0,
        is_async: row.get::<_, i64>(11)? != 0,
        is_entry_point: row.get::<_, i64>(12)? != 0,
        doc_comment: row.get(13)?,
        body_hash: row.get(14)?,
        signature_hash: row.get(15)?,
    })
}

const FUNCTION_COLUMNS: &str = "id, file, name, qualified_name, language, line, end_line, signature_json, return_type, decorators_json, is_exported, is_async, is_entry_point, doc_comment, body_hash, signature_hash";

fn row_to_class(row: &rusqlite::Row) -> rusqlite::Result<ClassRow> {
    Ok(ClassRow {
        id: row.get(0)?,
        file: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        base_types_json: row.get(4)?,
        implemented_interfaces_json: row.get(5)?,
        properties_json: row.get(6)?,
        decorators_json: row.get(7)?,
        line: row.get(8)?,
        end_line: row.get(9)?,
    })
}

const CLASS_COLUMNS: &str = "id, file, name, kind, base_types_json, implemented_interfaces_json, properties_json, decorators_json, line, end_line";

fn row_to_call_edge(row: &rusqlite::Row) -> rusqlite::Result<CallEdgeRow> {
    Ok(CallEdgeRow {
        caller_symbol: row.get(0)?,
        callee_symbol: row.get(1)?,
        callee_text: row.get(2)?,
        call_site_line: row.get(3)?,
        strategy: row.get(4)?,
        confidence: row.get(5)?,
    })
}

const CALL_EDGE_COLUMNS: &str = "caller_symbol, callee_symbol, callee_text, call_site_line, strategy, confidence";

fn row_to_pattern(row: &rusqlite::Row) -> rusqlite::Result<PatternRow> {
    Ok(PatternRow {
        pattern_id: row.get(0)?,
        category: row.get(1)?,
        evidence_count: row.get(2)?,
        module_spread: row.get(3)?,
        alpha: row.get(4)?,
        beta: row.get(5)?,
        posterior_mean: row.get(6)?,
        momentum: row.get(7)?,
        status: row.get(8)?,
        confidence_score: row.get(9)?,
        discovered_at: row.get(10)?,
        last_updated: row.get(11)?,
    })
}

const PATTERN_COLUMNS: &str = "pattern_id, category, evidence_count, module_spread, alpha, beta, posterior_mean, momentum, status, confidence_score, discovered_at, last_updated";

fn row_to_outlier(row: &rusqlite::Row) -> rusqlite::Result<OutlierRow> {
    Ok(OutlierRow {
        id: row.get(0)?,
        pattern_id: row.get(1)?,
        file: row.get(2)?,
        line: row.get(3)?,
        deviation_score: row.get(4)?,
        significance: row.get(5)?,
        method: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl IDriftAnalysis for DriftStorageEngine {
    fn upsert_functions(&self, file: &str, rows: &[FunctionRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_functions(conn, file, rows).map(|_| ()))
    }

    fn delete_functions_for_file(&self, file: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM functions WHERE file = ?1", [file]).map_err(sqe)?;
            Ok(())
        })
    }

    fn get_function(&self, id: i64) -> Result<Option<FunctionRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(&format!("SELECT {FUNCTION_COLUMNS} FROM functions WHERE id = ?1"), [id], row_to_function)
                .optional()
                .map_err(sqe)
        })
    }

    fn find_function_by_qualified_name(&self, qualified_name: &str) -> Result<Option<FunctionRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                &format!("SELECT {FUNCTION_COLUMNS} FROM functions WHERE qualified_name = ?1"),
                [qualified_name],
                row_to_function,
            )
            .optional()
            .map_err(sqe)
        })
    }

    fn functions_in_file(&self, file: &str) -> Result<Vec<FunctionRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {FUNCTION_COLUMNS} FROM functions WHERE file = ?1")).map_err(sqe)?;
            stmt.query_map([file], row_to_function).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn upsert_classes(&self, file: &str, rows: &[ClassRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_classes(conn, file, rows).map(|_| ()))
    }

    fn delete_classes_for_file(&self, file: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM classes WHERE file = ?1", [file]).map_err(sqe)?;
            Ok(())
        })
    }

    fn classes_in_file(&self, file: &str) -> Result<Vec<ClassRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CLASS_COLUMNS} FROM classes WHERE file = ?1")).map_err(sqe)?;
            stmt.query_map([file], row_to_class).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn replace_call_edges_for_file(&self, file: &str, rows: &[CallEdgeRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_call_edges(conn, file, rows).map(|_| ()))
    }

    fn callers_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CALL_EDGE_COLUMNS} FROM call_edges WHERE callee_symbol = ?1")).map_err(sqe)?;
            stmt.query_map([symbol], row_to_call_edge).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn callees_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CALL_EDGE_COLUMNS} FROM call_edges WHERE caller_symbol = ?1")).map_err(sqe)?;
            stmt.query_map([symbol], row_to_call_edge).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn count_call_edges(&self) -> Result<i64, StorageError> {
        self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM call_edges", [], |r| r.get(0)).map_err(sqe))
    }

    fn upsert_pattern(&self, row: &PatternRow) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_pattern(conn, row))
    }

    fn get_pattern(&self, pattern_id: &str) -> Result<Option<PatternRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(&format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE pattern_id = ?1"), [pattern_id], row_to_pattern)
                .optional()
                .map_err(sqe)
        })
    }

    fn list_patterns(
        &self,
        category: Option<&str>,
        status: Option<&str>,
        cursor: Option<(String, i64)>,
        limit: u32,
    ) -> Result<(Vec<PatternRow>, Option<(String, i64)>), StorageError> {
        let limit = clamp_limit(limit);
        self.with_reader(|conn| {
            let mut sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE 1=1");
            if category.is_some() {
                sql.push_str(" AND category = ?1");
            }
            if status.is_some() {
                sql.push_str(" AND status = ?2");
            }
            if let Some((_, _)) = &cursor {
                sql.push_str(" AND (last_updated, pattern_id) > (?3, ?4)");
            }
            sql.push_str(" ORDER BY last_updated, pattern_id LIMIT ?5");

            let mut stmt = conn.prepare(&sql).map_err(sqe)?;
            let (cursor_updated, cursor_id) = cursor.clone().unwrap_or((String::new(), 0));
            let rows = stmt
                .query_map(
                    params![
                        category.unwrap_or_default(),
                        status.unwrap_or_default(),
                        cursor_id,
                        cursor_updated,
                        (limit + 1) as i64,
                    ],
                    row_to_pattern,
                )
                .map_err(sqe)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqe)?;
            Ok(split_page(rows, limit, |p| (p.pattern_id.clone(), p.last_updated)))
        })
    }

    fn replace_pattern_locations(&self, pattern_id: &str, rows: &[PatternLocationRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_pattern_locations(conn, pattern_id, rows).map(|_| ()))
    }

    fn count_pattern_locations(&self, pattern_id: &str) -> Result<i64, StorageError> {
        self.with_reader(|conn| {
            conn.query_row("SELECT COUNT(*) FROM pattern_locations WHERE pattern_id = ?1", [pattern_id], |r| r.get(0)).map_err(sqe)
        })
    }

    fn insert_outliers(&self, rows: &[OutlierRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_outliers(conn, rows).map(|_| ()))
    }

    fn outliers_for_pattern(&self, pattern_id: &str) -> Result<Vec<OutlierRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, pattern_id, file, line, deviation_score, significance, method, created_at FROM outliers WHERE pattern_id = ?1")
                .map_err(sqe)?;
            stmt.query_map([pattern_id], row_to_outlier).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn begin_scan(&self, root_path: &str, revision: i64, started_at: i64) -> Result<i64, StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO scans (revision, root_path, started_at, status) VALUES (?1, ?2, ?3, 'running')",
                params![revision, root_path, started_at],
            )
            .map_err(sqe)?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn complete_scan(
        &self,
        scan_id: i64,
        completed_at: i64,
        counts: ScanCounts,
        partial: bool,
        error: Option<&str>,
    ) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            let status = if error.is_some() { "failed" } else if partial { "partial" } else { "completed" };
            conn.execute(
                "UPDATE scans SET completed_at = ?2, total_files = ?3, added_files = ?4, modified_files = ?5, removed_files = ?6, unchanged_files = ?7, partial = ?8, status = ?9, error = ?10 WHERE scan_id = ?1",
                params![
                    scan_id, completed_at, counts.total_files, counts.added_files, counts.modified_files,
                    counts.removed_files, counts.unchanged_files, partial as i64, status, error,
                ],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn latest_scan(&self) -> Result<Option<ScanRunRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                "SELECT scan_id, revision, root_path, started_at, completed_at, total_files, added_files, modified_files, removed_files, unchanged_files, partial, status, error FROM scans ORDER BY started_at DESC LIMIT 1",
                [],
                |row| {
                    Ok(ScanRunRow {
                        scan_id: row.get(0)?,
                        revision: row.get(1)?,
                        root_path: row.get(2)?,
                        started_at: row.get(3)?,
                        completed_at: row.get(4)?,
                        total_files: row.get(5)?,
                        added_files: row.get(6)?,
                        modified_files: row.get(7)?,
                        removed_files: row.get(8)?,
                        unchanged_files: row.get(9)?,
                        partial: row.get::<_, i64>(10)? != 0,
                        status: row.get(11)?,
                        error: row.get(12)?,
                    })
                },
            )
            .optional()
            .map_err(sqe)
        })
    }
}

// ═══ IDriftStructural ════════════════════════════════════════════════════

fn row_to_boundary(row: &rusqlite::Row) -> rusqlite::Result<BoundaryRow> {
    Ok(BoundaryRow {
        id: row.get(0)?,
        file: row.get(1)?,
        line: row.get(2)?,
        framework: row.get(3)?,
        table_name: row.get(4)?,
        field_name: row.get(5)?,
        operation: row.get(6)?,
        sensitivity: row.get(7)?,
        confidence: row.get(8)?,
    })
}

const BOUNDARY_COLUMNS: &str = "id, file, line, framework, table_name, field_name, operation, sensitivity, confidence";

fn row_to_contract(row: &rusqlite::Row) -> rusqlite::Result<ContractRow> {
    Ok(ContractRow {
        id: row.get(0)?,
        http_method: row.get(1)?,
        normalised_path: row.get(2)?,
        source_file: row.get(3)?,
        framework: row.get(4)?,
        backend_fields_json: row.get(5)?,
        frontend_fields_json: row.get(6)?,
        confidence: row.get(7)?,
        status: row.get(8)?,
    })
}

const CONTRACT_COLUMNS: &str = "id, http_method, normalised_path, source_file, framework, backend_fields_json, frontend_fields_json, confidence, status";

fn row_to_coupling_metrics(row: &rusqlite::Row) -> rusqlite::Result<CouplingMetricsRow> {
    Ok(CouplingMetricsRow {
        module: row.get(0)?,
        ca: row.get::<_, i64>(1)? as u32,
        ce: row.get::<_, i64>(2)? as u32,
        instability: row.get(3)?,
        abstractness: row.get(4)?,
        distance: row.get(5)?,
    })
}

impl IDriftStructural for DriftStorageEngine {
    fn replace_boundaries_for_file(&self, file: &str, rows: &[BoundaryRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_boundaries(conn, file, rows).map(|_| ()))
    }

    fn boundaries_with_sensitivity(&self, sensitivity: &str) -> Result<Vec<BoundaryRow>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {BOUNDARY_COLUMNS} FROM boundaries WHERE sensitivity = ?1")).map_err(sqe)?;
            stmt.query_map([sensitivity], row_to_boundary).map_err(sqe)?.collect::<Result<Vec<_>, _>>().map_err(sqe)
        })
    }

    fn upsert_contract(&self, row: &ContractRow) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_contract(conn, row))
    }

    fn get_contract(&self, http_method: &str, normalised_path: &str) -> Result<Option<ContractRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE http_method = ?1 AND normalised_path = ?2"),
                params![http_method, normalised_path],
                row_to_contract,
            )
            .optional()
            .map_err(sqe)
        })
    }

    fn list_contracts(&self, status: Option<&str>, cursor: Option<String>, limit: u32) -> Result<(Vec<ContractRow>, Option<String>), StorageError> {
        let limit = clamp_limit(limit);
        self.with_reader(|conn| {
            let mut sql = format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE 1=1");
            if status.is_some() {
                sql.push_str(" AND status = ?1");
            }
            if cursor.is_some() {
                sql.push_str(" AND id > ?2");
            }
            sql.push_str(" ORDER BY id LIMIT ?3");
            let mut stmt = conn.prepare(&sql).map_err(sqe)?;
            let rows = stmt
                .query_map(
                    params![status.unwrap_or_default(), cursor.clone().unwrap_or_default(), (limit + 1) as i64],
                    row_to_contract,
                )
                .map_err(sqe)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqe)?;
            Ok(split_page(rows, limit, |c| c.id.clone()))
        })
    }

    fn replace_contract_mismatches(&self, contract_id: &str, rows: &[ContractMismatchRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_contract_mismatches(conn, contract_id, rows).map(|_| ()))
    }

    fn replace_secrets_for_file(&self, file: &str, rows: &[SecretRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_secrets(conn, file, rows).map(|_| ()))
    }

    fn count_secrets(&self) -> Result<i64, StorageError> {
        self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM secrets", [], |r| r.get(0)).map_err(sqe))
    }

    fn replace_coupling_metrics(&self, rows: &[CouplingMetricsRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM coupling_metrics", []).map_err(sqe)?;
            for row in rows {
                conn.execute(
                    "INSERT INTO coupling_metrics (module, ca, ce, instability, abstractness, distance) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![row.module, row.ca, row.ce, row.instability, row.abstractness, row.distance],
                )
                .map_err(sqe)?;
            }
            Ok(())
        })
    }

    fn replace_coupling_cycles(&self, rows: &[CouplingCycleRow]) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM coupling_cycles", []).map_err(sqe)?;
            for row in rows {
                conn.execute(
                    "INSERT INTO coupling_cycles (members_json, break_suggestions_json, created_at) VALUES (?1, ?2, ?3)",
                    params![row.members_json, row.break_suggestions_json, row.created_at],
                )
                .map_err(sqe)?;
            }
            Ok(())
        })
    }

    fn coupling_metric(&self, module: &str) -> Result<Option<CouplingMetricsRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(
                "SELECT module, ca, ce, instability, abstractness, distance FROM coupling_metrics WHERE module = ?1",
                [module],
                row_to_coupling_metrics,
            )
            .optional()
            .map_err(sqe)
        })
    }
}

// ═══ IDriftEnforcement ═══════════════════════════════════════════════════

fn row_to_violation(row: &rusqlite::Row) -> rusqlite::Result<ViolationRow> {
    Ok(ViolationRow {
        id: row.get(0)?,
        file: row.get(1)?,
        line: row.get(2)?,
        column: row.get(3)?,
        pattern_id: row.get(4)?,
        rule_id: row.get(5)?,
        severity: row.get(6)?,
        message: row.get(7)?,
        fix_suggestion_json: row.get(8)?,
        cwe_ids_json: row.get(9)?,
        owasp_category: row.get(10)?,
        status: row.get(11)?,
        match_key: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

const VIOLATION_COLUMNS: &str = "id, file, line, column_num, pattern_id, rule_id, severity, message, fix_suggestion_json, cwe_ids_json, owasp_category, status, match_key, created_at, updated_at";

impl IDriftEnforcement for DriftStorageEngine {
    fn upsert_violation(&self, row: &ViolationRow) -> Result<(), StorageError> {
        self.with_writer(|conn| writes::write_violation(conn, row))
    }

    fn find_violation_by_match_key(&self, match_key: &str) -> Result<Option<ViolationRow>, StorageError> {
        self.with_reader(|conn| {
            conn.query_row(&format!("SELECT {VIOLATION_COLUMNS} FROM violations WHERE match_key = ?1"), [match_key], row_to_violation)
                .optional()
                .map_err(sqe)
        })
    }

    fn list_violations(
        &self,
        severity: Option<&str>,
        status: Option<&str>,
        cursor: Option<(i64, String)>,
        limit: u32,
    ) -> Result<(Vec<ViolationRow>, Option<(i64, String)>), StorageError> {
        let limit = clamp_limit(limit);
        self.with_reader(|conn| {
            let mut sql = format!("SELECT {VIOLATION_COLUMNS} FROM violations WHERE 1=1");
            if severity.is_some() {
                sql.push_str(" AND severity = ?1");
            }
            if status.is_some() {
                sql.push_str(" AND status = ?2");
            }
            if cursor.is_some() {
                sql.push_str(" AND (created_at, id) > (?3, ?4)");
            }
            sql.push_str(" ORDER BY created_at, id LIMIT ?5");
            let mut stmt = conn.prepare(&sql).map_err(sqe)?;
            let (cursor_created, cursor_id) = cursor.clone().unwrap_or((0, String::new()));
            let rows = stmt
                .query_map(
                    params![
                        severity.unwrap_or_default(),
                        status.unwrap_or_default(),
                        cursor_created,
                        cursor_id,
                        (limit + 1) as i64,
                    ],
                    row_to_violation,
                )
                .map_err(sqe)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqe)?;
            Ok(split_page(rows, limit, |v| (v.created_at, v.id.clone())))
        })
    }

    fn set_violation_status(&self, id: &str, status: &str, updated_at: i64) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "UPDATE violations SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status, updated_at],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn record_feedback(&self, row: &FeedbackRow) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO feedback (violation_id, rule_id, action, reason, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.violation_id, row.rule_id, row.action, row.reason, row.created_at],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn feedback_stats_for_rule(&self, rule_id: &str, since: i64) -> Result<RuleFeedbackStats, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT action, COUNT(*) FROM feedback WHERE rule_id = ?1 AND created_at >= ?2 GROUP BY action")
                .map_err(sqe)?;
            let mut stats = RuleFeedbackStats::default();
            let rows = stmt
                .query_map(params![rule_id, since], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
                .map_err(sqe)?;
            for row in rows {
                let (action, count) = row.map_err(sqe)?;
                stats.total_count += count;
                match action.as_str() {
                    "fixed" => stats.fixed_count += count,
                    "dismissed" => stats.dismissed_count += count,
                    "ignored" => stats.ignored_count += count,
                    "auto_fixed" => stats.auto_fixed_count += count,
                    _ => {}
                }
            }
            Ok(stats)
        })
    }

    fn set_rule_auto_disabled(&self, rule_id: &str, disabled: bool) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO rule_auto_disabled (rule_id, disabled) VALUES (?1, ?2)
                 ON CONFLICT(rule_id) DO UPDATE SET disabled = excluded.disabled",
                params![rule_id, disabled as i64],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn is_rule_auto_disabled(&self, rule_id: &str) -> Result<bool, StorageError> {
        self.with_reader(|conn| {
            conn.query_row("SELECT disabled FROM rule_auto_disabled WHERE rule_id = ?1", [rule_id], |r| r.get::<_, i64>(0))
                .optional()
                .map_err(sqe)
                .map(|v| v.map(|d| d != 0).unwrap_or(false))
        })
    }
}

// ═══ IDriftBatchWriter ═══════════════════════════════════════════════════

impl IDriftBatchWriter for DriftStorageEngine {
    fn send(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.batch.send(batch)
    }
    fn flush(&self) -> Result<(), StorageError> {
        self.batch.flush()
    }
    fn flush_sync(&self) -> Result<WriteStats, StorageError> {
        self.batch.flush_sync()
    }
    fn stats(&self) -> WriteStats {
        self.batch.stats()
    }
    fn shutdown(&self) -> Result<WriteStats, StorageError> {
        self.batch.shutdown()
    }
}

// ═══ IWorkspaceStorage ═══════════════════════════════════════════════════
//
// Workspace bookkeeping tables share this same database file; the engine
// delegates to `drift-core`'s workspace module rather than re-implementing
// migration, backup, or GC logic.

impl IWorkspaceStorage for DriftStorageEngine {
    fn initialize(&self, _path: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            drift_core::workspace::initialize_workspace_db(conn)
                .map_err(|e| StorageError::MigrationFailed { version: 0, message: e.to_string() })
        })
    }

    fn status(&self) -> Result<WorkspaceStatus, StorageError> {
        let schema_version = self.with_reader(|conn| {
            drift_core::workspace::get_schema_version(conn).map_err(|e| sqe(e))
        })?;
        let file_count = self.count_files().unwrap_or(0);
        let db_size_bytes = self
            .path()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        let wal_size_bytes = self
            .path()
            .and_then(|p| std::fs::metadata(format!("{}-wal", p.display())).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(WorkspaceStatus {
            initialized: true,
            db_path: self.path().map(|p| p.display().to_string()),
            schema_version,
            file_count,
            db_size_bytes,
            wal_size_bytes,
            lock_held: false,
        })
    }

    fn project_info(&self) -> Result<ProjectInfo, StorageError> {
        let root_path = self.project_root.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        let language_breakdown = self.with_reader(|conn| {
            let mut stmt = conn.prepare("SELECT language, COUNT(*) FROM file_metadata GROUP BY language").map_err(sqe)?;
            stmt.query_map([], |row| Ok((row.get::<_, Option<String>>(0)?.unwrap_or_default(), row.get(1)?)))
                .map_err(sqe)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqe)
        })?;
        let total_files = self.count_files()?;
        let total_functions = self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM functions", [], |r| r.get(0)).map_err(sqe))?;
        let total_patterns = self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM patterns", [], |r| r.get(0)).map_err(sqe))?;
        let total_violations = self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM violations", [], |r| r.get(0)).map_err(sqe))?;
        let last_scan_at = self.latest_scan()?.and_then(|s| s.completed_at);
        Ok(ProjectInfo { root_path, language_breakdown, total_files, total_functions, total_patterns, total_violations, last_scan_at })
    }

    fn status_snapshot(&self) -> Result<StatusSnapshot, StorageError> {
        let schema_version = self.with_reader(|conn| drift_core::workspace::get_schema_version(conn).map_err(|e| sqe(e)))?;
        let (languages, frameworks) = self.with_reader(|conn| {
            let languages: Vec<String> = drift_core::workspace::get_context(conn, "languages")
                .ok()
                .flatten()
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();
            let frameworks: Vec<String> = drift_core::workspace::get_context(conn, "frameworks")
                .ok()
                .flatten()
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();
            Ok((languages, frameworks))
        })?;
        let root_path = self.project_root.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        Ok(StatusSnapshot {
            root_path,
            languages,
            frameworks,
            file_count: self.count_files()?,
            function_count: self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM functions", [], |r| r.get(0)).map_err(sqe))?,
            pattern_count: self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM patterns", [], |r| r.get(0)).map_err(sqe))?,
            violation_count: self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM violations", [], |r| r.get(0)).map_err(sqe))?,
            boundary_count: self.with_reader(|conn| conn.query_row("SELECT COUNT(*) FROM boundaries", [], |r| r.get(0)).map_err(sqe))?,
            last_scan_at: self.latest_scan()?.and_then(|s| s.completed_at),
            schema_version,
        })
    }

    fn refresh_status_snapshot(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            let languages: Vec<String> = conn
                .prepare("SELECT DISTINCT language FROM file_metadata WHERE language IS NOT NULL")
                .and_then(|mut stmt| stmt.query_map([], |row| row.get(0)).and_then(Iterator::collect))
                .unwrap_or_default();
            let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);
            drift_core::workspace::refresh_workspace_context(conn, &languages, &[], now).map_err(|e| sqe(e))
        })
    }

    fn gc(&self) -> Result<GcStats, StorageError> {
        self.with_writer(|conn| {
            let report = drift_core::workspace::garbage_collect(conn, &drift_core::workspace::GcOptions::default())
                .map_err(|e| sqe(e))?;
            Ok(GcStats {
                orphan_rows_removed: report.old_events_deleted,
                stale_cache_entries_removed: 0,
                wal_checkpointed: report.wal_checkpointed,
                freed_bytes: report.freelist_pages_before.saturating_sub(report.freelist_pages_after) * 4096,
            })
        })
    }

    fn backup(&self, destination: &str) -> Result<BackupResult, StorageError> {
        self.with_writer(|conn| {
            let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);
            let manifest = drift_core::workspace::create_backup(
                conn,
                Path::new(destination),
                drift_core::workspace::BackupReason::UserRequested,
                now,
            )
            .map_err(|e| sqe(e))?;
            Ok(BackupResult {
                destination: manifest.backup_path.display().to_string(),
                size_bytes: manifest.db_size_bytes,
                duration_ms: manifest.duration_ms,
            })
        })
    }

    fn integrity_check(&self) -> Result<IntegrityResult, StorageError> {
        let Some(drift_dir) = &self.drift_dir else {
            return Err(StorageError::NotSupported {
                operation: "integrity_check".into(),
                reason: "in-memory engines have no on-disk workspace directory".into(),
            });
        };
        let project_root = self.project_root.as_deref().unwrap_or(drift_dir);
        let report = drift_core::workspace::verify_workspace(drift_dir, project_root);
        let mut issues = Vec::new();
        if let drift_core::workspace::DatabaseIntegrity::QuickCheckFailed(msg) = &report.database {
            issues.push(msg.clone());
        }
        if let Some(err) = &report.config_parse_error {
            issues.push(err.clone());
        }
        Ok(IntegrityResult { ok: report.healthy, issues })
    }

    fn schema_version(&self) -> Result<u32, StorageError> {
        self.with_reader(|conn| drift_core::workspace::get_schema_version(conn).map_err(|e| sqe(e)))
    }
}
