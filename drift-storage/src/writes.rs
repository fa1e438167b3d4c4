//! Entity write helpers shared by the synchronous writer path (`engine.rs`'s
//! direct trait methods) and the batched path (`batch::writer`). Keeping the
//! SQL in one place means a batched write and a synchronous write of the
//! same entity always do exactly the same thing.

use drift_core::errors::StorageError;
use drift_core::traits::storage::drift_analysis::{CallEdgeRow, ClassRow, FunctionRow, OutlierRow, PatternLocationRow, PatternRow};
use drift_core::traits::storage::drift_enforcement::ViolationRow;
use drift_core::traits::storage::drift_files::FileMetadataRow;
use drift_core::traits::storage::drift_structural::{BoundaryRow, ContractMismatchRow, ContractRow, SecretRow};
use rusqlite::Connection;

pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError { message: e.to_string() }
}

pub(crate) fn write_file_metadata(conn: &Connection, rows: &[FileMetadataRow]) -> Result<u64, StorageError> {
    for row in rows {
        conn.execute(
            "INSERT INTO file_metadata (path, language, file_size, content_hash, last_scanned_revision, has_parse_errors, function_count, class_count, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(path) DO UPDATE SET
                language = excluded.language, file_size = excluded.file_size, content_hash = excluded.content_hash,
                last_scanned_revision = excluded.last_scanned_revision, has_parse_errors = excluded.has_parse_errors,
                function_count = excluded.function_count, class_count = excluded.class_count, error = excluded.error",
            rusqlite::params![
                row.path, row.language, row.file_size, row.content_hash, row.last_scanned_revision,
                row.has_parse_errors as i64, row.function_count, row.class_count, row.error,
            ],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_functions(conn: &Connection, file: &str, rows: &[FunctionRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM functions WHERE file = ?1", [file]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO functions (id, file, name, qualified_name, language, line, end_line, signature_json, return_type, decorators_json, is_exported, is_async, is_entry_point, doc_comment, body_hash, signature_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(id) DO UPDATE SET
                file = excluded.file, name = excluded.name, qualified_name = excluded.qualified_name,
                language = excluded.language, line = excluded.line, end_line = excluded.end_line,
                signature_json = excluded.signature_json, return_type = excluded.return_type,
                decorators_json = excluded.decorators_json, is_exported = excluded.is_exported,
                is_async = excluded.is_async, is_entry_point = excluded.is_entry_point,
                doc_comment = excluded.doc_comment, body_hash = excluded.body_hash, signature_hash = excluded.signature_hash",
            rusqlite::params![
                row.id, row.file, row.name, row.qualified_name, row.language, row.line, row.end_line,
                row.signature_json, row.return_type, row.decorators_json, row.is_exported as i64,
                row.is_async as i64, row.is_entry_point as i64, row.doc_comment, row.body_hash, row.signature_hash,
            ],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_classes(conn: &Connection, file: &str, rows: &[ClassRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM classes WHERE file = ?1", [file]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO classes (id, file, name, kind, base_types_json, implemented_interfaces_json, properties_json, decorators_json, line, end_line)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                file = excluded.file, name = excluded.name, kind = excluded.kind,
                base_types_json = excluded.base_types_json, implemented_interfaces_json = excluded.implemented_interfaces_json,
                properties_json = excluded.properties_json, decorators_json = excluded.decorators_json,
                line = excluded.line, end_line = excluded.end_line",
            rusqlite::params![
                row.id, row.file, row.name, row.kind, row.base_types_json, row.implemented_interfaces_json,
                row.properties_json, row.decorators_json, row.line, row.end_line,
            ],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_call_edges(conn: &Connection, file: &str, rows: &[CallEdgeRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM call_edges WHERE file = ?1", [file]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO call_edges (file, caller_symbol, callee_symbol, callee_text, call_site_line, strategy, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![file, row.caller_symbol, row.callee_symbol, row.callee_text, row.call_site_line, row.strategy, row.confidence],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_patterns(conn: &Connection, rows: &[PatternRow]) -> Result<u64, StorageError> {
    for row in rows {
        write_pattern(conn, row)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_pattern(conn: &Connection, row: &PatternRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO patterns (pattern_id, category, evidence_count, module_spread, alpha, beta, posterior_mean, momentum, status, confidence_score, discovered_at, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(pattern_id) DO UPDATE SET
            category = excluded.category, evidence_count = excluded.evidence_count, module_spread = excluded.module_spread,
            alpha = excluded.alpha, beta = excluded.beta, posterior_mean = excluded.posterior_mean,
            momentum = excluded.momentum, status = excluded.status, confidence_score = excluded.confidence_score,
            last_updated = excluded.last_updated",
        rusqlite::params![
            row.pattern_id, row.category, row.evidence_count, row.module_spread, row.alpha, row.beta,
            row.posterior_mean, row.momentum, row.status, row.confidence_score, row.discovered_at, row.last_updated,
        ],
    ).map_err(sqe)?;
    Ok(())
}

pub(crate) fn write_pattern_locations(conn: &Connection, pattern_id: &str, rows: &[PatternLocationRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM pattern_locations WHERE pattern_id = ?1", [pattern_id]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO pattern_locations (pattern_id, file, line, column_num, enclosing_function, enclosing_class)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![row.pattern_id, row.file, row.line, row.column, row.enclosing_function, row.enclosing_class],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_outliers(conn: &Connection, rows: &[OutlierRow]) -> Result<u64, StorageError> {
    for row in rows {
        conn.execute(
            "INSERT INTO outliers (pattern_id, file, line, deviation_score, significance, method, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![row.pattern_id, row.file, row.line, row.deviation_score, row.significance, row.method, row.created_at],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_boundaries(conn: &Connection, file: &str, rows: &[BoundaryRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM boundaries WHERE file = ?1", [file]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO boundaries (file, line, framework, table_name, field_name, operation, sensitivity, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![file, row.line, row.framework, row.table_name, row.field_name, row.operation, row.sensitivity, row.confidence],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_contract(conn: &Connection, row: &ContractRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO contracts (id, http_method, normalised_path, source_file, framework, backend_fields_json, frontend_fields_json, confidence, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            http_method = excluded.http_method, normalised_path = excluded.normalised_path, source_file = excluded.source_file,
            framework = excluded.framework, backend_fields_json = excluded.backend_fields_json,
            frontend_fields_json = excluded.frontend_fields_json, confidence = excluded.confidence, status = excluded.status",
        rusqlite::params![
            row.id, row.http_method, row.normalised_path, row.source_file, row.framework,
            row.backend_fields_json, row.frontend_fields_json, row.confidence, row.status,
        ],
    ).map_err(sqe)?;
    Ok(())
}

pub(crate) fn write_contracts(conn: &Connection, rows: &[ContractRow]) -> Result<u64, StorageError> {
    for row in rows {
        write_contract(conn, row)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_contract_mismatches(conn: &Connection, contract_id: &str, rows: &[ContractMismatchRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM contract_mismatches WHERE contract_id = ?1", [contract_id]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO contract_mismatches (contract_id, field_path, mismatch_type, severity, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![row.contract_id, row.field_path, row.mismatch_type, row.severity, row.message, row.created_at],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_secrets(conn: &Connection, file: &str, rows: &[SecretRow]) -> Result<u64, StorageError> {
    conn.execute("DELETE FROM secrets WHERE file = ?1", [file]).map_err(sqe)?;
    for row in rows {
        conn.execute(
            "INSERT INTO secrets (provider_label, redacted_value, file, line, severity, entropy, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![row.provider_label, row.redacted_value, file, row.line, row.severity, row.entropy, row.confidence],
        ).map_err(sqe)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_violations(conn: &Connection, rows: &[ViolationRow]) -> Result<u64, StorageError> {
    for row in rows {
        write_violation(conn, row)?;
    }
    Ok(rows.len() as u64)
}

pub(crate) fn write_violation(conn: &Connection, row: &ViolationRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO violations (id, file, line, column_num, pattern_id, rule_id, severity, message, fix_suggestion_json, cwe_ids_json, owasp_category, status, match_key, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
         ON CONFLICT(id) DO UPDATE SET
            file = excluded.file, line = excluded.line, column_num = excluded.column_num, pattern_id = excluded.pattern_id,
            rule_id = excluded.rule_id, severity = excluded.severity, message = excluded.message,
            fix_suggestion_json = excluded.fix_suggestion_json, cwe_ids_json = excluded.cwe_ids_json,
            owasp_category = excluded.owasp_category, status = excluded.status, match_key = excluded.match_key,
            updated_at = excluded.updated_at",
        rusqlite::params![
            row.id, row.file, row.line, row.column, row.pattern_id, row.rule_id, row.severity, row.message,
            row.fix_suggestion_json, row.cwe_ids_json, row.owasp_category, row.status, row.match_key,
            row.created_at, row.updated_at,
        ],
    ).map_err(sqe)?;
    Ok(())
}
