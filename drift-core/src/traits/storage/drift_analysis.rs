//! `IDriftAnalysis` — functions, classes, call edges, patterns, outliers,
//! and scan-run history.
//!
//! Maps to `drift-storage/src/queries/functions.rs`, `classes.rs`,
//! `call_edges.rs`, `patterns.rs`, `outliers.rs`, `scan_history.rs`.

use std::sync::Arc;

use crate::errors::StorageError;

#[derive(Debug, Clone)]
pub struct FunctionRow {
    pub id: i64,
    pub file: String,
    pub name: String,
    pub qualified_name: String,
    pub language: String,
    pub line: i64,
    pub end_line: i64,
    /// JSON array of `{ name, type, default }`.
    pub signature_json: String,
    pub return_type: Option<String>,
    /// JSON array of `{ name, arguments }`.
    pub decorators_json: String,
    pub is_exported: bool,
    pub is_async: bool,
    pub is_entry_point: bool,
    pub doc_comment: Option<String>,
    pub body_hash: Vec<u8>,
    pub signature_hash: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ClassRow {
    pub id: i64,
    pub file: String,
    pub name: String,
    /// `class` | `interface` | `struct` | `enum` | `trait` | `record`.
    pub kind: String,
    pub base_types_json: String,
    pub implemented_interfaces_json: String,
    pub properties_json: String,
    pub decorators_json: String,
    pub line: i64,
    pub end_line: i64,
}

/// A resolved or unresolved call edge. `callee_symbol` is `None` for an
/// unresolved call; `callee_text` retains the raw callee expression for
/// diagnostics either way.
#[derive(Debug, Clone)]
pub struct CallEdgeRow {
    pub caller_symbol: i64,
    pub callee_symbol: Option<i64>,
    pub callee_text: String,
    pub call_site_line: i64,
    pub strategy: String,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct PatternRow {
    pub pattern_id: String,
    pub category: String,
    pub evidence_count: i64,
    pub module_spread: i64,
    pub alpha: f64,
    pub beta: f64,
    pub posterior_mean: f64,
    pub momentum: f64,
    /// `Universal` | `ProjectSpecific` | `Emerging` | `Legacy` | `Contested`.
    pub status: String,
    pub confidence_score: f64,
    pub discovered_at: i64,
    pub last_updated: i64,
}

/// One occurrence of a pattern, deduplicated by `(file, line, column)` plus
/// the semantic key `(enclosing_function, enclosing_class)`.
#[derive(Debug, Clone)]
pub struct PatternLocationRow {
    pub pattern_id: String,
    pub file: String,
    pub line: i64,
    pub column: i64,
    pub enclosing_function: Option<String>,
    pub enclosing_class: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OutlierRow {
    pub id: i64,
    pub pattern_id: String,
    pub file: String,
    pub line: i64,
    pub deviation_score: f64,
    /// `moderate` | `high` | `critical`.
    pub significance: String,
    /// `z-score` | `grubbs`.
    pub method: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct ScanRunRow {
    pub scan_id: i64,
    pub revision: i64,
    pub root_path: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub total_files: Option<i64>,
    pub added_files: Option<i64>,
    pub modified_files: Option<i64>,
    pub removed_files: Option<i64>,
    pub unchanged_files: Option<i64>,
    pub partial: bool,
    pub status: String,
    pub error: Option<String>,
}

/// Functions, classes, call edges, patterns, outliers, and scan history.
pub trait IDriftAnalysis: Send + Sync {
    fn upsert_functions(&self, file: &str, rows: &[FunctionRow]) -> Result<(), StorageError>;
    fn delete_functions_for_file(&self, file: &str) -> Result<(), StorageError>;
    fn get_function(&self, id: i64) -> Result<Option<FunctionRow>, StorageError>;
    fn find_function_by_qualified_name(
        &self,
        qualified_name: &str,
    ) -> Result<Option<FunctionRow>, StorageError>;
    fn functions_in_file(&self, file: &str) -> Result<Vec<FunctionRow>, StorageError>;

    fn upsert_classes(&self, file: &str, rows: &[ClassRow]) -> Result<(), StorageError>;
    fn delete_classes_for_file(&self, file: &str) -> Result<(), StorageError>;
    fn classes_in_file(&self, file: &str) -> Result<Vec<ClassRow>, StorageError>;

    fn replace_call_edges_for_file(
        &self,
        file: &str,
        rows: &[CallEdgeRow],
    ) -> Result<(), StorageError>;
    fn callers_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError>;
    fn callees_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError>;
    fn count_call_edges(&self) -> Result<i64, StorageError>;

    fn upsert_pattern(&self, row: &PatternRow) -> Result<(), StorageError>;
    fn get_pattern(&self, pattern_id: &str) -> Result<Option<PatternRow>, StorageError>;
    fn list_patterns(
        &self,
        category: Option<&str>,
        status: Option<&str>,
        cursor: Option<(String, i64)>,
        limit: u32,
    ) -> Result<(Vec<PatternRow>, Option<(String, i64)>), StorageError>;
    fn replace_pattern_locations(
        &self,
        pattern_id: &str,
        rows: &[PatternLocationRow],
    ) -> Result<(), StorageError>;
    fn count_pattern_locations(&self, pattern_id: &str) -> Result<i64, StorageError>;

    fn insert_outliers(&self, rows: &[OutlierRow]) -> Result<(), StorageError>;
    fn outliers_for_pattern(&self, pattern_id: &str) -> Result<Vec<OutlierRow>, StorageError>;

    fn begin_scan(&self, root_path: &str, revision: i64, started_at: i64) -> Result<i64, StorageError>;
    fn complete_scan(
        &self,
        scan_id: i64,
        completed_at: i64,
        counts: ScanCounts,
        partial: bool,
        error: Option<&str>,
    ) -> Result<(), StorageError>;
    fn latest_scan(&self) -> Result<Option<ScanRunRow>, StorageError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanCounts {
    pub total_files: i64,
    pub added_files: i64,
    pub modified_files: i64,
    pub removed_files: i64,
    pub unchanged_files: i64,
}

impl<T: IDriftAnalysis + ?Sized> IDriftAnalysis for Arc<T> {
    fn upsert_functions(&self, file: &str, rows: &[FunctionRow]) -> Result<(), StorageError> {
        (**self).upsert_functions(file, rows)
    }
    fn delete_functions_for_file(&self, file: &str) -> Result<(), StorageError> {
        (**self).delete_functions_for_file(file)
    }
    fn get_function(&self, id: i64) -> Result<Option<FunctionRow>, StorageError> {
        (**self).get_function(id)
    }
    fn find_function_by_qualified_name(
        &self,
        qualified_name: &str,
    ) -> Result<Option<FunctionRow>, StorageError> {
        (**self).find_function_by_qualified_name(qualified_name)
    }
    fn functions_in_file(&self, file: &str) -> Result<Vec<FunctionRow>, StorageError> {
        (**self).functions_in_file(file)
    }
    fn upsert_classes(&self, file: &str, rows: &[ClassRow]) -> Result<(), StorageError> {
        (**self).upsert_classes(file, rows)
    }
    fn delete_classes_for_file(&self, file: &str) -> Result<(), StorageError> {
        (**self).delete_classes_for_file(file)
    }
    fn classes_in_file(&self, file: &str) -> Result<Vec<ClassRow>, StorageError> {
        (**self).classes_in_file(file)
    }
    fn replace_call_edges_for_file(
        &self,
        file: &str,
        rows: &[CallEdgeRow],
    ) -> Result<(), StorageError> {
        (**self).replace_call_edges_for_file(file, rows)
    }
    fn callers_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError> {
        (**self).callers_of(symbol)
    }
    fn callees_of(&self, symbol: i64) -> Result<Vec<CallEdgeRow>, StorageError> {
        (**self).callees_of(symbol)
    }
    fn count_call_edges(&self) -> Result<i64, StorageError> {
        (**self).count_call_edges()
    }
    fn upsert_pattern(&self, row: &PatternRow) -> Result<(), StorageError> {
        (**self).upsert_pattern(row)
    }
    fn get_pattern(&self, pattern_id: &str) -> Result<Option<PatternRow>, StorageError> {
        (**self).get_pattern(pattern_id)
    }
    fn list_patterns(
        &self,
        category: Option<&str>,
        status: Option<&str>,
        cursor: Option<(String, i64)>,
        limit: u32,
    ) -> Result<(Vec<PatternRow>, Option<(String, i64)>), StorageError> {
        (**self).list_patterns(category, status, cursor, limit)
    }
    fn replace_pattern_locations(
        &self,
        pattern_id: &str,
        rows: &[PatternLocationRow],
    ) -> Result<(), StorageError> {
        (**self).replace_pattern_locations(pattern_id, rows)
    }
    fn count_pattern_locations(&self, pattern_id: &str) -> Result<i64, StorageError> {
        (**self).count_pattern_locations(pattern_id)
    }
    fn insert_outliers(&self, rows: &[OutlierRow]) -> Result<(), StorageError> {
        (**self).insert_outliers(rows)
    }
    fn outliers_for_pattern(&self, pattern_id: &str) -> Result<Vec<OutlierRow>, StorageError> {
        (**self).outliers_for_pattern(pattern_id)
    }
    fn begin_scan(&self, root_path: &str, revision: i64, started_at: i64) -> Result<i64, StorageError> {
        (**self).begin_scan(root_path, revision, started_at)
    }
    fn complete_scan(
        &self,
        scan_id: i64,
        completed_at: i64,
        counts: ScanCounts,
        partial: bool,
        error: Option<&str>,
    ) -> Result<(), StorageError> {
        (**self).complete_scan(scan_id, completed_at, counts, partial, error)
    }
    fn latest_scan(&self) -> Result<Option<ScanRunRow>, StorageError> {
        (**self).latest_scan()
    }
}
