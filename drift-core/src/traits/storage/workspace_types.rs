//! Supporting types for `IWorkspaceStorage`: the persisted-state layout
//! `WorkspaceStatus` describes and the materialised `StatusSnapshot`.

#[derive(Debug, Clone)]
pub struct WorkspaceStatus {
    pub initialized: bool,
    pub db_path: Option<String>,
    pub schema_version: u32,
    pub file_count: i64,
    pub db_size_bytes: u64,
    pub wal_size_bytes: u64,
    pub lock_held: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub root_path: String,
    pub language_breakdown: Vec<(String, i64)>,
    pub total_files: i64,
    pub total_functions: i64,
    pub total_patterns: i64,
    pub total_violations: i64,
    pub last_scan_at: Option<i64>,
}

/// The materialised status snapshot `query_status()` returns, refreshed
/// at end-of-scan so reads stay sub-millisecond.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub root_path: String,
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub file_count: i64,
    pub function_count: i64,
    pub pattern_count: i64,
    pub violation_count: i64,
    pub boundary_count: i64,
    pub last_scan_at: Option<i64>,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GcStats {
    pub orphan_rows_removed: u64,
    pub stale_cache_entries_removed: u64,
    pub wal_checkpointed: bool,
    pub freed_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct BackupResult {
    pub destination: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct IntegrityResult {
    pub ok: bool,
    pub issues: Vec<String>,
}
