//! Scanner configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob patterns — if non-empty, only matching paths are scanned.
    pub include_globs: Vec<String>,
    /// Ignore patterns layered on top of default VCS-ignore-style rules.
    pub exclude_globs: Vec<String>,
    /// Maximum file size in bytes. Default: 1 MiB.
    pub max_file_size: u64,
    /// Follow symbolic links while walking. Default: false.
    pub follow_symlinks: bool,
    /// Compute content hashes; false disables content-hash-keyed caches.
    pub compute_hashes: bool,
    /// Force a full rescan, ignoring the stored change set.
    pub force_full_scan: bool,
    /// Number of worker threads. `None` = `min(cpu_count - 1, configured)`.
    pub worker_threads: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            max_file_size: 1_048_576,
            follow_symlinks: false,
            compute_hashes: true,
            force_full_scan: false,
            worker_threads: None,
        }
    }
}
