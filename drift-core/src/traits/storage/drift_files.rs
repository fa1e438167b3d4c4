//! `IDriftFiles` — file metadata and the Parser Pool's content-hash-keyed
//! parse cache.
//!
//! Maps to `drift-storage/src/queries/files.rs` + `queries/parse_cache.rs`.

use std::sync::Arc;

use crate::errors::StorageError;

/// A file metadata record. One row exists per path that existed at the last
/// completed scan; the row is deleted when the scanner reports the file
/// missing.
#[derive(Debug, Clone)]
pub struct FileMetadataRow {
    pub path: String,
    pub language: Option<String>,
    pub file_size: i64,
    pub content_hash: Vec<u8>,
    pub last_scanned_revision: i64,
    pub has_parse_errors: bool,
    pub function_count: i64,
    pub class_count: i64,
    pub error: Option<String>,
}

/// A cached extraction result, keyed by content hash so two files with
/// identical bytes share the same cache entry.
#[derive(Debug, Clone)]
pub struct ParseCacheRow {
    pub content_hash: Vec<u8>,
    pub language: String,
    pub tool_version: String,
    pub file_index_json: String,
    pub created_at: i64,
}

/// File metadata and parse cache storage operations.
///
/// Covers the `file_metadata` and `parse_cache` tables.
pub trait IDriftFiles: Send + Sync {
    /// Load all file metadata, used to compute the scanner's change set
    /// against the previous scan.
    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError>;

    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError>;

    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError>;

    /// Remove a file's metadata row. Called when the scanner reports the
    /// path missing; does not cascade — derived rows are cleaned up by the
    /// next aggregation pass.
    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError>;

    fn update_file_error(
        &self,
        path: &str,
        error_msg: Option<&str>,
    ) -> Result<(), StorageError>;

    fn count_files(&self) -> Result<i64, StorageError>;

    /// Look up a cached extraction by content hash. Callers must also check
    /// `tool_version` — a mismatch means the cache entry predates the
    /// current extractor and must be treated as a miss.
    fn get_parse_cache_by_hash(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<ParseCacheRow>, StorageError>;

    fn insert_parse_cache(&self, row: &ParseCacheRow) -> Result<(), StorageError>;

    fn invalidate_parse_cache(&self, content_hash: &[u8]) -> Result<(), StorageError>;

    /// Drop every cache entry not stamped with `tool_version`, run once at
    /// startup after a tool upgrade.
    fn evict_stale_tool_version(&self, tool_version: &str) -> Result<u64, StorageError>;

    fn count_parse_cache(&self) -> Result<i64, StorageError>;
}

impl<T: IDriftFiles + ?Sized> IDriftFiles for Arc<T> {
    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
        (**self).load_all_file_metadata()
    }
    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
        (**self).get_file_metadata(path)
    }
    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError> {
        (**self).upsert_file_metadata(row)
    }
    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete_file_metadata(path)
    }
    fn update_file_error(&self, path: &str, error_msg: Option<&str>) -> Result<(), StorageError> {
        (**self).update_file_error(path, error_msg)
    }
    fn count_files(&self) -> Result<i64, StorageError> {
        (**self).count_files()
    }
    fn get_parse_cache_by_hash(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<ParseCacheRow>, StorageError> {
        (**self).get_parse_cache_by_hash(content_hash)
    }
    fn insert_parse_cache(&self, row: &ParseCacheRow) -> Result<(), StorageError> {
        (**self).insert_parse_cache(row)
    }
    fn invalidate_parse_cache(&self, content_hash: &[u8]) -> Result<(), StorageError> {
        (**self).invalidate_parse_cache(content_hash)
    }
    fn evict_stale_tool_version(&self, tool_version: &str) -> Result<u64, StorageError> {
        (**self).evict_stale_tool_version(tool_version)
    }
    fn count_parse_cache(&self) -> Result<i64, StorageError> {
        (**self).count_parse_cache()
    }
}
