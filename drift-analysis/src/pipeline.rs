//! `scan(root, options)`): strings the scan → parse → extract → resolve →
//! aggregate → commit phases together behind one call, throttling progress
//! through `EventDispatcher` and honoring `CancellationToken` at per-file
//! granularity.
//!
//! handler argument shape) and `drift-storage`'s channel-fed `BatchWriter`
//! : this is the missing piece that drives both, plus
//! `engine::extract`, `call_graph::build_call_edges`, and
//! functions are committed before any call edge referencing them, so
//! `SymbolLookup::function_id` can resolve across the whole project.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use drift_core::config::DriftConfig;
use drift_core::errors::{ScanError, StorageError};
use drift_core::events::dispatcher::EventDispatcher;
use drift_core::events::handler::DriftEventHandler;
use drift_core::events::types::Phase;
use drift_core::traits::cancellation::CancellationToken;
use drift_core::traits::storage::drift_analysis::{ClassRow, FunctionRow, PatternRow, ScanCounts};
use drift_core::traits::storage::drift_batch::{IDriftBatchWriter, WriteBatch};
use drift_core::traits::storage::drift_files::FileMetadataRow;
use drift_core::traits::storage::KnowledgeStore;
use drift_core::types::collections::FxHashMap;
use drift_core::types::revision::RevisionCounter;

use crate::call_graph::build_call_edges;
use crate::contracts::{self, ContractField};
use crate::engine::file_index::{ClassRecord, FunctionRecord};
use crate::engine::{self, FileIndex};
use crate::parsers::ParserPool;
use crate::patterns::aggregate;
use crate::scanner::{FileMeta, Language, PriorHashes, Scanner};
use crate::{boundaries, secrets, taint};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub scan_id: i64,
    pub files_added: usize,
    pub files_modified: usize,
    pub files_removed: usize,
    pub files_unchanged: usize,
    /// Per-file failures that did not abort the scan.
    pub per_file_errors: Vec<(String, String)>,
    pub patterns_found: usize,
    pub secrets_found: usize,
    pub boundaries_found: usize,
    pub contracts_found: usize,
    pub violations_found: usize,
    pub partial: bool,
    pub duration_ms: u64,
}

/// Drives one full scan/parse/extract/resolve/aggregate/commit pass over
/// `root` against a single Knowledge Store connection. `S` is the one
/// concrete type implementing both `KnowledgeStore` and
/// `IDriftBatchWriter` (`drift-storage`'s `DriftStorageEngine` in
/// practice) — kept generic so the pipeline never depends on the storage
/// crate's concrete type directly.
pub struct Pipeline<S: KnowledgeStore + IDriftBatchWriter> {
    store: Arc<S>,
    revision: Arc<RevisionCounter>,
    tool_version: String,
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn function_rows(file: &str, index: &FileIndex) -> Vec<FunctionRow> {
    index.functions.iter().map(|f: &FunctionRecord| FunctionRow {
        id: 0,
        file: file.to_string(),
        name: f.name.clone(),
        qualified_name: f.qualified_name.clone(),
        language: index.language.as_str().to_string(),
        line: f.location.line as i64,
        end_line: f.location.end_line as i64,
        signature_json: serde_json::to_string(&f.parameters).unwrap_or_default(),
        return_type: f.return_type.clone(),
        decorators_json: serde_json::to_string(&f.decorators).unwrap_or_default(),
        is_exported: f.is_exported,
        is_async: f.is_async,
        is_entry_point: f.is_entry_point,
        doc_comment: f.doc_comment.clone(),
        body_hash: f.body_hash.to_vec(),
        signature_hash: f.signature_hash.to_vec(),
    }).collect()
}

fn class_rows(file: &str, index: &FileIndex) -> Vec<ClassRow> {
    index.classes.iter().map(|c: &ClassRecord| ClassRow {
        id: 0,
        file: file.to_string(),
        name: c.name.clone(),
        kind: c.kind.as_str().to_string(),
        base_types_json: serde_json::to_string(&c.base_types).unwrap_or_default(),
        implemented_interfaces_json: serde_json::to_string(&c.implemented_interfaces).unwrap_or_default(),
        properties_json: serde_json::to_string(&c.properties).unwrap_or_default(),
        decorators_json: serde_json::to_string(&c.decorators).unwrap_or_default(),
        line: c.location.line as i64,
        end_line: c.location.end_line as i64,
    }).collect()
}

impl<S: KnowledgeStore + IDriftBatchWriter> Pipeline<S> {
    pub fn new(store: Arc<S>, tool_version: impl Into<String>, revision: Arc<RevisionCounter>) -> Self {
        Self { store, revision, tool_version: tool_version.into() }
    }

    /// Run one scan. `frameworks_enabled` and `custom_boundary_rules`
    /// typically come from `workspace::detect::detect_frameworks` and the
    /// user's `drift.toml` respectively — this pipeline is a pure function
    /// of what it's handed, it never re-derives project facts itself.
    pub fn run(
        &self,
        root: &Path,
        config: &DriftConfig,
        frameworks_enabled: &FxHashMap<String, bool>,
        custom_boundary_rules: &[(String, String)],
        token: &CancellationToken,
        events: &dyn DriftEventHandler,
    ) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        let dispatcher = EventDispatcher::new(events);

        let prior = self.load_prior_hashes()?;
        let change_set = Scanner::new(config.scan.clone()).scan(root, &prior, token, events)?;

        let started_at = now_unix();
        let scan_id = self.store.begin_scan(&root.display().to_string(), self.revision.current() as i64, started_at)?;

        let parser_pool = ParserPool::new(self.tool_version.clone());
        let mut file_indexes: Vec<(String, FileIndex)> = Vec::new();
        let mut per_file_errors = Vec::new();

        for meta in change_set.files_to_process() {
            if token.is_cancelled() {
                break;
            }
            dispatcher.record_file_seen();

            let Some(language) = meta.language else {
                dispatcher.record_processed(Phase::Extract);
                continue;
            };
            let path_str = meta.absolute_path.display().to_string();

            match self.extract_one(&meta.absolute_path, &path_str, language, &parser_pool, frameworks_enabled) {
                Ok(index) => {
                    self.store.upsert_file_metadata(&self.file_metadata_row(&path_str, language, meta, &index, None))?;
                    file_indexes.push((path_str, index));
                }
                Err(message) => {
                    let empty = FileIndex::empty(path_str.clone(), language, meta.content_hash);
                    self.store.upsert_file_metadata(&self.file_metadata_row(&path_str, language, meta, &empty, Some(message.clone())))?;
                    per_file_errors.push((path_str, message));
                    dispatcher.record_error();
                }
            }
            dispatcher.record_processed(Phase::Extract);
        }

        for path in &change_set.removed {
            let path_str = path.display().to_string();
            self.store.delete_functions_for_file(&path_str)?;
            self.store.delete_classes_for_file(&path_str)?;
            self.store.delete_file_metadata(&path_str)?;
        }

        // Functions and classes land before call edges, so every edge's
        // endpoints are already resolvable through `SymbolLookup`.
        for (file, index) in &file_indexes {
            self.store.send(WriteBatch::Functions { file: file.clone(), rows: function_rows(file, index) })?;
            self.store.send(WriteBatch::Classes { file: file.clone(), rows: class_rows(file, index) })?;
        }
        self.store.flush_sync()?;

        let edges = build_call_edges(&file_indexes, self.store.as_ref(), &config.thresholds);
        for (file, rows) in edges {
            self.store.send(WriteBatch::CallEdges { file, rows })?;
        }

        let mut secrets_found = 0usize;
        let mut boundaries_found = 0usize;
        let mut violations_found = 0usize;
        let secret_matcher = secrets::build_matcher();
        for (file, index) in &file_indexes {
            let secret_rows = secrets::detect(index, &secret_matcher, &config.thresholds);
            secrets_found += secret_rows.len();
            self.store.send(WriteBatch::Secrets { file: file.clone(), rows: secret_rows })?;

            let boundary_rows = boundaries::detect(index, custom_boundary_rules);
            boundaries_found += boundary_rows.len();
            self.store.send(WriteBatch::Boundaries { file: file.clone(), rows: boundary_rows })?;

            let violation_rows = taint::detect(index, &config.taint, started_at);
            if !violation_rows.is_empty() {
                violations_found += violation_rows.len();
                self.store.send(WriteBatch::Violations(violation_rows))?;
            }
        }

        let contracts_found = self.commit_contracts(&file_indexes, started_at)?;

        let existing_patterns = self.load_existing_patterns()?;
        let total_project_files = change_set.total_seen() as u64;
        let (pattern_rows, locations) = aggregate(&file_indexes, &existing_patterns, &config.thresholds, total_project_files, started_at);
        let patterns_found = pattern_rows.len();
        dispatcher.record_patterns(patterns_found);
        self.store.send(WriteBatch::Patterns(pattern_rows))?;
        for (pattern_id, rows) in locations {
            self.store.send(WriteBatch::PatternLocations { pattern_id, rows })?;
        }

        self.store.send(WriteBatch::Flush)?;
        self.store.flush_sync()?;

        let partial = token.is_cancelled();
        let completed_at = now_unix();
        self.store.complete_scan(
            scan_id,
            completed_at,
            ScanCounts {
                total_files: change_set.total_seen() as i64,
                added_files: change_set.added.len() as i64,
                modified_files: change_set.modified.len() as i64,
                removed_files: change_set.removed.len() as i64,
                unchanged_files: change_set.unchanged.len() as i64,
            },
            partial,
            None,
        )?;

        self.revision.advance();
        dispatcher.emit(Phase::Commit);

        Ok(PipelineOutcome {
            scan_id,
            files_added: change_set.added.len(),
            files_modified: change_set.modified.len(),
            files_removed: change_set.removed.len(),
            files_unchanged: change_set.unchanged.len(),
            per_file_errors,
            patterns_found,
            secrets_found,
            boundaries_found,
            contracts_found,
            violations_found,
            partial,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn load_prior_hashes(&self) -> Result<PriorHashes, PipelineError> {
        let rows = self.store.load_all_file_metadata()?;
        let mut prior = PriorHashes::default();
        for row in rows {
            let mut hash = [0u8; 8];
            let len = row.content_hash.len().min(8);
            hash[..len].copy_from_slice(&row.content_hash[..len]);
            prior.insert(PathBuf::from(row.path), hash);
        }
        Ok(prior)
    }

    fn load_existing_patterns(&self) -> Result<FxHashMap<String, PatternRow>, PipelineError> {
        let mut map = FxHashMap::default();
        let mut cursor = None;
        loop {
            let (rows, next) = self.store.list_patterns(None, None, cursor, 500)?;
            let page_len = rows.len();
            for row in rows {
                map.insert(row.pattern_id.clone(), row);
            }
            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
            if page_len == 0 {
                break;
            }
        }
        Ok(map)
    }

    fn extract_one(
        &self,
        path: &Path,
        path_str: &str,
        language: Language,
        pool: &ParserPool,
        frameworks_enabled: &FxHashMap<String, bool>,
    ) -> Result<FileIndex, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        let parsed = pool.parse(language, &bytes).map_err(|e| e.to_string())?;
        Ok(engine::extract(path_str, &bytes, &parsed, frameworks_enabled))
    }

    fn file_metadata_row(&self, path: &str, language: Language, meta: &FileMeta, index: &FileIndex, error: Option<String>) -> FileMetadataRow {
        FileMetadataRow {
            path: path.to_string(),
            language: Some(language.as_str().to_string()),
            file_size: meta.size as i64,
            content_hash: meta.content_hash.to_vec(),
            last_scanned_revision: self.revision.current() as i64,
            has_parse_errors: !index.parse_errors.is_empty(),
            function_count: index.functions.len() as i64,
            class_count: index.classes.len() as i64,
            error,
        }
    }

    /// Discover backend routes and frontend HTTP-client calls project-wide
    /// and match them by `(method, normalised_path)`. `backend_fields` is
    /// left empty: extracting a route handler's actual response shape
    /// would require data-flow analysis this extractor doesn't do, so
    /// every committed contract currently carries an empty backend field
    /// tree (status settles to `discovered` rather than `verified`/
    /// `mismatch` until that's filled in — see DESIGN.md).
    fn commit_contracts(&self, file_indexes: &[(String, FileIndex)], now: i64) -> Result<usize, PipelineError> {
        let frontend_calls: Vec<contracts::FrontendCallSite> =
            file_indexes.iter().flat_map(|(_, index)| contracts::discover_frontend_calls(index)).collect();
        let no_fields: Vec<ContractField> = Vec::new();

        let mut count = 0;
        for (file, index) in file_indexes {
            for route in &index.routes {
                let (row, mismatches) = contracts::build_contract(route, file, &no_fields, &frontend_calls, &no_fields, 0.9, 0.5, now);
                self.store.upsert_contract(&row)?;
                self.store.replace_contract_mismatches(&row.id, &mismatches)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::revision::RevisionCounter;
    use drift_storage::DriftStorageEngine;

    struct NullHandler;
    impl DriftEventHandler for NullHandler {}

    #[test]
    fn run_extracts_and_commits_a_single_python_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), b"def greet(name):\n    return name\n").unwrap();

        let store = Arc::new(DriftStorageEngine::open_in_memory().unwrap());
        let revision = Arc::new(RevisionCounter::new());
        let pipeline = Pipeline::new(Arc::clone(&store), "test-tool", revision);

        let config = DriftConfig::default();
        let frameworks_enabled = FxHashMap::default();
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));

        let outcome = pipeline.run(dir.path(), &config, &frameworks_enabled, &[], &token, &NullHandler).unwrap();

        assert_eq!(outcome.files_added, 1);
        assert!(!outcome.partial);
        assert!(outcome.per_file_errors.is_empty());
    }

    #[test]
    fn run_records_a_per_file_error_without_aborting_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), b"def ok():\n    pass\n").unwrap();
        // `.c`/`.cpp` are classified but have no bundled grammar, so this
        // always fails extraction without depending on malformed syntax.
        std::fs::write(dir.path().join("b.c"), b"int main() { return 0; }\n").unwrap();

        let store = Arc::new(DriftStorageEngine::open_in_memory().unwrap());
        let revision = Arc::new(RevisionCounter::new());
        let pipeline = Pipeline::new(Arc::clone(&store), "test-tool", revision);

        let config = DriftConfig::default();
        let frameworks_enabled = FxHashMap::default();
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));

        let outcome = pipeline.run(dir.path(), &config, &frameworks_enabled, &[], &token, &NullHandler).unwrap();

        assert_eq!(outcome.files_added, 2);
        assert_eq!(outcome.per_file_errors.len(), 1);
        assert_eq!(outcome.per_file_errors[0].0, dir.path().join("b.c").display().to_string());
    }
}
