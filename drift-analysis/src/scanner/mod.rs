//! language classification, and change-set computation against the
//! previously stored file metadata.

pub mod language;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use drift_core::config::ScanConfig;
use drift_core::errors::ScanError;
use drift_core::events::handler::DriftEventHandler;
use drift_core::events::types::{ScanCompleteEvent, ScanErrorEvent, ScanProgressEvent, ScanStartedEvent};
use drift_core::traits::cancellation::CancellationToken;
use drift_core::types::collections::FxHashMap;
use rayon::prelude::*;

pub use language::Language;

/// Metadata the scanner knows about a file without having parsed it.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub absolute_path: PathBuf,
    pub size: u64,
    pub language: Option<Language>,
    pub content_hash: [u8; 8],
}

/// The scanner's change set relative to the stored index.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub added: Vec<FileMeta>,
    pub modified: Vec<FileMeta>,
    pub unchanged: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Per-entry failures that do not abort the scan.
    pub errors: Vec<(PathBuf, String)>,
}

impl ChangeSet {
    pub fn files_to_process(&self) -> impl Iterator<Item = &FileMeta> {
        self.added.iter().chain(self.modified.iter())
    }

    pub fn total_seen(&self) -> usize {
        self.added.len() + self.modified.len() + self.unchanged.len()
    }
}

/// Prior scan state the scanner diffs newly observed files against: path to
/// last-known content hash.
pub type PriorHashes = FxHashMap<PathBuf, [u8; 8]>;

pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Walk `root`, hash and classify every eligible file, and diff against
    /// `prior`. Traversal completes before returning — extraction never
    /// interleaves with the walk.
    pub fn scan(
        &self,
        root: &Path,
        prior: &PriorHashes,
        token: &CancellationToken,
        events: &dyn DriftEventHandler,
    ) -> Result<ChangeSet, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound { path: root.to_path_buf() });
        }

        events.on_scan_started(&ScanStartedEvent { root: root.to_path_buf(), file_count: None });
        let started = Instant::now();

        let entries = match walker::walk(root, &self.config) {
            Ok(entries) => entries,
            Err(err) => {
                events.on_scan_error(&ScanErrorEvent { message: err.to_string() });
                return Err(err);
            }
        };

        let total = entries.len();
        let processed = AtomicUsize::new(0);

        let results: Vec<Result<(PathBuf, FileMeta), (PathBuf, String)>> = entries
            .par_iter()
            .filter_map(|entry| {
                if token.is_cancelled() {
                    return None;
                }
                let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if count % 100 == 0 {
                    events.on_scan_progress(&ScanProgressEvent { processed: count, total });
                }
                Some(classify(entry, &self.config))
            })
            .collect();

        let mut change_set = ChangeSet::default();
        let mut seen_paths = FxHashMap::default();

        for result in results {
            match result {
                Ok((path, meta)) => {
                    seen_paths.insert(path.clone(), ());
                    match prior.get(&path) {
                        Some(prior_hash) if *prior_hash == meta.content_hash => {
                            change_set.unchanged.push(path);
                        }
                        Some(_) => change_set.modified.push(meta),
                        None => change_set.added.push(meta),
                    }
                }
                Err((path, message)) => {
                    tracing::warn!(path = %path.display(), error = %message, "scan entry error");
                    change_set.errors.push((path, message));
                }
            }
        }

        for prior_path in prior.keys() {
            if !seen_paths.contains_key(prior_path) {
                change_set.removed.push(prior_path.clone());
            }
        }

        change_set.added.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));
        change_set.modified.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));
        change_set.unchanged.sort();
        change_set.removed.sort();

        events.on_scan_complete(&ScanCompleteEvent {
            added: change_set.added.len(),
            modified: change_set.modified.len(),
            removed: change_set.removed.len(),
            unchanged: change_set.unchanged.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        });

        Ok(change_set)
    }
}

fn classify(
    path: &Path,
    config: &ScanConfig,
) -> Result<(PathBuf, FileMeta), (PathBuf, String)> {
    let metadata = std::fs::metadata(path).map_err(|e| (path.to_path_buf(), e.to_string()))?;
    let size = metadata.len();
    if size > config.max_file_size {
        return Err((path.to_path_buf(), format!("exceeds max_file_size ({size} bytes)")));
    }

    let language = language::detect(path);

    let content_hash = if config.compute_hashes {
        let bytes = std::fs::read(path).map_err(|e| (path.to_path_buf(), e.to_string()))?;
        xxhash_rust::xxh3::xxh3_64(&bytes).to_le_bytes()
    } else {
        [0u8; 8]
    };

    Ok((
        path.to_path_buf(),
        FileMeta {
            absolute_path: path.to_path_buf(),
            size,
            language,
            content_hash,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::traits::cancellation::CancellationToken;
    use drift_core::types::revision::RevisionCounter;
    use std::sync::Arc;

    struct NullHandler;
    impl DriftEventHandler for NullHandler {}

    #[test]
    fn scan_missing_root_is_path_not_found() {
        let scanner = Scanner::new(ScanConfig::default());
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));
        let result = scanner.scan(Path::new("/no/such/path"), &FxHashMap::default(), &token, &NullHandler);
        assert!(matches!(result, Err(ScanError::PathNotFound { .. })));
    }

    #[test]
    fn scan_classifies_added_and_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), b"def f(): pass\n").unwrap();
        std::fs::write(dir.path().join("b.py"), b"def g(): pass\n").unwrap();

        let scanner = Scanner::new(ScanConfig::default());
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));
        let first = scanner
            .scan(dir.path(), &FxHashMap::default(), &token, &NullHandler)
            .unwrap();
        assert_eq!(first.added.len(), 2);
        assert!(first.modified.is_empty());

        let mut prior = FxHashMap::default();
        for meta in &first.added {
            prior.insert(meta.absolute_path.clone(), meta.content_hash);
        }

        std::fs::write(dir.path().join("a.py"), b"def f(): return 1\n").unwrap();
        let second = scanner.scan(dir.path(), &prior, &token, &NullHandler).unwrap();
        assert_eq!(second.modified.len(), 1);
        assert_eq!(second.unchanged.len(), 1);
        assert!(second.added.is_empty());
    }

    #[test]
    fn scan_reports_removed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), b"x = 1\n").unwrap();
        let scanner = Scanner::new(ScanConfig::default());
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));
        let first = scanner.scan(dir.path(), &FxHashMap::default(), &token, &NullHandler).unwrap();
        let mut prior = FxHashMap::default();
        for meta in &first.added {
            prior.insert(meta.absolute_path.clone(), meta.content_hash);
        }
        prior.insert(dir.path().join("deleted.py"), [0u8; 8]);

        let second = scanner.scan(dir.path(), &prior, &token, &NullHandler).unwrap();
        assert_eq!(second.removed, vec![dir.path().join("deleted.py")]);
    }
}
