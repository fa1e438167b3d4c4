//! Configuration surface.
//!
//! `DriftConfig` is the single struct every component reads from. It is
//! assembled by layering, in order: compiled-in defaults, a repo-root
//! `drift.toml`/`.drift.toml`, and (for the taint registry only) user
//! entries merged by id on top of the built-in registry shipped with
//! `drift-analysis`.

pub mod detector_config;
pub mod gates;
pub mod parser_config;
pub mod scan_config;
pub mod taint_config;
pub mod thresholds;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::config_error::ConfigError;
pub use detector_config::{DetectorCategory, DetectorConfig};
pub use gates::{GateConfig, Severity};
pub use parser_config::ParserConfig;
pub use scan_config::ScanConfig;
pub use taint_config::TaintRegistryConfig;
pub use thresholds::Thresholds;

/// Root configuration, deserialized from a `drift.toml` at the workspace
/// root. Every field has a default, so an empty or absent file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub scan: ScanConfig,
    pub parser: ParserConfig,
    pub detectors: DetectorConfig,
    pub thresholds: Thresholds,
    pub gates: GateConfig,
    pub taint: TaintRegistryConfig,
}

impl DriftConfig {
    /// Parse a `drift.toml` document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::from)
    }

    /// Load and parse a config file from disk. Returns `Ok(None)` if the
    /// path doesn't exist, so callers can fall back to `DriftConfig::default()`
    /// without treating a missing file as an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ConfigError::ReadFailed {
                path: path.display().to_string(),
                source: err,
            }),
        }
    }

    /// Search `dir` and its ancestors for `drift.toml` or `.drift.toml`,
    /// returning the first match loaded, or `None` if neither is found
    /// anywhere up to the filesystem root.
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        for ancestor in dir.ancestors() {
            for name in ["drift.toml", ".drift.toml"] {
                let candidate = ancestor.join(name);
                if candidate.is_file() {
                    return Self::load(&candidate);
                }
            }
        }
        Ok(None)
    }

    /// Layer `user` on top of the built-in taint registry `base` ships with;
    /// every other section in `user` simply replaces `self`'s, since those
    /// sections don't carry an independent built-in set to merge against.
    pub fn merge_taint_registry(mut self, base: TaintRegistryConfig) -> Self {
        self.taint = base.merge(self.taint);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_all_defaults() {
        let cfg = DriftConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.scan.max_file_size, 1_048_576);
        assert_eq!(cfg.thresholds.pattern_min_files, 5);
        assert_eq!(cfg.gates.fail_on, Severity::Error);
    }

    #[test]
    fn partial_section_keeps_remaining_defaults() {
        let cfg = DriftConfig::from_toml_str(
            r#"
            [scan]
            max_file_size = 2097152

            [thresholds]
            pattern_min_files = 8
            "#,
        )
        .unwrap();
        assert_eq!(cfg.scan.max_file_size, 2_097_152);
        assert!(!cfg.scan.follow_symlinks);
        assert_eq!(cfg.thresholds.pattern_min_files, 8);
        assert_eq!(cfg.thresholds.pattern_min_occurrences, 10);
    }

    #[test]
    fn taint_registry_merges_by_id_over_base() {
        let base = TaintRegistryConfig {
            sources: vec![taint_config::SourceSpec {
                id: "http-request".into(),
                pattern: "request.args".into(),
                label: "http".into(),
            }],
            sinks: Vec::new(),
            sanitizers: Vec::new(),
            propagators: Vec::new(),
        };
        let cfg = DriftConfig::from_toml_str(
            r#"
            [[taint.sources]]
            id = "http-request"
            pattern = "req.query"
            label = "http"

            [[taint.sources]]
            id = "env-var"
            pattern = "std::env::var"
            label = "env"
            "#,
        )
        .unwrap()
        .merge_taint_registry(base);

        assert_eq!(cfg.taint.sources.len(), 2);
        let http = cfg
            .taint
            .sources
            .iter()
            .find(|s| s.id == "http-request")
            .unwrap();
        assert_eq!(http.pattern, "req.query");
    }

    #[test]
    fn discover_finds_config_in_ancestor_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("drift.toml"),
            "[scan]\nmax_file_size = 4096\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        let cfg = DriftConfig::discover(&nested).unwrap().unwrap();
        assert_eq!(cfg.scan.max_file_size, 4096);
    }

    #[test]
    fn discover_returns_none_without_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DriftConfig::discover(dir.path()).unwrap().is_none());
    }
}
