//! Per-language parser toggles and the framework-middleware enable list.

use serde::{Deserialize, Serialize};

use crate::types::collections::FxHashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Languages to parse. Empty means "all supported languages".
    pub languages_enabled: Vec<String>,
    /// Per-language override toggles, e.g. `{"php": false}`.
    pub overrides: FxHashMap<String, bool>,
    /// Framework middleware to force-enable even if heuristic detection
    /// doesn't find the framework in the dependency manifest.
    pub force_frameworks: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            languages_enabled: Vec::new(),
            overrides: FxHashMap::default(),
            force_frameworks: Vec::new(),
        }
    }
}

impl ParserConfig {
    pub fn is_language_enabled(&self, language: &str) -> bool {
        if let Some(&enabled) = self.overrides.get(language) {
            return enabled;
        }
        self.languages_enabled.is_empty() || self.languages_enabled.iter().any(|l| l == language)
    }
}
