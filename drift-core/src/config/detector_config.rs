
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DetectorCategory {
    Api,
    Auth,
    Components,
    Config,
    DataAccess,
    Documentation,
    Errors,
    Logging,
    Performance,
    Security,
    Structural,
    Styling,
    Testing,
    Types,
    Validation,
}

impl DetectorCategory {
    pub const ALL: [DetectorCategory; 15] = [
        DetectorCategory::Api,
        DetectorCategory::Auth,
        DetectorCategory::Components,
        DetectorCategory::Config,
        DetectorCategory::DataAccess,
        DetectorCategory::Documentation,
        DetectorCategory::Errors,
        DetectorCategory::Logging,
        DetectorCategory::Performance,
        DetectorCategory::Security,
        DetectorCategory::Structural,
        DetectorCategory::Styling,
        DetectorCategory::Testing,
        DetectorCategory::Types,
        DetectorCategory::Validation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DetectorCategory::Api => "Api",
            DetectorCategory::Auth => "Auth",
            DetectorCategory::Components => "Components",
            DetectorCategory::Config => "Config",
            DetectorCategory::DataAccess => "DataAccess",
            DetectorCategory::Documentation => "Documentation",
            DetectorCategory::Errors => "Errors",
            DetectorCategory::Logging => "Logging",
            DetectorCategory::Performance => "Performance",
            DetectorCategory::Security => "Security",
            DetectorCategory::Structural => "Structural",
            DetectorCategory::Styling => "Styling",
            DetectorCategory::Testing => "Testing",
            DetectorCategory::Types => "Types",
            DetectorCategory::Validation => "Validation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Categories to run. Empty means "all".
    pub categories: Vec<DetectorCategory>,
    /// Only run detectors whose findings can reach `error` severity.
    pub critical_only: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            critical_only: false,
        }
    }
}

impl DetectorConfig {
    pub fn is_enabled(&self, category: DetectorCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }
}
