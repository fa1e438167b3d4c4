//! Tunable thresholds for the Pattern & Convention Engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum files before a pattern can become a Convention.
    pub pattern_min_files: u32,
    /// Minimum occurrences before a pattern can become a Convention.
    pub pattern_min_occurrences: u32,
    /// Minimum Beta posterior mean before a pattern can become a Convention.
    pub pattern_min_posterior: f64,

    /// z-score magnitude above which a sample is an outlier.
    pub outlier_z_moderate: f64,
    pub outlier_z_high: f64,
    pub outlier_z_critical: f64,
    /// Minimum sample count before outlier detection runs at all.
    pub outlier_min_samples: usize,
    /// Sample count below which Grubbs' test is used instead of z-score.
    pub outlier_grubbs_max_samples: usize,
    /// Cap on masking-mitigation iterations for Grubbs' test.
    pub outlier_max_iterations: usize,

    /// Confidence score weights; must sum to 1.0.
    pub confidence_weight_frequency: f64,
    pub confidence_weight_consistency: f64,
    pub confidence_weight_age: f64,
    pub confidence_weight_spread: f64,
    pub confidence_weight_momentum: f64,

    /// Minimum revisions of frequency history before momentum is computed.
    pub momentum_min_revisions: u32,
    /// Minimum file count in the project before momentum activates.
    pub momentum_min_project_files: u32,

    /// Shannon entropy threshold (bits/char) to flag a secret candidate in
    /// a sensitive variable context, for strings at least 20 chars long.
    pub secret_entropy_threshold: f64,
    pub secret_min_length: usize,

    /// Effective false-positive rate above which a rule is surfaced for
    /// review, and above which it is auto-disabled.
    pub rule_fp_review_threshold: f64,
    pub rule_fp_autodisable_threshold: f64,
    pub rule_fp_window_days: u32,

    /// Depth cap for reachability/impact BFS traversals.
    pub reachability_max_depth: u32,

    /// Fuzzy-name match strategy cutoff — edges below this score are not
    /// emitted.
    pub fuzzy_match_min_score: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pattern_min_files: 5,
            pattern_min_occurrences: 10,
            pattern_min_posterior: 0.7,

            outlier_z_moderate: 2.5,
            outlier_z_high: 3.0,
            outlier_z_critical: 3.5,
            outlier_min_samples: 10,
            outlier_grubbs_max_samples: 30,
            outlier_max_iterations: 3,

            confidence_weight_frequency: 0.30,
            confidence_weight_consistency: 0.25,
            confidence_weight_age: 0.10,
            confidence_weight_spread: 0.15,
            confidence_weight_momentum: 0.20,

            momentum_min_revisions: 3,
            momentum_min_project_files: 50,

            secret_entropy_threshold: 4.5,
            secret_min_length: 20,

            rule_fp_review_threshold: 0.10,
            rule_fp_autodisable_threshold: 0.20,
            rule_fp_window_days: 30,

            reachability_max_depth: 6,

            fuzzy_match_min_score: 0.35,
        }
    }
}
