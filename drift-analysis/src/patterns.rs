//! Pattern & Convention Engine: the seven-phase aggregation reduction,
//! Bayesian confidence scoring, and outlier detection. Contract matching,
//! boundary detection, and secret scanning live in
//! `contracts.rs`/`boundaries.rs`/`secrets.rs` — this module is the
//! convention-learning core the other three share the `Thresholds` config
//! with.
//!
//! Seven phases, two outlier methods (z-score for `n >= 30`, Grubbs' test
//! for `10 <= n < 30`): enough to classify a convention's status and flag
//! its outliers without a heavier dedup/clustering machine on top.

use drift_core::config::thresholds::Thresholds;
use drift_core::traits::storage::drift_analysis::{OutlierRow, PatternLocationRow, PatternRow};
use drift_core::types::collections::FxHashMap;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::engine::file_index::FileIndex;

/// One of the fifteen convention categories a pattern can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
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

impl PatternCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Auth => "auth",
            Self::Components => "components",
            Self::Config => "config",
            Self::DataAccess => "data_access",
            Self::Documentation => "documentation",
            Self::Errors => "errors",
            Self::Logging => "logging",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Structural => "structural",
            Self::Styling => "styling",
            Self::Testing => "testing",
            Self::Types => "types",
            Self::Validation => "validation",
        }
    }
}

/// A single raw occurrence of a convention, before grouping/dedup.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub detector_id: String,
    pub category: PatternCategory,
    pub subcategory: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub enclosing_function: Option<String>,
    pub enclosing_class: Option<String>,
    pub matched_text: Option<String>,
}

const LOGGER_CALLEES: &[&str] = &["log", "info", "warn", "error", "debug", "trace"];

/// Harvest `RawDetection`s this engine can ground directly in `FileIndex`
/// fields: error-handling shape, logging call style, route/model framework
/// choice, and doc-comment presence. The remaining categories (Auth,
/// Components, Config, Performance, Security, Styling, Testing, Types,
/// Validation) are legitimate extension points — they need detectors of
/// their own, not a reinterpretation of existing `FileIndex` records, so
/// they are left for a future detector pass rather than stubbed here.
pub fn extract_raw_detections(index: &FileIndex) -> Vec<RawDetection> {
    let mut detections = Vec::new();

    for record in &index.error_handling {
        let subcategory = if record.caught_types.is_empty() {
            "generic_catch".to_string()
        } else {
            let mut types = record.caught_types.clone();
            types.sort();
            types.join("+")
        };
        detections.push(RawDetection {
            detector_id: "error_handling_shape".to_string(),
            category: PatternCategory::Errors,
            subcategory,
            file: index.file_path.clone(),
            line: record.location.line,
            column: record.location.column,
            enclosing_function: None,
            enclosing_class: None,
            matched_text: None,
        });
    }

    for call in &index.calls {
        let method = call.callee_text.rsplit('.').next().unwrap_or(&call.callee_text);
        if LOGGER_CALLEES.contains(&method) {
            detections.push(RawDetection {
                detector_id: "logging_call_style".to_string(),
                category: PatternCategory::Logging,
                subcategory: method.to_string(),
                file: index.file_path.clone(),
                line: call.location.line,
                column: call.location.column,
                enclosing_function: call.enclosing_function.clone(),
                enclosing_class: None,
                matched_text: Some(call.callee_text.clone()),
            });
        }
    }

    for route in &index.routes {
        detections.push(RawDetection {
            detector_id: "route_framework_choice".to_string(),
            category: PatternCategory::Api,
            subcategory: route.framework.clone(),
            file: index.file_path.clone(),
            line: route.location.line,
            column: route.location.column,
            enclosing_function: route.handler_qualified_name.clone(),
            enclosing_class: None,
            matched_text: Some(route.raw_path.clone()),
        });
    }

    for model in &index.models {
        detections.push(RawDetection {
            detector_id: "orm_framework_choice".to_string(),
            category: PatternCategory::DataAccess,
            subcategory: model.framework.clone(),
            file: index.file_path.clone(),
            line: model.location.line,
            column: model.location.column,
            enclosing_function: None,
            enclosing_class: Some(model.model_name.clone()),
            matched_text: None,
        });
    }

    for function in &index.functions {
        let subcategory = if function.doc_comment.is_some() { "documented" } else { "undocumented" };
        detections.push(RawDetection {
            detector_id: "doc_comment_presence".to_string(),
            category: PatternCategory::Documentation,
            subcategory: subcategory.to_string(),
            file: index.file_path.clone(),
            line: function.location.line,
            column: function.location.column,
            enclosing_function: Some(function.qualified_name.clone()),
            enclosing_class: function.enclosing_class.clone(),
            matched_text: None,
        });
    }

    detections
}

#[derive(Debug, Clone)]
struct DedupedGroup {
    detector_id: String,
    category: PatternCategory,
    subcategory: String,
    locations: Vec<PatternLocationRow>,
    file_spread: i64,
}

/// Phases 1–2: group by `(detector_id, category, subcategory)`, then
/// deduplicate within each group by `(file, line, column)` plus the
/// semantic key `(enclosing_function, enclosing_class)`.
fn group_and_dedupe(detections: &[RawDetection]) -> Vec<DedupedGroup> {
    let mut groups: FxHashMap<(String, &'static str, String), Vec<&RawDetection>> = FxHashMap::default();
    for detection in detections {
        groups.entry((detection.detector_id.clone(), detection.category.as_str(), detection.subcategory.clone())).or_default().push(detection);
    }

    groups
        .into_iter()
        .map(|((detector_id, category_str, subcategory), members)| {
            let category = members[0].category;
            debug_assert_eq!(category.as_str(), category_str);

            let mut seen: std::collections::HashSet<(String, u32, u32, Option<String>, Option<String>)> = std::collections::HashSet::new();
            let mut locations = Vec::new();
            let mut files = std::collections::HashSet::new();
            for detection in members {
                let key = (detection.file.clone(), detection.line, detection.column, detection.enclosing_function.clone(), detection.enclosing_class.clone());
                if !seen.insert(key) {
                    continue;
                }
                files.insert(detection.file.clone());
                locations.push(PatternLocationRow {
                    pattern_id: String::new(),
                    file: detection.file.clone(),
                    line: detection.line as i64,
                    column: detection.column as i64,
                    enclosing_function: detection.enclosing_function.clone(),
                    enclosing_class: detection.enclosing_class.clone(),
                });
            }

            DedupedGroup { detector_id, category, subcategory, file_spread: files.len() as i64, locations }
        })
        .collect()
}

/// Beta posterior update: prior Beta(1,1); posterior
/// Beta(1+successes, 1+failures).
pub fn beta_update(successes: u64, failures: u64) -> (f64, f64) {
    let alpha = 1.0 + successes as f64;
    let beta = 1.0 + failures as f64;
    (alpha, beta)
}

pub fn posterior_mean(alpha: f64, beta: f64) -> f64 {
    alpha / (alpha + beta)
}

/// Momentum: normalised first difference of frequency across the last
/// ≥3 revisions where total project file count ≥ `momentum_min_project_files`
/// . With only the immediately prior posterior mean
/// available (no stored frequency series), this approximates the first
/// difference as `current - previous`; a genuine multi-revision series is
/// left to the Knowledge Store's trend materialised view.
pub fn momentum(previous_posterior_mean: Option<f64>, current_posterior_mean: f64, revision_count: u32, total_project_files: u64, thresholds: &Thresholds) -> f64 {
    if revision_count < thresholds.momentum_min_revisions || total_project_files < thresholds.momentum_min_project_files as u64 {
        return 0.0;
    }
    match previous_posterior_mean {
        Some(previous) => current_posterior_mean - previous,
        None => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStatus {
    Universal,
    ProjectSpecific,
    Emerging,
    Legacy,
    Contested,
}

impl PatternStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Universal => "Universal",
            Self::ProjectSpecific => "ProjectSpecific",
            Self::Emerging => "Emerging",
            Self::Legacy => "Legacy",
            Self::Contested => "Contested",
        }
    }
}

/// Phase 6: classify status. `competing_share` is
/// the dominance fraction of the strongest rival value in the same
/// category/subcategory family, when one exists — needed to detect
/// Contested (two competing values each at 40-60%).
pub fn classify_status(posterior_mean: f64, momentum: f64, was_dominant: bool, competing_share: Option<f64>) -> PatternStatus {
    if let Some(share) = competing_share {
        if (0.40..=0.60).contains(&share) && (0.40..=0.60).contains(&posterior_mean) {
            return PatternStatus::Contested;
        }
    }
    if posterior_mean > 0.90 {
        PatternStatus::Universal
    } else if posterior_mean > 0.60 {
        PatternStatus::ProjectSpecific
    } else if momentum > 0.0 {
        PatternStatus::Emerging
    } else if was_dominant && momentum < 0.0 {
        PatternStatus::Legacy
    } else {
        PatternStatus::Emerging
    }
}

/// Phase 7: `0.30·frequency + 0.25·consistency + 0.10·age_factor +
/// 0.15·spread + 0.20·momentum`, weights configurable via `Thresholds`.
pub fn confidence_score(thresholds: &Thresholds, frequency: f64, consistency: f64, age_factor: f64, spread: f64, momentum: f64) -> f64 {
    thresholds.confidence_weight_frequency * frequency
        + thresholds.confidence_weight_consistency * consistency
        + thresholds.confidence_weight_age * age_factor
        + thresholds.confidence_weight_spread * spread
        + thresholds.confidence_weight_momentum * momentum
}

/// Run the full seven-phase reduction over every file's raw detections for
/// this scan, producing upsertable `PatternRow`s plus their deduplicated
/// locations. `existing` supplies each pattern's prior posterior mean (for
/// momentum) and prior alpha/beta (for the Beta update), keyed by
pub fn aggregate(
    file_indexes: &[(String, FileIndex)],
    existing: &FxHashMap<String, PatternRow>,
    thresholds: &Thresholds,
    total_project_files: u64,
    now: i64,
) -> (Vec<PatternRow>, FxHashMap<String, Vec<PatternLocationRow>>) {
    let detections: Vec<RawDetection> = file_indexes.iter().flat_map(|(_, index)| extract_raw_detections(index)).collect();
    let groups = group_and_dedupe(&detections);

    let mut category_totals: FxHashMap<&'static str, i64> = FxHashMap::default();
    for group in &groups {
        *category_totals.entry(group.category.as_str()).or_insert(0) += group.locations.len() as i64;
    }

    let mut rows = Vec::new();
    let mut locations_by_pattern: FxHashMap<String, Vec<PatternLocationRow>> = FxHashMap::default();

    for group in &groups {
        let evidence_count = group.locations.len() as i64;
        if (evidence_count as u64) < thresholds.pattern_min_occurrences as u64 || group.file_spread < thresholds.pattern_min_files as i64 {
            continue;
        }

        let pattern_id = format!("{}:{}:{}", group.detector_id, group.category.as_str(), group.subcategory);
        let prior = existing.get(&pattern_id);
        let prior_alpha = prior.map(|p| p.alpha).unwrap_or(1.0);
        let prior_beta = prior.map(|p| p.beta).unwrap_or(1.0);

        let alpha = prior_alpha + evidence_count as f64;
        let beta = prior_beta;
        let posterior = posterior_mean(alpha, beta);
        if posterior < thresholds.pattern_min_posterior {
            continue;
        }

        let revision_count = prior.map(|_| thresholds.momentum_min_revisions).unwrap_or(0);
        let mom = momentum(prior.map(|p| p.posterior_mean), posterior, revision_count, total_project_files, thresholds);

        let category_total = *category_totals.get(group.category.as_str()).unwrap_or(&1);
        let dominance = evidence_count as f64 / category_total.max(1) as f64;
        let status = classify_status(posterior, mom, prior.map(|p| p.status == "Universal" || p.status == "ProjectSpecific").unwrap_or(false), Some(dominance));

        let frequency = (evidence_count as f64 / thresholds.pattern_min_occurrences.max(1) as f64).min(1.0);
        let spread_fraction = (group.file_spread as f64 / thresholds.pattern_min_files.max(1) as f64).min(1.0);
        let age_factor = if prior.is_some() { 1.0 } else { 0.0 };
        let confidence = confidence_score(thresholds, frequency, posterior, age_factor, spread_fraction, mom.max(0.0));

        rows.push(PatternRow {
            pattern_id: pattern_id.clone(),
            category: group.category.as_str().to_string(),
            evidence_count,
            module_spread: group.file_spread,
            alpha,
            beta,
            posterior_mean: posterior,
            momentum: mom,
            status: status.as_str().to_string(),
            confidence_score: confidence,
            discovered_at: prior.map(|p| p.discovered_at).unwrap_or(now),
            last_updated: now,
        });

        let located = group.locations.iter().cloned().map(|mut loc| {
            loc.pattern_id = pattern_id.clone();
            loc
        }).collect();
        locations_by_pattern.insert(pattern_id, located);
    }

    (rows, locations_by_pattern)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    Moderate,
    High,
    Critical,
}

impl Significance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

fn significance_for(z: f64, thresholds: &Thresholds) -> Option<Significance> {
    let abs_z = z.abs();
    if abs_z > thresholds.outlier_z_critical {
        Some(Significance::Critical)
    } else if abs_z > thresholds.outlier_z_high {
        Some(Significance::High)
    } else if abs_z > thresholds.outlier_z_moderate {
        Some(Significance::Moderate)
    } else {
        None
    }
}

fn mean_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// detection"): `|z| > 2.5/3.0/3.5` for moderate/high/critical.
fn zscore_outliers(values: &[f64], thresholds: &Thresholds) -> Vec<(usize, f64, Significance)> {
    let (mean, stddev) = mean_stddev(values);
    if stddev <= 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .filter_map(|(idx, &v)| {
            let z = (v - mean) / stddev;
            significance_for(z, thresholds).map(|sig| (idx, z, sig))
        })
        .collect()
}

const GRUBBS_ALPHA: f64 = 0.05;

/// Grubbs' test critical value for the most extreme value in a sample of
/// size `n` at significance `alpha` (two-sided).
fn grubbs_critical_value(n: usize, alpha: f64) -> f64 {
    let n_f = n as f64;
    let df = (n - 2) as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df).expect("df > 0 for n >= 3");
    let p = alpha / (2.0 * n_f);
    let t_critical = t_dist.inverse_cdf(1.0 - p);
    ((n_f - 1.0) / n_f.sqrt()) * (t_critical * t_critical / (df - 1.0 + t_critical * t_critical)).sqrt()
}

/// detection"), run iteratively (remove the most extreme flagged value,
/// re-test the remainder) up to `outlier_max_iterations` times to mitigate
/// masking.
fn grubbs_outliers(values: &[f64], thresholds: &Thresholds) -> Vec<(usize, f64, Significance)> {
    let mut remaining: Vec<usize> = (0..values.len()).collect();
    let mut flagged = Vec::new();

    for _ in 0..thresholds.outlier_max_iterations {
        if remaining.len() < 3 {
            break;
        }
        let sample: Vec<f64> = remaining.iter().map(|&i| values[i]).collect();
        let (mean, stddev) = mean_stddev(&sample);
        if stddev <= 0.0 {
            break;
        }

        let (worst_pos, worst_idx, worst_g) = remaining
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (pos, idx, (values[idx] - mean).abs() / stddev))
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap();

        let critical = grubbs_critical_value(remaining.len(), GRUBBS_ALPHA);
        if worst_g <= critical {
            break;
        }

        let z = (values[worst_idx] - mean) / stddev;
        if let Some(sig) = significance_for(z, thresholds) {
            flagged.push((worst_idx, z, sig));
        }
        remaining.remove(worst_pos);
    }

    flagged
}

/// "Outlier detection"). Samples below 10 never produce outliers.
pub fn detect_outliers(pattern_id: &str, file: &str, values: &[(f64, String, i64)], thresholds: &Thresholds, now: i64) -> Vec<OutlierRow> {
    let n = values.len();
    if n < thresholds.outlier_min_samples as usize {
        return Vec::new();
    }

    let scores: Vec<f64> = values.iter().map(|(v, _, _)| *v).collect();
    let flagged = if n < thresholds.outlier_grubbs_max_samples as usize {
        grubbs_outliers(&scores, thresholds)
    } else {
        zscore_outliers(&scores, thresholds)
    };

    flagged
        .into_iter()
        .map(|(idx, z, sig)| {
            let (_, _, line) = &values[idx];
            OutlierRow {
                id: 0,
                pattern_id: pattern_id.to_string(),
                file: file.to_string(),
                line: *line,
                deviation_score: z,
                significance: sig.as_str().to_string(),
                method: if n < thresholds.outlier_grubbs_max_samples as usize { "grubbs".to_string() } else { "z-score".to_string() },
                created_at: now,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_thresholds() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn beta_update_matches_prior_plus_evidence() {
        let (alpha, beta) = beta_update(9, 0);
        assert_eq!(alpha, 10.0);
        assert_eq!(beta, 1.0);
        assert!(posterior_mean(alpha, beta) > 0.9);
    }

    #[test]
    fn momentum_is_zero_below_project_size_floor() {
        let thresholds = default_thresholds();
        let m = momentum(Some(0.5), 0.9, 10, 5, &thresholds);
        assert_eq!(m, 0.0);
    }

    #[test]
    fn status_universal_above_point_nine() {
        let status = classify_status(0.95, 0.0, false, None);
        assert_eq!(status, PatternStatus::Universal);
    }

    #[test]
    fn status_contested_on_even_split() {
        let status = classify_status(0.5, 0.0, false, Some(0.5));
        assert_eq!(status, PatternStatus::Contested);
    }

    #[test]
    fn small_sample_never_flags_outliers() {
        let thresholds = default_thresholds();
        let values: Vec<(f64, String, i64)> = (0..5).map(|i| (i as f64, "f.rs".to_string(), i)).collect();
        assert!(detect_outliers("p", "f.rs", &values, &thresholds, 0).is_empty());
    }

    #[test]
    fn zscore_flags_extreme_value_in_large_sample() {
        let thresholds = default_thresholds();
        let mut values: Vec<(f64, String, i64)> = (0..40).map(|i| (0.9, "f.rs".to_string(), i)).collect();
        values[0].0 = 50.0;
        let outliers = detect_outliers("p", "f.rs", &values, &thresholds, 0);
        assert!(!outliers.is_empty());
    }

    #[test]
    fn grubbs_flags_extreme_value_in_mid_sample() {
        let thresholds = default_thresholds();
        let mut values: Vec<(f64, String, i64)> = (0..15).map(|i| (1.0, "f.rs".to_string(), i)).collect();
        values[0].0 = 100.0;
        let outliers = detect_outliers("p", "f.rs", &values, &thresholds, 0);
        assert!(!outliers.is_empty());
    }
}
