//! `IDriftEnforcement` — violations and the feedback loop that computes
//! per-rule false-positive rates from fix/dismiss/ignore outcomes.
//!
//! Maps to `drift-storage/src/queries/violations.rs` + `feedback.rs`.

use std::sync::Arc;

use crate::errors::StorageError;

#[derive(Debug, Clone)]
pub struct ViolationRow {
    pub id: String,
    pub file: String,
    pub line: i64,
    pub column: Option<i64>,
    pub pattern_id: Option<String>,
    pub rule_id: Option<String>,
    /// `error` | `warning` | `info` | `hint`.
    pub severity: String,
    pub message: String,
    pub fix_suggestion_json: Option<String>,
    pub cwe_ids_json: Option<String>,
    pub owasp_category: Option<String>,
    /// `Open` | `Fixed` | `Dismissed` | `Ignored` | `AutoFixed`.
    pub status: String,
    /// Hash of `(rule_id, file_id, surrounding context)` used to match a
    /// violation across scans as code shifts around it.
    pub match_key: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct FeedbackRow {
    pub violation_id: String,
    pub rule_id: String,
    /// `fixed` | `dismissed` | `ignored` | `auto_fixed`.
    pub action: String,
    pub reason: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RuleFeedbackStats {
    pub total_count: u32,
    pub fixed_count: u32,
    pub dismissed_count: u32,
    pub ignored_count: u32,
    pub auto_fixed_count: u32,
}

impl RuleFeedbackStats {
    pub fn effective_false_positive_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.dismissed_count + self.ignored_count) as f64 / self.total_count as f64
    }
}

/// Violations and feedback storage operations.
pub trait IDriftEnforcement: Send + Sync {
    fn upsert_violation(&self, row: &ViolationRow) -> Result<(), StorageError>;
    fn find_violation_by_match_key(
        &self,
        match_key: &str,
    ) -> Result<Option<ViolationRow>, StorageError>;
    fn list_violations(
        &self,
        severity: Option<&str>,
        status: Option<&str>,
        cursor: Option<(i64, String)>,
        limit: u32,
    ) -> Result<(Vec<ViolationRow>, Option<(i64, String)>), StorageError>;
    fn set_violation_status(&self, id: &str, status: &str, updated_at: i64) -> Result<(), StorageError>;

    fn record_feedback(&self, row: &FeedbackRow) -> Result<(), StorageError>;
    fn feedback_stats_for_rule(
        &self,
        rule_id: &str,
        since: i64,
    ) -> Result<RuleFeedbackStats, StorageError>;
    /// Auto-disabled rules (exceeded the autodisable threshold for the
    /// configured window). The decision itself is business logic in
    /// `drift-analysis`; storage only records and returns the flag.
    fn set_rule_auto_disabled(&self, rule_id: &str, disabled: bool) -> Result<(), StorageError>;
    fn is_rule_auto_disabled(&self, rule_id: &str) -> Result<bool, StorageError>;
}

impl<T: IDriftEnforcement + ?Sized> IDriftEnforcement for Arc<T> {
    fn upsert_violation(&self, row: &ViolationRow) -> Result<(), StorageError> {
        (**self).upsert_violation(row)
    }
    fn find_violation_by_match_key(
        &self,
        match_key: &str,
    ) -> Result<Option<ViolationRow>, StorageError> {
        (**self).find_violation_by_match_key(match_key)
    }
    fn list_violations(
        &self,
        severity: Option<&str>,
        status: Option<&str>,
        cursor: Option<(i64, String)>,
        limit: u32,
    ) -> Result<(Vec<ViolationRow>, Option<(i64, String)>), StorageError> {
        (**self).list_violations(severity, status, cursor, limit)
    }
    fn set_violation_status(&self, id: &str, status: &str, updated_at: i64) -> Result<(), StorageError> {
        (**self).set_violation_status(id, status, updated_at)
    }
    fn record_feedback(&self, row: &FeedbackRow) -> Result<(), StorageError> {
        (**self).record_feedback(row)
    }
    fn feedback_stats_for_rule(
        &self,
        rule_id: &str,
        since: i64,
    ) -> Result<RuleFeedbackStats, StorageError> {
        (**self).feedback_stats_for_rule(rule_id, since)
    }
    fn set_rule_auto_disabled(&self, rule_id: &str, disabled: bool) -> Result<(), StorageError> {
        (**self).set_rule_auto_disabled(rule_id, disabled)
    }
    fn is_rule_auto_disabled(&self, rule_id: &str) -> Result<bool, StorageError> {
        (**self).is_rule_auto_disabled(rule_id)
    }
}
