//! Severity-escalation gate configuration. Consumed by the (out-of-scope)
//! CI quality-gate runner; the core only needs to know the declared policy
//! well enough to tag violations with it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Categories escalated to `error` regardless of their natural severity.
    pub escalate_categories: Vec<String>,
    /// Minimum severity that fails a gate run.
    pub fail_on: Severity,
    /// CWE ids that always fail the gate regardless of severity.
    pub always_fail_cwe: Vec<u32>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            escalate_categories: Vec::new(),
            fail_on: Severity::Error,
            always_fail_cwe: Vec::new(),
        }
    }
}
