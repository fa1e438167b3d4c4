//! Declarative taint registry — sources/sinks/sanitizers/propagators loaded
//! from TOML.
//! Built-ins live in `drift-analysis`'s default registry; user entries here
//! merge in, overriding a built-in of the same `id`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    /// Callee-text or receiver.method pattern that introduces tainted data,
    /// e.g. `"request.args.get"`.
    pub pattern: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    pub id: String,
    pub pattern: String,
    /// CWE id emitted when tainted data reaches this sink unsanitized.
    pub cwe: u32,
    pub owasp_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerSpec {
    pub id: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagatorSpec {
    pub id: String,
    pub pattern: String,
    /// Argument indices (0-based) through which taint propagates into the
    /// return value; empty means "all arguments".
    pub propagates_from_args: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaintRegistryConfig {
    #[serde(rename = "sources")]
    pub sources: Vec<SourceSpec>,
    #[serde(rename = "sinks")]
    pub sinks: Vec<SinkSpec>,
    #[serde(rename = "sanitizers")]
    pub sanitizers: Vec<SanitizerSpec>,
    #[serde(rename = "propagators")]
    pub propagators: Vec<PropagatorSpec>,
}

impl TaintRegistryConfig {
    /// Merge `overrides` into `self`: entries sharing an `id` replace the
    /// base entry, new ids are appended.
    pub fn merge(mut self, overrides: TaintRegistryConfig) -> Self {
        merge_by_id(&mut self.sources, overrides.sources, |s| s.id.clone());
        merge_by_id(&mut self.sinks, overrides.sinks, |s| s.id.clone());
        merge_by_id(&mut self.sanitizers, overrides.sanitizers, |s| s.id.clone());
        merge_by_id(&mut self.propagators, overrides.propagators, |s| {
            s.id.clone()
        });
        self
    }
}

fn merge_by_id<T>(base: &mut Vec<T>, overrides: Vec<T>, id_of: impl Fn(&T) -> String) {
    for over in overrides {
        let over_id = id_of(&over);
        if let Some(existing) = base.iter_mut().find(|b| id_of(b) == over_id) {
            *existing = over;
        } else {
            base.push(over);
        }
    }
}
