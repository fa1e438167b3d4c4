//! Boundary detection: a two-phase learn-then-detect pass — models/fields
//! are already learned by `frameworks::orm`, this module only detects the
//! sensitivity of each field and the CRUD operation performed at each
//! data-access call site.
//!
//! Learning the `{ model → table, fields }` shape across ORM frameworks is
//! `frameworks::orm`'s job, not this module's; this module starts from
//! whatever `ModelRecord`/`ModelFieldRecord` that pass already produced.

use drift_core::traits::storage::drift_structural::BoundaryRow;

use crate::engine::file_index::{FileIndex, ModelRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Pii,
    Financial,
    Auth,
    Health,
}

impl Sensitivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pii => "pii",
            Self::Financial => "financial",
            Self::Auth => "auth",
            Self::Health => "health",
        }
    }
}

/// Name-based sensitivity classification: `password`, `email`, `ssn`,
/// `credit_card`, etc, each mapping to a `Sensitivity` tier
/// (PII/financial/auth/health/custom). `custom` classifiers are a
/// caller-supplied extension point layered on top of these built-ins via
/// `custom_rules`.
fn classify_builtin(field_name: &str) -> Option<Sensitivity> {
    let lower = field_name.to_ascii_lowercase();
    const AUTH: &[&str] = &["password", "passwd", "pwd", "secret", "token", "api_key", "session", "auth"];
    const FINANCIAL: &[&str] = &["credit_card", "card_number", "cvv", "iban", "account_number", "routing_number", "salary", "balance"];
    const HEALTH: &[&str] = &["diagnosis", "medical", "health", "prescription", "patient"];
    const PII: &[&str] = &["email", "ssn", "social_security", "phone", "address", "date_of_birth", "dob", "first_name", "last_name", "full_name", "passport"];

    if AUTH.iter().any(|m| lower.contains(m)) {
        Some(Sensitivity::Auth)
    } else if FINANCIAL.iter().any(|m| lower.contains(m)) {
        Some(Sensitivity::Financial)
    } else if HEALTH.iter().any(|m| lower.contains(m)) {
        Some(Sensitivity::Health)
    } else if PII.iter().any(|m| lower.contains(m)) {
        Some(Sensitivity::Pii)
    } else {
        None
    }
}

/// Classify a field name, checking caller-supplied `(substring, label)`
/// custom rules first so a project can override or extend the built-in
/// table.
pub fn classify_field(field_name: &str, custom_rules: &[(String, String)]) -> Option<String> {
    let lower = field_name.to_ascii_lowercase();
    for (substring, label) in custom_rules {
        if lower.contains(substring.as_str()) {
            return Some(format!("custom:{label}"));
        }
    }
    classify_builtin(field_name).map(|s| s.as_str().to_string())
}

const WRITE_VERBS: &[&str] = &["create", "insert", "save", "add", "new"];
const UPDATE_VERBS: &[&str] = &["update", "edit", "patch", "modify", "set"];
const DELETE_VERBS: &[&str] = &["delete", "remove", "destroy", "drop"];
const READ_VERBS: &[&str] = &["find", "get", "select", "query", "all", "list", "fetch", "read", "where"];

/// Infer the CRUD operation (read/write/delete/update) from a call's
/// method name.
fn infer_operation(method_name: &str) -> Option<&'static str> {
    let lower = method_name.to_ascii_lowercase();
    if DELETE_VERBS.iter().any(|v| lower.contains(v)) {
        Some("delete")
    } else if UPDATE_VERBS.iter().any(|v| lower.contains(v)) {
        Some("update")
    } else if WRITE_VERBS.iter().any(|v| lower.contains(v)) {
        Some("write")
    } else if READ_VERBS.iter().any(|v| lower.contains(v)) {
        Some("read")
    } else {
        None
    }
}

fn receiver_matches_model(receiver: &str, model: &ModelRecord) -> bool {
    let lower = receiver.to_ascii_lowercase();
    let model_lower = model.model_name.to_ascii_lowercase();
    let table_lower = model.table_name.as_deref().unwrap_or("").to_ascii_lowercase();
    lower.contains(&model_lower) || (!table_lower.is_empty() && lower.contains(&table_lower))
}

/// Detect data-access sites within `index`, correlating its already-learned
/// `ModelRecord`s against calls whose receiver names the model or its
/// table, and emitting one `BoundaryRow` per sensitive field touched.
pub fn detect(index: &FileIndex, custom_rules: &[(String, String)]) -> Vec<BoundaryRow> {
    let mut rows = Vec::new();

    for model in &index.models {
        let sensitive_fields: Vec<(&str, String)> = model
            .fields
            .iter()
            .filter_map(|f| classify_field(&f.name, custom_rules).map(|label| (f.name.as_str(), label)))
            .collect();
        if sensitive_fields.is_empty() {
            continue;
        }

        let mut access_sites: Vec<(&str, u32)> = Vec::new();
        for call in &index.calls {
            let Some(receiver) = &call.receiver else { continue };
            if !receiver_matches_model(receiver, model) {
                continue;
            }
            let method = call.callee_text.rsplit('.').next().unwrap_or(&call.callee_text);
            let Some(operation) = infer_operation(method) else { continue };
            access_sites.push((operation, call.location.line));
        }

        if access_sites.is_empty() {
            // The model is declared but never visibly accessed in this file;
            // still record the declaration itself as a read-sensitivity
            // site so the boundary exists for cross-file impact analysis.
            access_sites.push(("read", model.location.line));
        }

        for (operation, line) in access_sites {
            for (field_name, sensitivity) in &sensitive_fields {
                rows.push(BoundaryRow {
                    id: 0,
                    file: index.file_path.clone(),
                    line: line as i64,
                    framework: model.framework.clone(),
                    table_name: model.table_name.clone().unwrap_or_else(|| model.model_name.clone()),
                    field_name: field_name.to_string(),
                    operation: operation.to_string(),
                    sensitivity: Some(sensitivity.clone()),
                    confidence: if operation == "read" && line == model.location.line { 0.5 } else { 0.85 },
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::file_index::{CallRecord, ModelFieldRecord, SourceLocation};
    use crate::scanner::Language;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation { line, column: 0, end_line: line, end_column: 0 }
    }

    #[test]
    fn classifies_password_as_auth() {
        assert_eq!(classify_field("password", &[]), Some("auth".to_string()));
    }

    #[test]
    fn classifies_email_as_pii() {
        assert_eq!(classify_field("email", &[]), Some("pii".to_string()));
    }

    #[test]
    fn custom_rule_overrides_builtin_label() {
        let custom = vec![("email".to_string(), "marketing_contact".to_string())];
        assert_eq!(classify_field("email", &custom), Some("custom:marketing_contact".to_string()));
    }

    #[test]
    fn non_sensitive_field_is_unclassified() {
        assert_eq!(classify_field("created_at", &[]), None);
    }

    #[test]
    fn detects_write_operation_on_sensitive_field() {
        let mut index = FileIndex::empty("models.py", Language::Python, [0; 8]);
        index.models.push(ModelRecord {
            model_name: "User".to_string(),
            table_name: Some("users".to_string()),
            fields: vec![ModelFieldRecord { name: "password".to_string(), field_type: None }],
            framework: "django".to_string(),
            location: loc(1),
        });
        index.calls.push(CallRecord {
            receiver: Some("User".to_string()),
            callee_text: "User.save".to_string(),
            argument_count: 0,
            location: loc(10),
            enclosing_function: Some("register".to_string()),
        });

        let rows = detect(&index, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].operation, "write");
        assert_eq!(rows[0].sensitivity.as_deref(), Some("auth"));
    }

    #[test]
    fn declaration_only_model_still_emits_a_read_boundary() {
        let mut index = FileIndex::empty("models.py", Language::Python, [0; 8]);
        index.models.push(ModelRecord {
            model_name: "User".to_string(),
            table_name: Some("users".to_string()),
            fields: vec![ModelFieldRecord { name: "ssn".to_string(), field_type: None }],
            framework: "django".to_string(),
            location: loc(1),
        });
        let rows = detect(&index, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].operation, "read");
    }
}
