//! Contract matching: path normalisation, backend-route ↔ frontend-call
//! matching, and recursive field comparison.
//!
//! Built in the shape `frameworks/mod.rs`'s route extraction and
//! `patterns.rs`'s aggregation already establish: plain functions over
//! `FileIndex`/row structs, no framework-specific trait objects. Frontend
//! expected-field extraction is a deliberate scope trim: the extractor's
//! `CallRecord` does not capture TypeScript generic type arguments
//! (`axios.get<{...}>`), so frontend field trees are supplied by the caller
//! (e.g. recovered from a co-located type declaration) rather than
//! re-derived here; endpoint discovery and normalisation do not depend on
//! that gap.

use drift_core::traits::storage::drift_structural::{ContractMismatchRow, ContractRow};

use crate::engine::file_index::{CallRecord, FileIndex, RouteRecord};
use crate::frameworks::{location_overlaps, path_literal_for, strip_quotes};

/// A recursive field in a backend response or frontend expectation:
/// name, type, optional, nullable, and nested children.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractField {
    pub name: String,
    pub field_type: String,
    pub optional: bool,
    pub nullable: bool,
    pub children: Vec<ContractField>,
}

/// Discovered HTTP client call sites, treated as the frontend side of a
/// contract. Recognises axios/fetch/`$http`-style call shapes; the path
/// literal is correlated with the call by location overlap.
const HTTP_CLIENT_METHODS: &[&str] = &["get", "post", "put", "delete", "patch"];
const HTTP_CLIENT_RECEIVERS: &[&str] = &["axios", "http", "$http", "client", "api"];

#[derive(Debug, Clone)]
pub struct FrontendCallSite {
    pub http_method: String,
    pub normalised_path: String,
    pub file: String,
    pub line: u32,
}

fn is_http_client_call(call: &CallRecord) -> Option<&'static str> {
    // `fetch(url)` has no receiver and always means GET unless a caller
    // inspects the second argument's `method` field, which `CallRecord`
    // doesn't carry — treat bare `fetch` as GET.
    if call.callee_text == "fetch" && call.receiver.is_none() {
        return Some("get");
    }

    let method = call.callee_text.rsplit('.').next()?.to_ascii_lowercase();
    let matched = HTTP_CLIENT_METHODS.iter().find(|m| **m == method)?;
    let receiver = call.receiver.as_deref()?.to_ascii_lowercase();
    let receiver_tail = receiver.rsplit('.').next().unwrap_or(&receiver);
    HTTP_CLIENT_RECEIVERS.iter().any(|r| receiver_tail.contains(r)).then_some(matched)
}

/// Discover outgoing HTTP calls in a frontend file.
pub fn discover_frontend_calls(index: &FileIndex) -> Vec<FrontendCallSite> {
    let mut sites = Vec::new();
    for call in &index.calls {
        let Some(method) = is_http_client_call(call) else { continue };
        let Some(literal) = path_literal_for(call, &index.literals) else { continue };
        if !location_overlaps(&call.location, &literal.location) {
            continue;
        }
        sites.push(FrontendCallSite {
            http_method: method.to_ascii_uppercase(),
            normalised_path: normalise_path(strip_quotes(&literal.value)),
            file: index.file_path.clone(),
            line: call.location.line,
        });
    }
    sites
}

/// Collapse every supported framework-specific path-parameter syntax to the
/// canonical `:param` form: `/users/:id`, `/users/{id}`, `/users/<id>`, and
/// `/users/${id}` all normalise to `/users/:id`.
pub fn normalise_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                out.push(':');
                for next in chars.by_ref() {
                    if next == '}' {
                        break;
                    }
                    out.push(next);
                }
            }
            '<' => {
                out.push(':');
                for next in chars.by_ref() {
                    if next == '>' {
                        break;
                    }
                    out.push(next);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push(':');
                for next in chars.by_ref() {
                    if next == '}' {
                        break;
                    }
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Recursively diff backend response fields against frontend expected
/// fields: a field missing from the frontend tree is a warning (it simply
/// isn't consumed), one missing from the backend tree is an error (the
/// frontend expects data that will never arrive), and type/optionality/
/// nullability differences are each reported as their own mismatch.
pub fn diff_fields(contract_id: &str, backend: &[ContractField], frontend: &[ContractField], path: &str, now: i64, out: &mut Vec<ContractMismatchRow>) {
    for back in backend {
        let field_path = if path.is_empty() { back.name.clone() } else { format!("{path}.{}", back.name) };
        match frontend.iter().find(|f| f.name == back.name) {
            None => out.push(mismatch(contract_id, &field_path, "missing_in_frontend", "warning", &format!("backend field `{field_path}` is never read by the frontend"), now)),
            Some(front) => {
                if front.field_type != back.field_type {
                    out.push(mismatch(contract_id, &field_path, "type_mismatch", "error", &format!("`{field_path}` is `{}` on the backend but `{}` on the frontend", back.field_type, front.field_type), now));
                }
                if front.optional != back.optional {
                    out.push(mismatch(contract_id, &field_path, "optionality", "warning", &format!("`{field_path}` optionality differs between backend and frontend"), now));
                }
                if front.nullable != back.nullable {
                    out.push(mismatch(contract_id, &field_path, "nullability", "warning", &format!("`{field_path}` nullability differs between backend and frontend"), now));
                }
                diff_fields(contract_id, &back.children, &front.children, &field_path, now, out);
            }
        }
    }

    for front in frontend {
        if !backend.iter().any(|b| b.name == front.name) {
            let field_path = if path.is_empty() { front.name.clone() } else { format!("{path}.{}", front.name) };
            out.push(mismatch(contract_id, &field_path, "missing_in_backend", "error", &format!("frontend expects `{field_path}` but the backend response never includes it"), now));
        }
    }
}

fn mismatch(contract_id: &str, field_path: &str, mismatch_type: &str, severity: &str, message: &str, now: i64) -> ContractMismatchRow {
    ContractMismatchRow { id: 0, contract_id: contract_id.to_string(), field_path: field_path.to_string(), mismatch_type: mismatch_type.to_string(), severity: severity.to_string(), message: message.to_string(), created_at: now }
}

/// `matchConfidence × 0.6 + fieldExtractionConfidence × 0.4`.
pub fn contract_confidence(match_confidence: f64, field_extraction_confidence: f64) -> f64 {
    match_confidence * 0.6 + field_extraction_confidence * 0.4
}

fn contract_id_for(http_method: &str, normalised_path: &str) -> String {
    format!("{http_method}:{normalised_path}")
}

/// Build a `ContractRow` from one backend route plus whatever frontend call
/// sites matched `(method, normalised_path)`. `backend_fields` is supplied
/// by the caller (see module doc); absent a frontend match the contract's
/// status is `discovered`, present with zero mismatches it is `verified`,
/// otherwise `mismatch`.
pub fn build_contract(route: &RouteRecord, source_file: &str, backend_fields: &[ContractField], frontend: &[FrontendCallSite], frontend_fields: &[ContractField], match_confidence: f64, field_extraction_confidence: f64, now: i64) -> (ContractRow, Vec<ContractMismatchRow>) {
    let normalised_path = normalise_path(&route.raw_path);
    let contract_id = contract_id_for(&route.http_method, &normalised_path);

    let matched_any = frontend.iter().any(|f| f.http_method.eq_ignore_ascii_case(&route.http_method) && f.normalised_path == normalised_path);

    let mut mismatches = Vec::new();
    if matched_any {
        diff_fields(&contract_id, backend_fields, frontend_fields, "", now, &mut mismatches);
    }

    let status = if !matched_any {
        "discovered"
    } else if mismatches.is_empty() {
        "verified"
    } else {
        "mismatch"
    };

    let row = ContractRow {
        id: contract_id,
        http_method: route.http_method.clone(),
        normalised_path,
        source_file: source_file.to_string(),
        framework: route.framework.clone(),
        backend_fields_json: serde_json::to_string(backend_fields).unwrap_or_default(),
        frontend_fields_json: if matched_any { serde_json::to_string(frontend_fields).ok() } else { None },
        confidence: contract_confidence(match_confidence, field_extraction_confidence),
        status: status.to_string(),
    };

    (row, mismatches)
}

impl serde::Serialize for ContractField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ContractField", 5)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("field_type", &self.field_type)?;
        s.serialize_field("optional", &self.optional)?;
        s.serialize_field("nullable", &self.nullable)?;
        s.serialize_field("children", &self.children)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: &str) -> ContractField {
        ContractField { name: name.to_string(), field_type: field_type.to_string(), optional: false, nullable: false, children: Vec::new() }
    }

    #[test]
    fn normalises_express_colon_param() {
        assert_eq!(normalise_path("/users/:id"), "/users/:id");
    }

    #[test]
    fn normalises_spring_brace_param() {
        assert_eq!(normalise_path("/users/{id}"), "/users/:id");
    }

    #[test]
    fn normalises_django_angle_param() {
        assert_eq!(normalise_path("/users/<id>"), "/users/:id");
    }

    #[test]
    fn normalises_template_literal_param() {
        assert_eq!(normalise_path("/users/${id}"), "/users/:id");
    }

    #[test]
    fn scenario_c_contract_mismatch() {
        // frontend `{ id, email, createdAt }`.
        let backend = vec![field("id", "int"), field("email", "string"), field("created_at", "string")];
        let frontend = vec![field("id", "number"), field("email", "string"), field("createdAt", "string")];

        let mut mismatches = Vec::new();
        diff_fields("GET::users::id", &backend, &frontend, "", 0, &mut mismatches);

        let missing_in_frontend: Vec<_> = mismatches.iter().filter(|m| m.mismatch_type == "missing_in_frontend").collect();
        let missing_in_backend: Vec<_> = mismatches.iter().filter(|m| m.mismatch_type == "missing_in_backend").collect();
        assert_eq!(missing_in_frontend.len(), 1);
        assert_eq!(missing_in_frontend[0].field_path, "created_at");
        assert_eq!(missing_in_frontend[0].severity, "warning");
        assert_eq!(missing_in_backend.len(), 1);
        assert_eq!(missing_in_backend[0].field_path, "createdAt");
        assert_eq!(missing_in_backend[0].severity, "error");
    }

    #[test]
    fn identical_trees_produce_no_mismatches() {
        let fields = vec![field("id", "int")];
        let mut mismatches = Vec::new();
        diff_fields("c", &fields, &fields, "", 0, &mut mismatches);
        assert!(mismatches.is_empty());
    }
}
