//! Flask/FastAPI route detection, both decorator-based on Python functions.
//! FastAPI spells the method in the decorator name (`@app.get(...)`);
//! Flask spells it in a `methods=[...]` keyword argument on `@app.route`,
//! defaulting to GET when the keyword is absent.

const FASTAPI_METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "options", "head"];

use crate::engine::file_index::{FileIndex, RouteRecord};

pub fn apply(index: &mut FileIndex) {
    let mut routes = Vec::new();
    for function in &index.functions {
        for decorator in &function.decorators {
            let Some((_, method)) = decorator.name.rsplit_once('.') else { continue };
            let raw_path = decorator.arguments.first().map(|a| strip_quotes(a).to_string()).unwrap_or_default();

            if method == "route" {
                let methods = parse_methods_kwarg(&decorator.arguments).unwrap_or_else(|| vec!["GET".to_string()]);
                for http_method in methods {
                    routes.push(RouteRecord {
                        http_method,
                        raw_path: raw_path.clone(),
                        handler_qualified_name: Some(function.qualified_name.clone()),
                        framework: "flask".to_string(),
                        location: function.location.clone(),
                    });
                }
            } else if FASTAPI_METHODS.contains(&method) {
                routes.push(RouteRecord {
                    http_method: method.to_uppercase(),
                    raw_path,
                    handler_qualified_name: Some(function.qualified_name.clone()),
                    framework: "fastapi".to_string(),
                    location: function.location.clone(),
                });
            }
        }
    }
    index.routes.extend(routes);
}

/// Parse `methods=["GET", "POST"]` out of a decorator's raw keyword
/// argument text (`ExtractionContext` stores arguments as unparsed source
/// text, not structured values).
fn parse_methods_kwarg(arguments: &[String]) -> Option<Vec<String>> {
    let kwarg = arguments.iter().find(|a| a.trim_start().starts_with("methods"))?;
    let (_, list) = kwarg.split_once('=')?;
    let inner = list.trim().trim_start_matches('[').trim_end_matches(']');
    let methods: Vec<String> = inner
        .split(',')
        .map(|m| strip_quotes(m.trim()).to_uppercase())
        .filter(|m| !m.is_empty())
        .collect();
    if methods.is_empty() {
        None
    } else {
        Some(methods)
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(['"', '\''])
}
