//! Spring MVC route detection: a class-level `@RequestMapping("/prefix")`
//! on a `@RestController`/`@Controller` sets the path prefix for method
//! annotations (`@GetMapping`, `@PostMapping`,... or `@RequestMapping`
//! with an explicit `method = RequestMethod.X`).

use drift_core::types::collections::FxHashMap;

use crate::engine::file_index::{FileIndex, RouteRecord};

const METHOD_ANNOTATIONS: &[(&str, &str)] =
    &[("GetMapping", "GET"), ("PostMapping", "POST"), ("PutMapping", "PUT"), ("DeleteMapping", "DELETE"), ("PatchMapping", "PATCH")];

pub fn apply(index: &mut FileIndex) {
    let mut prefixes: FxHashMap<String, String> = FxHashMap::default();
    for class in &index.classes {
        let is_controller = class.decorators.iter().any(|d| d.name == "RestController" || d.name == "Controller");
        if !is_controller {
            continue;
        }
        let prefix = class
            .decorators
            .iter()
            .find(|d| d.name == "RequestMapping")
            .and_then(|d| d.arguments.first())
            .map(|a| strip_quotes(a).to_string())
            .unwrap_or_default();
        prefixes.insert(class.qualified_name.clone(), prefix);
    }

    let mut routes = Vec::new();
    for function in &index.functions {
        let Some(enclosing_class) = &function.enclosing_class else { continue };
        let Some(prefix) = prefixes.get(enclosing_class) else { continue };

        for decorator in &function.decorators {
            if let Some((_, http_method)) = METHOD_ANNOTATIONS.iter().find(|(name, _)| *name == decorator.name) {
                let sub_path = decorator.arguments.first().map(|a| strip_quotes(a)).unwrap_or("");
                routes.push(RouteRecord {
                    http_method: http_method.to_string(),
                    raw_path: join_path(prefix, sub_path),
                    handler_qualified_name: Some(function.qualified_name.clone()),
                    framework: "spring".to_string(),
                    location: function.location.clone(),
                });
            } else if decorator.name == "RequestMapping" {
                let sub_path = decorator.arguments.first().map(|a| strip_quotes(a)).unwrap_or("");
                let http_method = decorator
                    .arguments
                    .iter()
                    .find(|a| a.contains("RequestMethod"))
                    .and_then(|a| a.rsplit('.').next())
                    .unwrap_or("GET");
                routes.push(RouteRecord {
                    http_method: http_method.to_string(),
                    raw_path: join_path(prefix, sub_path),
                    handler_qualified_name: Some(function.qualified_name.clone()),
                    framework: "spring".to_string(),
                    location: function.location.clone(),
                });
            }
        }
    }
    index.routes.extend(routes);
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}

fn join_path(prefix: &str, sub_path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let sub_path = sub_path.trim_matches('/');
    match (prefix.is_empty(), sub_path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{sub_path}"),
        (false, true) => format!("/{prefix}"),
        (false, false) => format!("/{prefix}/{sub_path}"),
    }
}
