//! NestJS route detection: a `@Controller('prefix')` class decorator sets
//! the path prefix for every `@Get`/`@Post`/... method decorator inside
//! it.

use drift_core::types::collections::FxHashMap;

use crate::engine::file_index::{FileIndex, RouteRecord};

const HTTP_DECORATORS: &[(&str, &str)] =
    &[("Get", "GET"), ("Post", "POST"), ("Put", "PUT"), ("Delete", "DELETE"), ("Patch", "PATCH"), ("Options", "OPTIONS"), ("Head", "HEAD")];

pub fn apply(index: &mut FileIndex) {
    let mut prefixes: FxHashMap<String, String> = FxHashMap::default();
    for class in &index.classes {
        let Some(controller) = class.decorators.iter().find(|d| d.name == "Controller") else { continue };
        let prefix = controller.arguments.first().map(|a| strip_quotes(a).to_string()).unwrap_or_default();
        prefixes.insert(class.qualified_name.clone(), prefix);
    }

    let mut routes = Vec::new();
    for function in &index.functions {
        let Some(enclosing_class) = &function.enclosing_class else { continue };
        let Some(prefix) = prefixes.get(enclosing_class) else { continue };

        for decorator in &function.decorators {
            let Some((_, http_method)) = HTTP_DECORATORS.iter().find(|(name, _)| *name == decorator.name) else { continue };
            let sub_path = decorator.arguments.first().map(|a| strip_quotes(a)).unwrap_or("");
            routes.push(RouteRecord {
                http_method: http_method.to_string(),
                raw_path: join_path(prefix, sub_path),
                handler_qualified_name: Some(function.qualified_name.clone()),
                framework: "nestjs".to_string(),
                location: function.location.clone(),
            });
        }
    }
    index.routes.extend(routes);
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(['"', '\''])
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
