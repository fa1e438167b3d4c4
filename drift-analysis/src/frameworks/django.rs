//! Django URLconf route detection: `path('users/', views.list_users)` and
//! `re_path(r'^users/$',...)` entries in a `urlpatterns` list. Django
//! routes are method-agnostic at the URLconf level — the view function
//! itself dispatches by HTTP method — so `http_method` is recorded as
//! `"ANY"`.

use super::path_literal_for;
use crate::engine::file_index::{FileIndex, RouteRecord};

pub fn apply(index: &mut FileIndex) {
    let mut routes = Vec::new();
    for call in &index.calls {
        if call.receiver.is_some() || !matches!(call.callee_text.as_str(), "path" | "re_path") {
            continue;
        }
        let Some(path_literal) = path_literal_for(call, &index.literals) else { continue };

        routes.push(RouteRecord {
            http_method: "ANY".to_string(),
            raw_path: path_literal.value.clone(),
            handler_qualified_name: call.enclosing_function.clone(),
            framework: "django".to_string(),
            location: call.location.clone(),
        });
    }
    index.routes.extend(routes);
}
