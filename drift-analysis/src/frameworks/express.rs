//! Express/Fastify route detection: `app.get("/path", handler)`,
//! `router.post("/path",...)`. Both frameworks share this call shape
//! closely enough that one matcher covers both.

const METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "all"];
const RECEIVER_NAMES: &[&str] = &["app", "router", "api"];

use super::{path_literal_for, strip_quotes};
use crate::engine::file_index::{FileIndex, RouteRecord};

pub fn apply(index: &mut FileIndex) {
    let mut routes = Vec::new();
    for call in &index.calls {
        let Some(receiver) = &call.receiver else { continue };
        let is_router_receiver =
            RECEIVER_NAMES.contains(&receiver.as_str()) || receiver.ends_with("Router") || receiver.ends_with("router");
        if !is_router_receiver {
            continue;
        }

        let Some(method) = call.callee_text.rsplit('.').next() else { continue };
        if !METHODS.contains(&method) {
            continue;
        }

        let Some(path_literal) = path_literal_for(call, &index.literals) else { continue };

        routes.push(RouteRecord {
            http_method: method.to_uppercase(),
            raw_path: strip_quotes(&path_literal.value).to_string(),
            handler_qualified_name: call.enclosing_function.clone(),
            framework: "express".to_string(),
            location: call.location.clone(),
        });
    }
    index.routes.extend(routes);
}
