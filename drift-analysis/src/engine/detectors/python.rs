//! Python detectors, grounded in the `tree-sitter-python` grammar's node
//! kinds (`function_definition`, `class_definition`, `decorated_definition`,
//! `call`, `import_statement`/`import_from_statement`, `try_statement`).

use xxhash_rust::xxh3::xxh3_64;

use crate::engine::context::{location, ExtractionContext};
use crate::engine::file_index::{
    CallRecord, ClassKind, ClassRecord, Decorator, ErrorHandlingRecord, FunctionRecord,
    ImportRecord, ImportedName, LiteralKind, LiteralRecord, Parameter,
};
use crate::engine::visitor::Detector;

pub fn all() -> Vec<&'static dyn Detector> {
    vec![&FUNCTION, &CLASS, &DECORATOR, &IMPORT, &IMPORT_FROM, &CALL, &TRY, &STRING, &NUMBER]
}

fn child_text<'a>(node: tree_sitter::Node, kind: &str, ctx: &ExtractionContext<'a>) -> Option<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == kind)
        .map(|c| ctx.text(c).to_string())
}

struct FunctionDetector;
static FUNCTION: FunctionDetector = FunctionDetector;
impl Detector for FunctionDetector {
    fn id(&self) -> &'static str {
        "python.function"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["function_definition"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let parameters = node
            .child_by_field_name("parameters")
            .map(|params_node| {
                let mut cursor = params_node.walk();
                params_node
                    .children(&mut cursor)
                    .filter(|c| {
                        matches!(
                            c.kind(),
                            "identifier" | "typed_parameter" | "default_parameter" | "typed_default_parameter"
                        )
                    })
                    .map(|p| parse_parameter(p, ctx))
                    .collect()
            })
            .unwrap_or_default();

        let return_type = node.child_by_field_name("return_type").map(|n| ctx.text(n).to_string());
        let is_async = child_text(node, "async", ctx).is_some()
            || ctx.text(node).trim_start().starts_with("async ");

        let enclosing_class = ctx.current_class();
        let qualified_name = match (&enclosing_class, ctx.current_function()) {
            (Some(class), _) => format!("{class}.{name}"),
            (None, Some(func)) => format!("{func}.<local>.{name}"),
            (None, None) => name.clone(),
        };

        let decorators = ctx.take_pending_decorators();
        let is_exported = decorators.iter().any(|d| d.name.ends_with("route") || d.name.ends_with("app"))
            || !name.starts_with('_');
        let is_entry_point = name == "main" || decorators.iter().any(|d| d.name == "click.command");

        let signature_text = format!(
            "{name}({}){}",
            parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(","),
            return_type.as_deref().unwrap_or("")
        );
        let body_text = node
            .child_by_field_name("body")
            .map(|b| ctx.text(b))
            .unwrap_or("");

        ctx.emit_function(FunctionRecord {
            qualified_name: qualified_name.clone(),
            name,
            parameters,
            return_type,
            decorators,
            is_exported,
            is_async,
            is_entry_point,
            location: location(node),
            signature_hash: xxh3_64(signature_text.as_bytes()).to_le_bytes(),
            body_hash: xxh3_64(body_text.as_bytes()).to_le_bytes(),
            doc_comment: docstring(node, ctx),
            enclosing_class,
        });

        ctx.scope_stack.borrow_mut().push(qualified_name);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.scope_stack.borrow_mut().pop();
    }
}

fn docstring<'a>(node: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first_stmt = body.children(&mut cursor).next()?;
    if first_stmt.kind() == "expression_statement" {
        let mut inner = first_stmt.walk();
        let string_node = first_stmt.children(&mut inner).next()?;
        if string_node.kind() == "string" {
            return Some(ctx.text(string_node).trim_matches(['"', '\'']).to_string());
        }
    }
    None
}

fn parse_parameter<'a>(node: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> Parameter {
    match node.kind() {
        "identifier" => Parameter { name: ctx.text(node).to_string(), type_annotation: None, default_value: None },
        "typed_parameter" => {
            let name = node
                .child(0)
                .map(|n| ctx.text(n).to_string())
                .unwrap_or_default();
            let type_annotation = node.child_by_field_name("type").map(|n| ctx.text(n).to_string());
            Parameter { name, type_annotation, default_value: None }
        }
        "default_parameter" | "typed_default_parameter" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| ctx.text(n).to_string())
                .unwrap_or_default();
            let default_value = node.child_by_field_name("value").map(|n| ctx.text(n).to_string());
            let type_annotation = node.child_by_field_name("type").map(|n| ctx.text(n).to_string());
            Parameter { name, type_annotation, default_value }
        }
        _ => Parameter { name: ctx.text(node).to_string(), type_annotation: None, default_value: None },
    }
}

struct ClassDetector;
static CLASS: ClassDetector = ClassDetector;
impl Detector for ClassDetector {
    fn id(&self) -> &'static str {
        "python.class"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["class_definition"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let base_types = node
            .child_by_field_name("superclasses")
            .map(|args| {
                let mut cursor = args.walk();
                args.children(&mut cursor)
                    .filter(|c| c.kind() == "identifier" || c.kind() == "attribute")
                    .map(|c| ctx.text(c).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let properties = node
            .child_by_field_name("body")
            .map(|body| class_body_properties(body, ctx))
            .unwrap_or_default();

        let decorators = ctx.take_pending_decorators();
        ctx.emit_class(ClassRecord {
            name: name.clone(),
            qualified_name: name.clone(),
            kind: ClassKind::Class,
            base_types,
            implemented_interfaces: Vec::new(),
            properties,
            decorators,
            location: location(node),
        });
        ctx.class_stack.borrow_mut().push(name);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

/// Class-body-level field assignments (`email = models.EmailField`,
/// `name: str = "x"`) — the only ORM/dataclass/Pydantic field signal
/// available without a dedicated `properties` detector, since the extractor
/// never builds a typed schema, only a flat list of field names.
fn class_body_properties<'a>(body: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = body.walk();
    for stmt in body.children(&mut cursor) {
        if stmt.kind() != "expression_statement" {
            continue;
        }
        let mut inner = stmt.walk();
        let Some(expr) = stmt.children(&mut inner).next() else { continue };
        if matches!(expr.kind(), "assignment" | "typed_assignment" | "augmented_assignment") {
            if let Some(lhs) = expr.child_by_field_name("left").or_else(|| expr.child(0)) {
                if lhs.kind() == "identifier" {
                    names.push(ctx.text(lhs).to_string());
                }
            }
        }
    }
    names
}

struct DecoratorDetector;
static DECORATOR: DecoratorDetector = DecoratorDetector;
impl Detector for DecoratorDetector {
    fn id(&self) -> &'static str {
        "python.decorator"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["decorator"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut cursor = node.walk();
        let expr = node.children(&mut cursor).find(|c| c.kind() != "@");
        let (name, arguments) = match expr {
            Some(call) if call.kind() == "call" => {
                let func = call.child_by_field_name("function").map(|n| ctx.text(n).to_string()).unwrap_or_default();
                let args = call
                    .child_by_field_name("arguments")
                    .map(|a| {
                        let mut c = a.walk();
                        a.children(&mut c)
                            .filter(|n| n.is_named())
                            .map(|n| ctx.text(n).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                (func, args)
            }
            Some(other) => (ctx.text(other).to_string(), Vec::new()),
            None => (ctx.text(node).to_string(), Vec::new()),
        };
        ctx.emit_decorator(Decorator { name, arguments, location: location(node) });
    }
}

struct ImportDetector;
static IMPORT: ImportDetector = ImportDetector;
impl Detector for ImportDetector {
    fn id(&self) -> &'static str {
        "python.import"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["import_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    let module = ctx.text(child).to_string();
                    ctx.emit_import(crate::engine::file_index::ImportRecord {
                        source_module: module.clone(),
                        imported_names: vec![ImportedName { name: module, alias: None, is_type_only: false }],
                        is_namespace_import: false,
                        location: location(node),
                    });
                }
                "aliased_import" => {
                    let module = child.child(0).map(|n| ctx.text(n).to_string()).unwrap_or_default();
                    let alias = child.child_by_field_name("alias").map(|n| ctx.text(n).to_string());
                    ctx.emit_import(ImportRecord {
                        source_module: module.clone(),
                        imported_names: vec![ImportedName { name: module, alias, is_type_only: false }],
                        is_namespace_import: false,
                        location: location(node),
                    });
                }
                _ => {}
            }
        }
    }
}

struct ImportFromDetector;
static IMPORT_FROM: ImportFromDetector = ImportFromDetector;
impl Detector for ImportFromDetector {
    fn id(&self) -> &'static str {
        "python.import_from"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["import_from_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let module = node
            .child_by_field_name("module_name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_default();
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" | "identifier" => {
                    let text = ctx.text(child).to_string();
                    if text != module {
                        names.push(ImportedName { name: text, alias: None, is_type_only: false });
                    }
                }
                "aliased_import" => {
                    let name = child.child(0).map(|n| ctx.text(n).to_string()).unwrap_or_default();
                    let alias = child.child_by_field_name("alias").map(|n| ctx.text(n).to_string());
                    names.push(ImportedName { name, alias, is_type_only: false });
                }
                "wildcard_import" => {
                    names.push(ImportedName { name: "*".to_string(), alias: None, is_type_only: false });
                }
                _ => {}
            }
        }
        ctx.emit_import(ImportRecord {
            source_module: module,
            imported_names: names,
            is_namespace_import: false,
            location: location(node),
        });
    }
}

struct CallDetector;
static CALL: CallDetector = CallDetector;
impl Detector for CallDetector {
    fn id(&self) -> &'static str {
        "python.call"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["call"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let (receiver, callee_text) = if function.kind() == "attribute" {
            let object = function.child_by_field_name("object").map(|n| ctx.text(n).to_string());
            (object, ctx.text(function).to_string())
        } else {
            (None, ctx.text(function).to_string())
        };
        let argument_count = node
            .child_by_field_name("arguments")
            .map(|a| {
                let mut c = a.walk();
                a.children(&mut c).filter(|n| n.is_named()).count()
            })
            .unwrap_or(0);

        ctx.emit_call(CallRecord {
            receiver,
            callee_text,
            argument_count,
            location: location(node),
            enclosing_function: ctx.current_function(),
        });
    }
}

struct TryDetector;
static TRY: TryDetector = TryDetector;
impl Detector for TryDetector {
    fn id(&self) -> &'static str {
        "python.try"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["try_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut caught_types = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "except_clause" {
                let mut inner = child.walk();
                for grandchild in child.children(&mut inner) {
                    if matches!(grandchild.kind(), "identifier" | "attribute" | "tuple") {
                        caught_types.push(ctx.text(grandchild).to_string());
                        break;
                    }
                }
            }
        }
        ctx.emit_error_handling(ErrorHandlingRecord { caught_types, location: location(node) });
    }
}

struct StringDetector;
static STRING: StringDetector = StringDetector;
impl Detector for StringDetector {
    fn id(&self) -> &'static str {
        "python.string"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["string"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let value = ctx.text(node).trim_matches(['"', '\'']).to_string();
        let context = literal_context(node, ctx);
        ctx.emit_literal(LiteralRecord {
            kind: LiteralKind::String,
            value,
            location: location(node),
            context,
            enclosing_function: ctx.current_function(),
        });
    }
}

struct NumberDetector;
static NUMBER: NumberDetector = NumberDetector;
impl Detector for NumberDetector {
    fn id(&self) -> &'static str {
        "python.number"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["integer", "float"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.emit_literal(LiteralRecord {
            kind: LiteralKind::Number,
            value: ctx.text(node).to_string(),
            location: location(node),
            context: literal_context(node, ctx),
            enclosing_function: ctx.current_function(),
        });
    }
}

/// Best-effort enclosing context for a literal: `assignment:<lhs>` if the
/// parent is an assignment RHS, `call_argument` if inside a call's argument
/// list, else `expression`.
fn literal_context<'a>(node: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> String {
    if let Some(parent) = node.parent() {
        if parent.kind() == "assignment" {
            if let Some(lhs) = parent.child_by_field_name("left") {
                return format!("assignment:{}", ctx.text(lhs));
            }
        }
        if parent.kind() == "argument_list" {
            return "call_argument".to_string();
        }
        if parent.kind() == "keyword_argument" {
            if let Some(name) = parent.child_by_field_name("name") {
                return format!("keyword_argument:{}", ctx.text(name));
            }
        }
    }
    "expression".to_string()
}
