//! Java detectors, grounded in the `tree-sitter-java` grammar's node kinds
//! (`class_declaration`/`interface_declaration`, `method_declaration`,
//! `marker_annotation`/`annotation`, `method_invocation`,
//! `import_declaration`, `try_statement`). Annotations are Java's
//! decorator-equivalent and feed the
//! Spring framework middleware (`@GetMapping`, `@Autowired`,...).

use xxhash_rust::xxh3::xxh3_64;

use crate::engine::context::{location, ExtractionContext};
use crate::engine::file_index::{
    CallRecord, ClassKind, ClassRecord, Decorator, ErrorHandlingRecord, FunctionRecord,
    ImportRecord, ImportedName, LiteralKind, LiteralRecord, Parameter,
};
use crate::engine::visitor::Detector;

pub fn all() -> Vec<&'static dyn Detector> {
    vec![&METHOD, &CONSTRUCTOR, &CLASS, &INTERFACE, &ANNOTATION, &IMPORT, &CALL, &TRY, &STRING, &NUMBER]
}

fn parse_params<'a>(node: Option<tree_sitter::Node>, ctx: &ExtractionContext<'a>) -> Vec<Parameter> {
    let Some(params) = node else { return Vec::new() };
    let mut cursor = params.walk();
    params
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "formal_parameter" | "spread_parameter"))
        .map(|p| {
            let name = p.child_by_field_name("name").map(|n| ctx.text(n).to_string()).unwrap_or_default();
            let type_annotation = p.child_by_field_name("type").map(|n| ctx.text(n).to_string());
            Parameter { name, type_annotation, default_value: None }
        })
        .collect()
}

struct MethodDetector;
static METHOD: MethodDetector = MethodDetector;
impl Detector for MethodDetector {
    fn id(&self) -> &'static str {
        "java.method"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["method_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let parameters = parse_params(node.child_by_field_name("parameters"), ctx);
        let return_type = node.child_by_field_name("type").map(|n| ctx.text(n).to_string());

        let modifiers = node.child_by_field_name("modifiers").map(|n| ctx.text(n).to_string()).unwrap_or_default();
        let is_exported = modifiers.contains("public");
        let is_async = false;

        let enclosing_class = ctx.current_class();
        let qualified_name = match &enclosing_class {
            Some(owner) => format!("{owner}.{name}"),
            None => name.clone(),
        };

        let signature_text = format!(
            "{name}({}){}",
            parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(","),
            return_type.as_deref().unwrap_or("")
        );
        let body_text = node.child_by_field_name("body").map(|b| ctx.text(b)).unwrap_or("");

        ctx.emit_function(FunctionRecord {
            qualified_name: qualified_name.clone(),
            name: name.clone(),
            parameters,
            return_type,
            decorators: ctx.take_pending_decorators(),
            is_exported,
            is_async,
            is_entry_point: name == "main",
            location: location(node),
            signature_hash: xxh3_64(signature_text.as_bytes()).to_le_bytes(),
            body_hash: xxh3_64(body_text.as_bytes()).to_le_bytes(),
            doc_comment: None,
            enclosing_class,
        });
        ctx.scope_stack.borrow_mut().push(qualified_name);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.scope_stack.borrow_mut().pop();
    }
}

struct ConstructorDetector;
static CONSTRUCTOR: ConstructorDetector = ConstructorDetector;
impl Detector for ConstructorDetector {
    fn id(&self) -> &'static str {
        "java.constructor"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["constructor_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<init>".to_string());
        let parameters = parse_params(node.child_by_field_name("parameters"), ctx);
        let enclosing_class = ctx.current_class();
        let qualified_name = match &enclosing_class {
            Some(owner) => format!("{owner}.{name}"),
            None => name.clone(),
        };
        let signature_text = format!("{name}({})", parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(","));
        let body_text = node.child_by_field_name("body").map(|b| ctx.text(b)).unwrap_or("");
        ctx.emit_function(FunctionRecord {
            qualified_name,
            name,
            parameters,
            return_type: None,
            decorators: ctx.take_pending_decorators(),
            is_exported: true,
            is_async: false,
            is_entry_point: false,
            location: location(node),
            signature_hash: xxh3_64(signature_text.as_bytes()).to_le_bytes(),
            body_hash: xxh3_64(body_text.as_bytes()).to_le_bytes(),
            doc_comment: None,
            enclosing_class,
        });
    }
}

fn emit_type_decl(node: tree_sitter::Node, ctx: &ExtractionContext, kind: ClassKind) {
    let name = node
        .child_by_field_name("name")
        .map(|n| ctx.text(n).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());

    let base_types = node
        .child_by_field_name("superclass")
        .map(|n| vec![ctx.text(n).trim_start_matches("extends").trim().to_string()])
        .unwrap_or_default();
    let implemented_interfaces = node
        .child_by_field_name("interfaces")
        .map(|n| {
            let mut cursor = n.walk();
            n.children(&mut cursor)
                .filter(|c| c.kind() == "type_identifier" || c.kind() == "generic_type")
                .map(|c| ctx.text(c).to_string())
                .collect()
        })
        .unwrap_or_default();

    ctx.emit_class(ClassRecord {
        name: name.clone(),
        qualified_name: name.clone(),
        kind,
        base_types,
        implemented_interfaces,
        properties: Vec::new(),
        decorators: ctx.take_pending_decorators(),
        location: location(node),
    });
    ctx.class_stack.borrow_mut().push(name);
}

struct ClassDetector;
static CLASS: ClassDetector = ClassDetector;
impl Detector for ClassDetector {
    fn id(&self) -> &'static str {
        "java.class"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["class_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        emit_type_decl(node, ctx, ClassKind::Class);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

struct InterfaceDetector;
static INTERFACE: InterfaceDetector = InterfaceDetector;
impl Detector for InterfaceDetector {
    fn id(&self) -> &'static str {
        "java.interface"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["interface_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        emit_type_decl(node, ctx, ClassKind::Interface);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

struct AnnotationDetector;
static ANNOTATION: AnnotationDetector = AnnotationDetector;
impl Detector for AnnotationDetector {
    fn id(&self) -> &'static str {
        "java.annotation"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["marker_annotation", "annotation"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node.child_by_field_name("name").map(|n| ctx.text(n).to_string()).unwrap_or_default();
        let arguments = node
            .child_by_field_name("arguments")
            .map(|args| {
                let mut cursor = args.walk();
                args.children(&mut cursor)
                    .filter(|c| c.is_named())
                    .map(|c| ctx.text(c).to_string())
                    .collect()
            })
            .unwrap_or_default();
        ctx.emit_decorator(Decorator { name, arguments, location: location(node) });
    }
}

struct ImportDetector;
static IMPORT: ImportDetector = ImportDetector;
impl Detector for ImportDetector {
    fn id(&self) -> &'static str {
        "java.import"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["import_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let text = ctx.text(node).trim_start_matches("import").trim().trim_end_matches(';').to_string();
        let is_static = text.starts_with("static");
        let path = text.trim_start_matches("static").trim();
        let (module, name) = match path.rsplit_once('.') {
            Some((m, n)) => (m.to_string(), n.to_string()),
            None => (path.to_string(), path.to_string()),
        };
        ctx.emit_import(ImportRecord {
            source_module: module,
            imported_names: vec![ImportedName { name, alias: None, is_type_only: is_static }],
            is_namespace_import: path.ends_with('*'),
            location: location(node),
        });
    }
}

struct CallDetector;
static CALL: CallDetector = CallDetector;
impl Detector for CallDetector {
    fn id(&self) -> &'static str {
        "java.call"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["method_invocation"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node.child_by_field_name("name").map(|n| ctx.text(n).to_string()).unwrap_or_default();
        let receiver = node.child_by_field_name("object").map(|n| ctx.text(n).to_string());
        let callee_text = match &receiver {
            Some(object) => format!("{object}.{name}"),
            None => name,
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
        "java.try"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["try_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut caught_types = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "catch_clause" {
                if let Some(param) = child.child_by_field_name("parameter") {
                    if let Some(ty) = param.child_by_field_name("type") {
                        caught_types.push(ctx.text(ty).to_string());
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
        "java.string"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["string_literal"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.emit_literal(LiteralRecord {
            kind: LiteralKind::String,
            value: ctx.text(node).trim_matches('"').to_string(),
            location: location(node),
            context: literal_context(node, ctx),
            enclosing_function: ctx.current_function(),
        });
    }
}

struct NumberDetector;
static NUMBER: NumberDetector = NumberDetector;
impl Detector for NumberDetector {
    fn id(&self) -> &'static str {
        "java.number"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["decimal_integer_literal", "decimal_floating_point_literal"]
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

fn literal_context<'a>(node: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> String {
    if let Some(parent) = node.parent() {
        match parent.kind() {
            "variable_declarator" => {
                if let Some(lhs) = parent.child_by_field_name("name") {
                    return format!("assignment:{}", ctx.text(lhs));
                }
            }
            "assignment_expression" => {
                if let Some(lhs) = parent.child_by_field_name("left") {
                    return format!("assignment:{}", ctx.text(lhs));
                }
            }
            "argument_list" => return "call_argument".to_string(),
            _ => {}
        }
    }
    "expression".to_string()
}
