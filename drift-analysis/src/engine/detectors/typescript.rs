//! JavaScript/TypeScript detectors, grounded in the shared
//! `tree-sitter-javascript`/`tree-sitter-typescript` node kinds
//! (`function_declaration`, `method_definition`, `class_declaration`,
//! `call_expression`, `import_statement`, `export_statement`,
//! `try_statement`).

use xxhash_rust::xxh3::xxh3_64;

use crate::engine::context::{location, ExtractionContext};
use crate::engine::file_index::{
    CallRecord, ClassKind, ClassRecord, Decorator, ErrorHandlingRecord, ExportRecord,
    FunctionRecord, ImportRecord, ImportedName, LiteralKind, LiteralRecord, Parameter,
};
use crate::engine::visitor::Detector;

pub fn all() -> Vec<&'static dyn Detector> {
    vec![&FUNCTION, &METHOD, &CLASS, &DECORATOR, &IMPORT, &EXPORT, &CALL, &TRY, &STRING, &NUMBER]
}

fn parse_params<'a>(node: Option<tree_sitter::Node>, ctx: &ExtractionContext<'a>) -> Vec<Parameter> {
    let Some(params) = node else { return Vec::new() };
    let mut cursor = params.walk();
    params
        .children(&mut cursor)
        .filter(|c| c.is_named())
        .map(|p| match p.kind() {
            "identifier" | "required_parameter" | "optional_parameter" => {
                let name_node = p.child_by_field_name("pattern").unwrap_or(p);
                let type_annotation = p
                    .child_by_field_name("type")
                    .map(|t| ctx.text(t).trim_start_matches(':').trim().to_string());
                let default_value = p.child_by_field_name("value").map(|v| ctx.text(v).to_string());
                Parameter { name: ctx.text(name_node).to_string(), type_annotation, default_value }
            }
            _ => Parameter { name: ctx.text(p).to_string(), type_annotation: None, default_value: None },
        })
        .collect()
}

struct FunctionDetector;
static FUNCTION: FunctionDetector = FunctionDetector;
impl Detector for FunctionDetector {
    fn id(&self) -> &'static str {
        "ts.function"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["function_declaration", "arrow_function", "function"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let parameters = parse_params(node.child_by_field_name("parameters"), ctx);
        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| ctx.text(t).trim_start_matches(':').trim().to_string());
        let is_async = ctx.text(node).trim_start().starts_with("async");
        let is_exported = is_exported_node(node, ctx);

        let enclosing_class = ctx.current_class();
        let qualified_name = match &enclosing_class {
            Some(class) => format!("{class}.{name}"),
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
            name,
            parameters,
            return_type,
            decorators: ctx.take_pending_decorators(),
            is_exported,
            is_async,
            is_entry_point: false,
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

struct MethodDetector;
static METHOD: MethodDetector = MethodDetector;
impl Detector for MethodDetector {
    fn id(&self) -> &'static str {
        "ts.method"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["method_definition"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let parameters = parse_params(node.child_by_field_name("parameters"), ctx);
        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| ctx.text(t).trim_start_matches(':').trim().to_string());
        let is_async = ctx.text(node).trim_start().starts_with("async");

        let enclosing_class = ctx.current_class();
        let qualified_name = match &enclosing_class {
            Some(class) => format!("{class}.{name}"),
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
            is_exported: enclosing_class.is_some(),
            is_async,
            is_entry_point: false,
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

/// Field declarations in a class body (`public_field_definition`) — the
/// TypeORM/NestJS equivalent of Django's class-body assignment fields.
fn class_body_properties<'a>(body: tree_sitter::Node, ctx: &ExtractionContext<'a>) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        if member.kind() == "public_field_definition" {
            if let Some(name) = member.child_by_field_name("name") {
                names.push(ctx.text(name).to_string());
            }
        }
    }
    names
}

fn is_exported_node<'a>(node: tree_sitter::Node, _ctx: &ExtractionContext<'a>) -> bool {
    node.parent().map(|p| p.kind() == "export_statement").unwrap_or(false)
}

struct ClassDetector;
static CLASS: ClassDetector = ClassDetector;
impl Detector for ClassDetector {
    fn id(&self) -> &'static str {
        "ts.class"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["class_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let mut base_types = Vec::new();
        let mut implemented = Vec::new();
        if let Some(heritage) = node.child_by_field_name("heritage") {
            let mut cursor = heritage.walk();
            for clause in heritage.children(&mut cursor) {
                match clause.kind() {
                    "extends_clause" => base_types.push(ctx.text(clause).trim_start_matches("extends").trim().to_string()),
                    "implements_clause" => implemented.push(ctx.text(clause).trim_start_matches("implements").trim().to_string()),
                    _ => {}
                }
            }
        }

        let properties = node
            .child_by_field_name("body")
            .map(|body| class_body_properties(body, ctx))
            .unwrap_or_default();

        ctx.emit_class(ClassRecord {
            name: name.clone(),
            qualified_name: name.clone(),
            kind: ClassKind::Class,
            base_types,
            implemented_interfaces: implemented,
            properties,
            decorators: ctx.take_pending_decorators(),
            location: location(node),
        });
        ctx.class_stack.borrow_mut().push(name);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

/// NestJS and Angular rely on decorators (`@Controller`, `@Get`, `@Injectable`)
/// for everything the framework middleware cares about; without this the
/// `pending_decorators` mechanism wired up in `ExtractionContext` never
/// receives anything for TS/JS.
struct DecoratorDetector;
static DECORATOR: DecoratorDetector = DecoratorDetector;
impl Detector for DecoratorDetector {
    fn id(&self) -> &'static str {
        "ts.decorator"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["decorator"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        // A decorator node wraps either a bare identifier/member_expression
        // (`@Injectable`) or a call_expression (`@Controller('users')`).
        let mut cursor = node.walk();
        let inner = node.children(&mut cursor).find(|c| c.is_named());
        let Some(inner) = inner else { return };

        let (name, arguments) = if inner.kind() == "call_expression" {
            let name = inner
                .child_by_field_name("function")
                .map(|n| ctx.text(n).to_string())
                .unwrap_or_default();
            let arguments = inner
                .child_by_field_name("arguments")
                .map(|args| {
                    let mut ac = args.walk();
                    args.children(&mut ac).filter(|a| a.is_named()).map(|a| ctx.text(a).to_string()).collect()
                })
                .unwrap_or_default();
            (name, arguments)
        } else {
            (ctx.text(inner).to_string(), Vec::new())
        };

        ctx.emit_decorator(Decorator { name, arguments, location: location(node) });
    }
}

struct ImportDetector;
static IMPORT: ImportDetector = ImportDetector;
impl Detector for ImportDetector {
    fn id(&self) -> &'static str {
        "ts.import"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["import_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let source_module = node
            .child_by_field_name("source")
            .map(|n| ctx.text(n).trim_matches(['"', '\'']).to_string())
            .unwrap_or_default();

        let mut names = Vec::new();
        let mut is_namespace_import = false;
        if let Some(clause) = node.child_by_field_name("import") {
            collect_import_names(clause, ctx, &mut names, &mut is_namespace_import);
        }

        ctx.emit_import(ImportRecord {
            source_module,
            imported_names: names,
            is_namespace_import,
            location: location(node),
        });
    }
}

fn collect_import_names<'a>(
    node: tree_sitter::Node,
    ctx: &ExtractionContext<'a>,
    out: &mut Vec<ImportedName>,
    is_namespace: &mut bool,
) {
    match node.kind() {
        "identifier" => out.push(ImportedName { name: ctx.text(node).to_string(), alias: None, is_type_only: false }),
        "namespace_import" => {
            *is_namespace = true;
            if let Some(id) = node.child(node.child_count().saturating_sub(1)) {
                out.push(ImportedName { name: ctx.text(id).to_string(), alias: None, is_type_only: false });
            }
        }
        "named_imports" => {
            let mut cursor = node.walk();
            for spec in node.children(&mut cursor) {
                if spec.kind() == "import_specifier" {
                    let name = spec.child_by_field_name("name").map(|n| ctx.text(n).to_string()).unwrap_or_default();
                    let alias = spec.child_by_field_name("alias").map(|n| ctx.text(n).to_string());
                    out.push(ImportedName { name, alias, is_type_only: false });
                }
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_import_names(child, ctx, out, is_namespace);
            }
        }
    }
}

struct ExportDetector;
static EXPORT: ExportDetector = ExportDetector;
impl Detector for ExportDetector {
    fn id(&self) -> &'static str {
        "ts.export"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["export_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let re_export_from = node
            .child_by_field_name("source")
            .map(|n| ctx.text(n).trim_matches(['"', '\'']).to_string());

        if let Some(decl) = node.child_by_field_name("declaration") {
            if let Some(name) = decl.child_by_field_name("name") {
                ctx.emit_export(ExportRecord { name: ctx.text(name).to_string(), re_export_from, location: location(node) });
                return;
            }
        }
        ctx.emit_export(ExportRecord { name: ctx.text(node).to_string(), re_export_from, location: location(node) });
    }
}

struct CallDetector;
static CALL: CallDetector = CallDetector;
impl Detector for CallDetector {
    fn id(&self) -> &'static str {
        "ts.call"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["call_expression"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let (receiver, callee_text) = if function.kind() == "member_expression" {
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
        "ts.try"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["try_statement"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut caught_types = Vec::new();
        if let Some(handler) = node.child_by_field_name("handler") {
            if let Some(param) = handler.child_by_field_name("parameter") {
                caught_types.push(ctx.text(param).to_string());
            }
        }
        ctx.emit_error_handling(ErrorHandlingRecord { caught_types, location: location(node) });
    }
}

struct StringDetector;
static STRING: StringDetector = StringDetector;
impl Detector for StringDetector {
    fn id(&self) -> &'static str {
        "ts.string"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["string", "template_string"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let value = ctx.text(node).trim_matches(['"', '\'', '`']).to_string();
        ctx.emit_literal(LiteralRecord {
            kind: LiteralKind::String,
            value,
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
        "ts.number"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["number"]
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
            "arguments" => return "call_argument".to_string(),
            _ => {}
        }
    }
    "expression".to_string()
}
