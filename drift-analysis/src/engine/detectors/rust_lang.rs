//! Rust detectors, grounded in the `tree-sitter-rust` grammar's node kinds
//! (`function_item`, `struct_item`/`enum_item`/`trait_item`,
//! `call_expression`, `use_declaration`, `match_expression`).

use xxhash_rust::xxh3::xxh3_64;

use crate::engine::context::{location, ExtractionContext};
use crate::engine::file_index::{
    CallRecord, ClassKind, ClassRecord, ErrorHandlingRecord, FunctionRecord, ImportRecord,
    ImportedName, LiteralKind, LiteralRecord, Parameter,
};
use crate::engine::visitor::Detector;

pub fn all() -> Vec<&'static dyn Detector> {
    vec![&FUNCTION, &STRUCT, &ENUM, &TRAIT, &USE, &CALL, &MATCH_ERR, &STRING, &NUMBER]
}

struct FunctionDetector;
static FUNCTION: FunctionDetector = FunctionDetector;
impl Detector for FunctionDetector {
    fn id(&self) -> &'static str {
        "rust.function"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["function_item"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| {
                let mut cursor = params.walk();
                params
                    .children(&mut cursor)
                    .filter(|c| c.kind() == "parameter" || c.kind() == "self_parameter")
                    .map(|p| {
                        let pname = p.child_by_field_name("pattern").map(|n| ctx.text(n).to_string())
                            .unwrap_or_else(|| ctx.text(p).to_string());
                        let ptype = p.child_by_field_name("type").map(|n| ctx.text(n).to_string());
                        Parameter { name: pname, type_annotation: ptype, default_value: None }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let return_type = node.child_by_field_name("return_type").map(|n| ctx.text(n).to_string());
        let is_async = ctx.text(node).trim_start().starts_with("async ")
            || ctx.text(node).trim_start().starts_with("pub async ");
        let is_exported = ctx.text(node).trim_start().starts_with("pub");

        let enclosing_class = ctx.current_class();
        let qualified_name = match &enclosing_class {
            Some(owner) => format!("{owner}::{name}"),
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

fn emit_type_decl(node: tree_sitter::Node, ctx: &ExtractionContext, kind: ClassKind) {
    let name = node
        .child_by_field_name("name")
        .map(|n| ctx.text(n).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());
    ctx.emit_class(ClassRecord {
        name: name.clone(),
        qualified_name: name.clone(),
        kind,
        base_types: Vec::new(),
        implemented_interfaces: Vec::new(),
        properties: Vec::new(),
        decorators: ctx.take_pending_decorators(),
        location: location(node),
    });
    ctx.class_stack.borrow_mut().push(name);
}

struct StructDetector;
static STRUCT: StructDetector = StructDetector;
impl Detector for StructDetector {
    fn id(&self) -> &'static str {
        "rust.struct"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["struct_item"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        emit_type_decl(node, ctx, ClassKind::Struct);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

struct EnumDetector;
static ENUM: EnumDetector = EnumDetector;
impl Detector for EnumDetector {
    fn id(&self) -> &'static str {
        "rust.enum"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["enum_item"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        emit_type_decl(node, ctx, ClassKind::Enum);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

struct TraitDetector;
static TRAIT: TraitDetector = TraitDetector;
impl Detector for TraitDetector {
    fn id(&self) -> &'static str {
        "rust.trait"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["trait_item"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        emit_type_decl(node, ctx, ClassKind::Trait);
    }
    fn on_exit(&self, _node: tree_sitter::Node, ctx: &ExtractionContext) {
        ctx.class_stack.borrow_mut().pop();
    }
}

struct UseDetector;
static USE: UseDetector = UseDetector;
impl Detector for UseDetector {
    fn id(&self) -> &'static str {
        "rust.use"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["use_declaration"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let text = ctx.text(node).trim_start_matches("pub").trim().trim_start_matches("use").trim().trim_end_matches(';').to_string();
        let (module, name) = match text.rsplit_once("::") {
            Some((head, tail)) if !tail.starts_with('{') => (head.to_string(), tail.to_string()),
            _ => (text.clone(), "*".to_string()),
        };
        ctx.emit_import(ImportRecord {
            source_module: module,
            imported_names: vec![ImportedName { name, alias: None, is_type_only: false }],
            is_namespace_import: false,
            location: location(node),
        });
    }
}

struct CallDetector;
static CALL: CallDetector = CallDetector;
impl Detector for CallDetector {
    fn id(&self) -> &'static str {
        "rust.call"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["call_expression"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let (receiver, callee_text) = if function.kind() == "field_expression" {
            let object = function.child_by_field_name("value").map(|n| ctx.text(n).to_string());
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

/// Rust has no try/catch; `match` on a `Result`/`Option` with an `Err(..)`
/// arm is the idiomatic equivalent, recorded as error-handling evidence.
struct MatchErrDetector;
static MATCH_ERR: MatchErrDetector = MatchErrDetector;
impl Detector for MatchErrDetector {
    fn id(&self) -> &'static str {
        "rust.match_err"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["match_expression"]
    }
    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext) {
        let mut caught_types = Vec::new();
        let mut cursor = node.walk();
        if let Some(body) = node.child_by_field_name("body") {
            let mut inner = body.walk();
            for arm in body.children(&mut inner) {
                if arm.kind() == "match_arm" {
                    let text = ctx.text(arm);
                    if text.trim_start().starts_with("Err") {
                        caught_types.push("Err".to_string());
                    }
                }
            }
        }
        let _ = &mut cursor;
        if !caught_types.is_empty() {
            ctx.emit_error_handling(ErrorHandlingRecord { caught_types, location: location(node) });
        }
    }
}

struct StringDetector;
static STRING: StringDetector = StringDetector;
impl Detector for StringDetector {
    fn id(&self) -> &'static str {
        "rust.string"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["string_literal", "raw_string_literal"]
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
        "rust.number"
    }
    fn interested_kinds(&self) -> &'static [&'static str] {
        &["integer_literal", "float_literal"]
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
            "let_declaration" => {
                if let Some(pat) = parent.child_by_field_name("pattern") {
                    return format!("assignment:{}", ctx.text(pat));
                }
            }
            "arguments" => return "call_argument".to_string(),
            _ => {}
        }
    }
    "expression".to_string()
}
