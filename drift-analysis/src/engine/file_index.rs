//! `FileIndex` — the canonical per-file extraction output. A pure function
//! of `(file_id, content_hash)`; two files with identical bytes may share a
//! cache entry.

use serde::{Deserialize, Serialize};

use crate::scanner::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
    pub default_value: Option<String>,
}

/// A decorator/annotation, parsed into structured name + arguments rather
/// than a raw string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
    pub arguments: Vec<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub qualified_name: String,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub decorators: Vec<Decorator>,
    pub is_exported: bool,
    pub is_async: bool,
    pub is_entry_point: bool,
    pub location: SourceLocation,
    /// Hash of the signature text alone — gates call-graph invalidation
    /// separately from body edits.
    pub signature_hash: [u8; 8],
    /// Hash of the body text alone — body-only edits never touch this.
    pub body_hash: [u8; 8],
    pub doc_comment: Option<String>,
    pub enclosing_class: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
    Record,
}

impl ClassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Struct => "struct",
            ClassKind::Enum => "enum",
            ClassKind::Trait => "trait",
            ClassKind::Record => "record",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub qualified_name: String,
    pub kind: ClassKind,
    pub base_types: Vec<String>,
    pub implemented_interfaces: Vec<String>,
    pub properties: Vec<String>,
    pub decorators: Vec<Decorator>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub source_module: String,
    pub imported_names: Vec<ImportedName>,
    pub is_namespace_import: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
    pub is_type_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    /// `Some(source)` for re-exports (`export { x } from "./y"`).
    pub re_export_from: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub receiver: Option<String>,
    pub callee_text: String,
    pub argument_count: usize,
    pub location: SourceLocation,
    pub enclosing_function: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralRecord {
    pub kind: LiteralKind,
    pub value: String,
    pub location: SourceLocation,
    /// Enclosing AST context, e.g. `"assignment:AWS_ACCESS_KEY_ID"`,
    /// `"call_argument"`.
    pub context: String,
    pub enclosing_function: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingRecord {
    pub caught_types: Vec<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub http_method: String,
    pub raw_path: String,
    pub handler_qualified_name: Option<String>,
    pub framework: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFieldRecord {
    pub name: String,
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub model_name: String,
    pub table_name: Option<String>,
    pub fields: Vec<ModelFieldRecord>,
    pub framework: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiExclusionRecord {
    pub call_site_line: u32,
    pub mechanism: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseErrorRecord {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerErrorRecord {
    pub handler_id: String,
    pub node_kind: String,
    pub message: String,
}

/// The canonical per-file extraction output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIndex {
    pub file_path: String,
    pub language: Language,
    pub content_hash: [u8; 8],
    pub functions: Vec<FunctionRecord>,
    pub classes: Vec<ClassRecord>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
    pub calls: Vec<CallRecord>,
    pub literals: Vec<LiteralRecord>,
    pub error_handling: Vec<ErrorHandlingRecord>,
    pub namespace: Option<String>,
    pub routes: Vec<RouteRecord>,
    pub models: Vec<ModelRecord>,
    pub di_sites: Vec<DiExclusionRecord>,
    pub parse_errors: Vec<ParseErrorRecord>,
    pub handler_errors: Vec<HandlerErrorRecord>,
}

impl FileIndex {
    pub fn empty(file_path: impl Into<String>, language: Language, content_hash: [u8; 8]) -> Self {
        Self {
            file_path: file_path.into(),
            language,
            content_hash,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            calls: Vec::new(),
            literals: Vec::new(),
            error_handling: Vec::new(),
            namespace: None,
            routes: Vec::new(),
            models: Vec::new(),
            di_sites: Vec::new(),
            parse_errors: Vec::new(),
            handler_errors: Vec::new(),
        }
    }
}
