//! `ExtractionContext` — passed to every detector invocation during the
//! single-pass traversal.

use std::cell::RefCell;

use crate::scanner::Language;

use super::file_index::{
    CallRecord, ClassRecord, Decorator, ErrorHandlingRecord, ExportRecord, FileIndex,
    FunctionRecord, HandlerErrorRecord, ImportRecord, LiteralRecord, ModelRecord, RouteRecord,
};

pub struct ExtractionContext<'a> {
    pub source: &'a [u8],
    pub language: Language,
    pub file_path: &'a str,
    /// Decorators collected on the node immediately preceding the one
    /// currently being visited, attached to the next Function/Class emitted.
    pub pending_decorators: RefCell<Vec<Decorator>>,
    /// Enclosing-function/-class name stack, maintained by the traversal so
    /// detectors can stamp calls and literals with their lexical context.
    pub scope_stack: RefCell<Vec<String>>,
    pub class_stack: RefCell<Vec<String>>,
    index: RefCell<FileIndex>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(source: &'a [u8], language: Language, file_path: &'a str, content_hash: [u8; 8]) -> Self {
        Self {
            source,
            language,
            file_path,
            pending_decorators: RefCell::new(Vec::new()),
            scope_stack: RefCell::new(Vec::new()),
            class_stack: RefCell::new(Vec::new()),
            index: RefCell::new(FileIndex::empty(file_path, language, content_hash)),
        }
    }

    pub fn text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    pub fn current_function(&self) -> Option<String> {
        self.scope_stack.borrow().last().cloned()
    }

    pub fn current_class(&self) -> Option<String> {
        self.class_stack.borrow().last().cloned()
    }

    pub fn take_pending_decorators(&self) -> Vec<Decorator> {
        std::mem::take(&mut self.pending_decorators.borrow_mut())
    }

    pub fn emit_function(&self, record: FunctionRecord) {
        self.index.borrow_mut().functions.push(record);
    }
    pub fn emit_class(&self, record: ClassRecord) {
        self.index.borrow_mut().classes.push(record);
    }
    pub fn emit_import(&self, record: ImportRecord) {
        self.index.borrow_mut().imports.push(record);
    }
    pub fn emit_export(&self, record: ExportRecord) {
        self.index.borrow_mut().exports.push(record);
    }
    pub fn emit_call(&self, record: CallRecord) {
        self.index.borrow_mut().calls.push(record);
    }
    pub fn emit_literal(&self, record: LiteralRecord) {
        self.index.borrow_mut().literals.push(record);
    }
    pub fn emit_error_handling(&self, record: ErrorHandlingRecord) {
        self.index.borrow_mut().error_handling.push(record);
    }
    pub fn emit_route(&self, record: RouteRecord) {
        self.index.borrow_mut().routes.push(record);
    }
    pub fn emit_model(&self, record: ModelRecord) {
        self.index.borrow_mut().models.push(record);
    }
    pub fn emit_decorator(&self, decorator: Decorator) {
        self.pending_decorators.borrow_mut().push(decorator);
    }
    pub fn emit_handler_error(&self, record: HandlerErrorRecord) {
        self.index.borrow_mut().handler_errors.push(record);
    }
    pub fn set_namespace(&self, namespace: String) {
        self.index.borrow_mut().namespace = Some(namespace);
    }

    pub fn into_index(self) -> FileIndex {
        self.index.into_inner()
    }
}

pub fn location(node: tree_sitter::Node) -> super::file_index::SourceLocation {
    let start = node.start_position();
    let end = node.end_position();
    super::file_index::SourceLocation {
        line: start.row as u32 + 1,
        column: start.column as u32,
        end_line: end.row as u32 + 1,
        end_column: end.column as u32,
    }
}
