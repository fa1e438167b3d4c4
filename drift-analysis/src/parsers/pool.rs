//! `ParserPool` — thread-local tree-sitter parsers plus the content-hash
//! cache. Compiled queries built on top of these trees are
//! immutable after construction and are shared read-only by the extractor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use drift_core::errors::ParseError;

use crate::scanner::Language;

use super::cache::ParseCache;
use super::grammars::grammar_for;

/// "Error tolerance" — a parser always returns a tree, even on invalid
/// input, by marking damaged regions as error nodes).
#[derive(Debug, Clone, Copy)]
pub struct ParseErrorLocation {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub start_column: usize,
}

pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub parse_errors: Vec<ParseErrorLocation>,
    pub content_hash: [u8; 8],
    pub language: Language,
}

thread_local! {
    static PARSERS: RefCell<HashMap<Language, tree_sitter::Parser>> = RefCell::new(HashMap::new());
}

pub struct ParserPool {
    cache: ParseCache,
    tool_version: String,
}

impl ParserPool {
    pub fn new(tool_version: impl Into<String>) -> Self {
        Self {
            cache: ParseCache::new(),
            tool_version: tool_version.into(),
        }
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Parse `bytes`, consulting the content-hash cache first. On miss,
    /// parses with this thread's parser instance for `language` and
    /// inserts the result.
    pub fn parse(&self, language: Language, bytes: &[u8]) -> Result<Arc<ParseResult>, ParseError> {
        let content_hash = xxhash_rust::xxh3::xxh3_64(bytes).to_le_bytes();
        let mut cache_key = content_hash.to_vec();
        cache_key.extend_from_slice(self.tool_version.as_bytes());

        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let result = self.parse_uncached(language, bytes, None)?;
        let arc = Arc::new(result);
        self.cache.insert(cache_key, Arc::clone(&arc));
        Ok(arc)
    }

    /// Apply edit deltas to `old_tree` then re-parse the affected regions.
    /// Used by IDE-style incremental callers.
    pub fn parse_incremental(
        &self,
        language: Language,
        new_bytes: &[u8],
        old_tree: &tree_sitter::Tree,
        edits: &[tree_sitter::InputEdit],
    ) -> Result<Arc<ParseResult>, ParseError> {
        let mut edited = old_tree.clone();
        for edit in edits {
            edited.edit(edit);
        }
        let result = self.parse_uncached(language, new_bytes, Some(&edited))?;
        Ok(Arc::new(result))
    }

    fn parse_uncached(
        &self,
        language: Language,
        bytes: &[u8],
        old_tree: Option<&tree_sitter::Tree>,
    ) -> Result<ParseResult, ParseError> {
        let grammar = grammar_for(language).ok_or_else(|| ParseError::UnsupportedLanguage {
            language: language.as_str().to_string(),
        })?;

        let tree = PARSERS.with(|parsers| {
            let mut parsers = parsers.borrow_mut();
            let parser = parsers.entry(language).or_insert_with(tree_sitter::Parser::new);
            parser.set_language(&grammar).map_err(|e| ParseError::InternalParserError {
                language: language.as_str().to_string(),
                message: e.to_string(),
            })?;
            parser.parse(bytes, old_tree).ok_or_else(|| ParseError::InternalParserError {
                language: language.as_str().to_string(),
                message: "parser returned no tree".to_string(),
            })
        })?;

        let parse_errors = collect_error_nodes(&tree);
        let content_hash = xxhash_rust::xxh3::xxh3_64(bytes).to_le_bytes();

        Ok(ParseResult { tree, parse_errors, content_hash, language })
    }

    /// Drop every cache entry not stamped with the current tool version
    /// across parser version changes by evicting on mismatch).
    pub fn evict_stale(&self) {
        self.cache.clear();
    }
}

fn collect_error_nodes(tree: &tree_sitter::Tree) -> Vec<ParseErrorLocation> {
    let mut errors = Vec::new();
    let mut cursor = tree.walk();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let start = node.start_position();
            errors.push(ParseErrorLocation {
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                start_line: start.row,
                start_column: start.column,
            });
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_python_without_errors() {
        let pool = ParserPool::new("test");
        let result = pool.parse(Language::Python, b"def f():\n    return 1\n").unwrap();
        assert!(result.parse_errors.is_empty());
    }

    #[test]
    fn cache_hit_returns_identical_tree_shape() {
        let pool = ParserPool::new("test");
        let src = b"def f():\n    return 1\n";
        let first = pool.parse(Language::Python, src).unwrap();
        let second = pool.parse(Language::Python, src).unwrap();
        assert_eq!(
            first.tree.root_node().to_sexp(),
            second.tree.root_node().to_sexp()
        );
    }

    #[test]
    fn malformed_source_still_produces_a_tree() {
        let pool = ParserPool::new("test");
        let result = pool.parse(Language::Python, b"def f(:\n").unwrap();
        assert!(!result.parse_errors.is_empty());
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let pool = ParserPool::new("test");
        let result = pool.parse(Language::C, b"int main() {}");
        assert!(matches!(result, Err(ParseError::UnsupportedLanguage { .. })));
    }
}
