//! `tree-sitter::Language` lookup per supported language.

use crate::scanner::Language;

/// Return the compiled grammar for a language, or `None` if the workspace
/// UnsupportedLanguage`).
pub fn grammar_for(language: Language) -> Option<tree_sitter::Language> {
    Some(match language {
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Language::Kotlin => tree_sitter_kotlin_sg::LANGUAGE.into(),
        // No bundled grammar for C/C++ in the workspace's dependency set;
        // these languages are classified by the scanner but never reach
        // the extractor — `Pipeline::extract_phase` skips files whose
        // grammar lookup returns `None`.
        Language::C | Language::Cpp => return None,
    })
}
