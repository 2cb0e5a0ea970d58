//! Language detection from file extensions
//!
//! The lookup table is closed: anything not listed maps to `PlainText`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Languages the indexer recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    Kotlin,
    CSharp,
    C,
    Cpp,
    Ruby,
    Php,
    Swift,
    Shell,
    Html,
    Css,
    Json,
    Yaml,
    Toml,
    Markdown,
    Sql,
    PlainText,
}

/// Groups of languages that share declaration syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    JsTs,
    Python,
    Rust,
    Go,
    /// Java, Kotlin, C# - class-based with brace blocks
    Jvm,
    /// C and C++
    CLike,
    Ruby,
    Php,
    Swift,
    Shell,
    /// Markup, data and plain text - no symbol extraction
    Other,
}

const EXTENSIONS: &[(&str, Language)] = &[
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("py", Language::Python),
    ("pyi", Language::Python),
    ("rs", Language::Rust),
    ("go", Language::Go),
    ("java", Language::Java),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("cs", Language::CSharp),
    ("c", Language::C),
    ("h", Language::C),
    ("cc", Language::Cpp),
    ("cpp", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("hh", Language::Cpp),
    ("rb", Language::Ruby),
    ("php", Language::Php),
    ("swift", Language::Swift),
    ("sh", Language::Shell),
    ("bash", Language::Shell),
    ("zsh", Language::Shell),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("scss", Language::Css),
    ("less", Language::Css),
    ("json", Language::Json),
    ("yaml", Language::Yaml),
    ("yml", Language::Yaml),
    ("toml", Language::Toml),
    ("md", Language::Markdown),
    ("markdown", Language::Markdown),
    ("sql", Language::Sql),
];

const ALL: &[Language] = &[
    Language::TypeScript,
    Language::JavaScript,
    Language::Python,
    Language::Rust,
    Language::Go,
    Language::Java,
    Language::Kotlin,
    Language::CSharp,
    Language::C,
    Language::Cpp,
    Language::Ruby,
    Language::Php,
    Language::Swift,
    Language::Shell,
    Language::Html,
    Language::Css,
    Language::Json,
    Language::Yaml,
    Language::Toml,
    Language::Markdown,
    Language::Sql,
    Language::PlainText,
];

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::CSharp => "csharp",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Shell => "shell",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Markdown => "markdown",
            Self::Sql => "sql",
            Self::PlainText => "plaintext",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL.iter().copied().find(|lang| lang.as_str() == s)
    }

    /// Look up an extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, lang)| *lang)
            .unwrap_or(Self::PlainText)
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::PlainText)
    }

    pub fn family(&self) -> LanguageFamily {
        match self {
            Self::TypeScript | Self::JavaScript => LanguageFamily::JsTs,
            Self::Python => LanguageFamily::Python,
            Self::Rust => LanguageFamily::Rust,
            Self::Go => LanguageFamily::Go,
            Self::Java | Self::Kotlin | Self::CSharp => LanguageFamily::Jvm,
            Self::C | Self::Cpp => LanguageFamily::CLike,
            Self::Ruby => LanguageFamily::Ruby,
            Self::Php => LanguageFamily::Php,
            Self::Swift => LanguageFamily::Swift,
            Self::Shell => LanguageFamily::Shell,
            Self::Html
            | Self::Css
            | Self::Json
            | Self::Yaml
            | Self::Toml
            | Self::Markdown
            | Self::Sql
            | Self::PlainText => LanguageFamily::Other,
        }
    }

    pub fn is_js_ts(&self) -> bool {
        self.family() == LanguageFamily::JsTs
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
