//! Heuristic metadata extraction
//!
//! Symbols, imports, exports and comments are pulled out of source text with
//! per-family regex tables rather than a real parser. Adding a language means
//! adding a table row, not new control flow. Results are best effort: a
//! pattern that fails to compile is logged and skipped, so the affected field
//! just comes back shorter (or empty).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::document::FileType;
use super::language::{Language, LanguageFamily};

/// Prefix for default exports (`export default App` -> `default:App`)
pub const DEFAULT_EXPORT_MARKER: &str = "default:";

/// Metadata derived from one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub symbols: Vec<String>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub comments: Vec<String>,
    pub file_type: FileType,
}

/// How a capture is turned into entries
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// The capture is a single name or module path
    Name,
    /// The capture is a comma/newline separated list (`export { a, b as c }`)
    List,
    /// The capture is the name of a default export
    Default,
}

struct Rule {
    pattern: &'static str,
    shape: Shape,
}

const fn name(pattern: &'static str) -> Rule {
    Rule {
        pattern,
        shape: Shape::Name,
    }
}

const fn list(pattern: &'static str) -> Rule {
    Rule {
        pattern,
        shape: Shape::List,
    }
}

const fn default_export(pattern: &'static str) -> Rule {
    Rule {
        pattern,
        shape: Shape::Default,
    }
}

struct FamilyRules {
    family: LanguageFamily,
    symbols: &'static [Rule],
    imports: &'static [Rule],
    exports: &'static [Rule],
}

const RULES: &[FamilyRules] = &[
    FamilyRules {
        family: LanguageFamily::JsTs,
        symbols: &[
            name(r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:async[ \t]+)?function[ \t]*\*?[ \t]*([A-Za-z_$][\w$]*)"),
            name(r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:abstract[ \t]+)?class[ \t]+([A-Za-z_$][\w$]*)"),
            name(r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?(?:interface|type|enum)[ \t]+([A-Za-z_$][\w$]*)"),
            // top-level bindings
            name(r"(?m)^(?:export[ \t]+)?(?:const|let|var)[ \t]+([A-Za-z_$][\w$]*)"),
            // arrow bindings at any depth
            name(r"(?m)^[ \t]*(?:export[ \t]+)?(?:const|let|var)[ \t]+([A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=[ \t]*(?:async[ \t]+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=>"),
            // class field arrows
            name(r"(?m)^[ \t]+([A-Za-z_$][\w$]*)[ \t]*=[ \t]*(?:async[ \t]+)?\([^)]*\)[ \t]*=>"),
            // methods
            name(r"(?m)^[ \t]+(?:(?:public|private|protected|static|async|readonly|override|get|set)[ \t]+)*([A-Za-z_$][\w$]*)[ \t]*\([^)]*\)[ \t]*(?::[ \t]*[^{;\n]+)?\{"),
        ],
        imports: &[
            name(r#"(?m)^[ \t]*import[ \t]+(?:type[ \t]+)?(?:[\w*{}\s,$]+[ \t]+from[ \t]+)?['"]([^'"]+)['"]"#),
            name(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#),
            name(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#),
            name(r#"(?m)^[ \t]*export[ \t]+(?:type[ \t]+)?(?:\*(?:[ \t]+as[ \t]+\w+)?|\{[^}]*\})[ \t]+from[ \t]+['"]([^'"]+)['"]"#),
        ],
        exports: &[
            name(r"(?m)^[ \t]*export[ \t]+(?:declare[ \t]+)?(?:async[ \t]+)?(?:function[ \t]*\*?|abstract[ \t]+class|class|const|let|var|interface|type|enum)[ \t]+([A-Za-z_$][\w$]*)"),
            list(r"(?m)^[ \t]*export[ \t]*\{([^}]*)\}"),
            default_export(r"(?m)^[ \t]*export[ \t]+default[ \t]+(?:async[ \t]+)?(?:(?:function[ \t]*\*?|abstract[ \t]+class|class)[ \t]+)?([A-Za-z_$][\w$]*)"),
            name(r"(?m)^[ \t]*(?:module\.)?exports\.([A-Za-z_$][\w$]*)[ \t]*="),
            list(r"(?m)^[ \t]*module\.exports[ \t]*=[ \t]*\{([^}]*)\}"),
            default_export(r"(?m)^[ \t]*module\.exports[ \t]*=[ \t]*([A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$"),
        ],
    },
    FamilyRules {
        family: LanguageFamily::Python,
        symbols: &[
            name(r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^[ \t]*class[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^([A-Za-z_]\w*)[ \t]*(?::[^=\n]+)?=[^=]"),
        ],
        imports: &[
            name(r"(?m)^[ \t]*import[ \t]+([\w.]+)"),
            name(r"(?m)^[ \t]*from[ \t]+([\w.]+)[ \t]+import"),
        ],
        exports: &[list(r"__all__[ \t]*=[ \t]*[\[(]([^\])]*)[\])]")],
    },
    FamilyRules {
        family: LanguageFamily::Rust,
        symbols: &[
            name(r#"(?m)^[ \t]*(?:pub(?:\([^)]*\))?[ \t]+)?(?:(?:const|async|unsafe)[ \t]+)*(?:extern[ \t]+"[^"]*"[ \t]+)?fn[ \t]+([A-Za-z_]\w*)"#),
            name(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?[ \t]+)?(?:struct|enum|trait|type|union|mod)[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^(?:pub(?:\([^)]*\))?[ \t]+)?(?:const|static)[ \t]+(?:mut[ \t]+)?([A-Za-z_]\w*)"),
            name(r"macro_rules![ \t]*([A-Za-z_]\w*)"),
        ],
        imports: &[
            name(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?[ \t]+)?use[ \t]+([\w:]+?)(?:::\{|::\*|[ \t]+as[ \t]+|;)"),
            name(r"(?m)^[ \t]*extern[ \t]+crate[ \t]+(\w+)"),
        ],
        exports: &[name(
            r"(?m)^[ \t]*pub[ \t]+(?:(?:async|const|unsafe)[ \t]+)*(?:fn|struct|enum|trait|type|mod|const|static|union)[ \t]+([A-Za-z_]\w*)",
        )],
    },
    FamilyRules {
        family: LanguageFamily::Go,
        symbols: &[
            name(r"(?m)^func[ \t]+(?:\([^)]*\)[ \t]*)?([A-Za-z_]\w*)"),
            name(r"(?m)^type[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^(?:var|const)[ \t]+([A-Za-z_]\w*)"),
        ],
        imports: &[
            name(r#"(?m)^import[ \t]+(?:[\w.]+[ \t]+)?"([^"]+)""#),
            list(r"(?m)^import[ \t]*\(([^)]*)\)"),
        ],
        exports: &[
            name(r"(?m)^func[ \t]+(?:\([^)]*\)[ \t]*)?([A-Z]\w*)"),
            name(r"(?m)^type[ \t]+([A-Z]\w*)"),
        ],
    },
    FamilyRules {
        family: LanguageFamily::Jvm,
        symbols: &[
            name(r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|final|abstract|sealed|data|open|partial|inner)[ \t]+)*(?:class|interface|enum|record|object|struct)[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|final|abstract|synchronized|override|virtual|async|open|suspend)[ \t]+)+(?:[\w<>\[\],.?]+[ \t]+)?([A-Za-z_]\w*)[ \t]*\("),
            name(r"(?m)^[ \t]*(?:\w+[ \t]+)*fun[ \t]+(?:<[^>]*>[ \t]*)?(?:[\w.]+\.)?([A-Za-z_]\w*)[ \t]*\("),
        ],
        imports: &[
            name(r"(?m)^[ \t]*import[ \t]+(?:static[ \t]+)?([\w.*]+)"),
            name(r"(?m)^[ \t]*using[ \t]+(?:static[ \t]+)?([\w.]+)[ \t]*;"),
        ],
        exports: &[name(
            r"(?m)^[ \t]*public[ \t]+(?:(?:static|final|abstract|sealed|partial)[ \t]+)*(?:class|interface|enum|record|struct)[ \t]+([A-Za-z_]\w*)",
        )],
    },
    FamilyRules {
        family: LanguageFamily::CLike,
        symbols: &[
            name(r"(?m)^(?:(?:static|inline|extern|virtual|const|unsigned|signed)[ \t]+)*[A-Za-z_][\w:<>]*[ \t\*&]+([A-Za-z_][\w:]*)[ \t]*\([^;{)]*\)[ \t]*(?:const[ \t]*)?\{"),
            name(r"(?m)^[ \t]*(?:typedef[ \t]+)?(?:struct|class|enum|union|namespace)[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^[ \t]*#[ \t]*define[ \t]+([A-Za-z_]\w*)"),
        ],
        imports: &[name(r#"(?m)^[ \t]*#[ \t]*include[ \t]*[<"]([^>"]+)[>"]"#)],
        exports: &[],
    },
    FamilyRules {
        family: LanguageFamily::Ruby,
        symbols: &[
            name(r"(?m)^[ \t]*def[ \t]+(?:self\.)?([A-Za-z_]\w*[?!=]?)"),
            name(r"(?m)^[ \t]*(?:class|module)[ \t]+([A-Z][\w:]*)"),
        ],
        imports: &[name(
            r#"(?m)^[ \t]*require(?:_relative)?[ \t]*\(?[ \t]*['"]([^'"]+)['"]"#,
        )],
        exports: &[],
    },
    FamilyRules {
        family: LanguageFamily::Php,
        symbols: &[
            name(r"function[ \t]+&?([A-Za-z_]\w*)"),
            name(r"(?m)^[ \t]*(?:(?:abstract|final|readonly)[ \t]+)*(?:class|interface|trait|enum)[ \t]+([A-Za-z_]\w*)"),
        ],
        imports: &[
            name(r"(?m)^[ \t]*use[ \t]+([\w\\]+)"),
            name(r#"(?:require|include)(?:_once)?[ \t]*\(?[ \t]*['"]([^'"]+)['"]"#),
        ],
        exports: &[],
    },
    FamilyRules {
        family: LanguageFamily::Swift,
        symbols: &[
            name(r"func[ \t]+([A-Za-z_]\w*)"),
            name(r"(?m)^[ \t]*(?:(?:public|private|internal|open|final|fileprivate)[ \t]+)*(?:class|struct|enum|protocol|extension|actor)[ \t]+([A-Za-z_]\w*)"),
        ],
        imports: &[name(r"(?m)^[ \t]*import[ \t]+(\w+)")],
        exports: &[name(
            r"(?m)^[ \t]*(?:public|open)[ \t]+(?:final[ \t]+)?(?:func|class|struct|enum|protocol)[ \t]+([A-Za-z_]\w*)",
        )],
    },
    FamilyRules {
        family: LanguageFamily::Shell,
        symbols: &[
            name(r"(?m)^[ \t]*function[ \t]+([A-Za-z_][\w-]*)"),
            name(r"(?m)^[ \t]*([A-Za-z_][\w-]*)[ \t]*\(\)[ \t]*\{"),
        ],
        imports: &[name(r"(?m)^[ \t]*(?:source|\.)[ \t]+([^\s;]+)")],
        exports: &[],
    },
];

/// Words the symbol patterns can catch that are never declarations
const RESERVED: &[&str] = &[
    "if", "else", "for", "while", "switch", "catch", "return", "function", "class", "new",
    "await", "typeof", "async", "do", "try", "with", "fn", "mut", "match", "loop", "in",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CommentStyle {
    /// `// line`
    Slash,
    /// `/* block */`
    Block,
    /// `# line`
    Hash,
    /// `-- line`
    Dash,
    /// `<!-- block -->`
    Markup,
}

const COMMENT_PATTERNS: &[(CommentStyle, &str)] = &[
    (CommentStyle::Slash, r#"(?m)(?:^|[^:"'\\])//+!?(.*)$"#),
    (CommentStyle::Block, r"(?s)/\*+!?(.*?)\*+/"),
    (CommentStyle::Hash, r"(?m)(?:^|[ \t])#+!?(.*)$"),
    (CommentStyle::Dash, r"(?m)(?:^|[ \t])--(.*)$"),
    (CommentStyle::Markup, r"(?s)<!--(.*?)-->"),
];

fn comment_styles(language: Language) -> &'static [CommentStyle] {
    use CommentStyle::*;
    match language {
        Language::TypeScript
        | Language::JavaScript
        | Language::Rust
        | Language::Go
        | Language::Java
        | Language::Kotlin
        | Language::CSharp
        | Language::C
        | Language::Cpp
        | Language::Swift => &[Slash, Block],
        Language::Php => &[Slash, Block, Hash],
        Language::Python
        | Language::Ruby
        | Language::Shell
        | Language::Yaml
        | Language::Toml => &[Hash],
        Language::Css => &[Block],
        Language::Sql => &[Dash, Block],
        Language::Html | Language::Markdown => &[Markup],
        Language::Json | Language::PlainText => &[],
    }
}

struct CompiledRule {
    regex: Regex,
    shape: Shape,
}

#[derive(Default)]
struct CompiledFamily {
    symbols: Vec<CompiledRule>,
    imports: Vec<CompiledRule>,
    exports: Vec<CompiledRule>,
}

fn compile(rules: &[Rule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(regex) => Some(CompiledRule {
                regex,
                shape: rule.shape,
            }),
            Err(e) => {
                tracing::warn!("Skipping extractor pattern {:?}: {}", rule.pattern, e);
                None
            }
        })
        .collect()
}

static FAMILIES: Lazy<HashMap<LanguageFamily, CompiledFamily>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rules| {
            (
                rules.family,
                CompiledFamily {
                    symbols: compile(rules.symbols),
                    imports: compile(rules.imports),
                    exports: compile(rules.exports),
                },
            )
        })
        .collect()
});

static COMMENTS: Lazy<HashMap<CommentStyle, Regex>> = Lazy::new(|| {
    COMMENT_PATTERNS
        .iter()
        .filter_map(|(style, pattern)| match Regex::new(pattern) {
            Ok(regex) => Some((*style, regex)),
            Err(e) => {
                tracing::warn!("Skipping comment pattern for {:?}: {}", style, e);
                None
            }
        })
        .collect()
});

/// Extract metadata from content alone
///
/// Filename-based file type rules are not applied; use [`extract_for_path`]
/// when the path is known.
pub fn extract(content: &str, language: Language) -> FileMetadata {
    extract_inner(None, content, language)
}

/// Extract metadata, also using the file name for file type detection
pub fn extract_for_path(path: &Path, content: &str, language: Language) -> FileMetadata {
    let file_name = path.file_name().and_then(|n| n.to_str());
    extract_inner(file_name, content, language)
}

fn extract_inner(file_name: Option<&str>, content: &str, language: Language) -> FileMetadata {
    let family = FAMILIES.get(&language.family());

    FileMetadata {
        symbols: family
            .map(|f| apply(&f.symbols, content))
            .unwrap_or_default(),
        imports: family
            .map(|f| apply(&f.imports, content))
            .unwrap_or_default(),
        exports: family
            .map(|f| apply(&f.exports, content))
            .unwrap_or_default(),
        comments: extract_comments(content, language),
        file_type: detect_file_type(file_name, content, language),
    }
}

fn apply(rules: &[CompiledRule], content: &str) -> Vec<String> {
    let mut found = Vec::new();
    for rule in rules {
        for caps in rule.regex.captures_iter(content) {
            let Some(m) = caps.iter().skip(1).flatten().next() else {
                continue;
            };
            match rule.shape {
                Shape::Name => found.extend(clean_name(m.as_str())),
                Shape::List => found.extend(split_list(m.as_str())),
                Shape::Default => found.extend(
                    clean_name(m.as_str()).map(|n| format!("{}{}", DEFAULT_EXPORT_MARKER, n)),
                ),
            }
        }
    }
    dedup(found)
}

fn clean_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || RESERVED.contains(&name) {
        return None;
    }
    Some(name.to_string())
}

/// Split `a, b as c, 'd'` style lists into bare names
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .filter_map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() || piece.starts_with("//") || piece.starts_with('#') {
                return None;
            }
            let piece = piece.rsplit(" as ").next().unwrap_or(piece);
            let piece = piece.split(':').next().unwrap_or(piece);
            let token = piece.split_whitespace().last()?;
            clean_name(token.trim_matches(|c| c == '"' || c == '\'' || c == '`'))
        })
        .collect()
}

fn extract_comments(content: &str, language: Language) -> Vec<String> {
    let mut found = Vec::new();
    for style in comment_styles(language) {
        let Some(regex) = COMMENTS.get(style) else {
            continue;
        };
        for caps in regex.captures_iter(content) {
            let Some(body) = caps.get(1) else {
                continue;
            };
            let text = match style {
                CommentStyle::Block | CommentStyle::Markup => clean_block(body.as_str()),
                _ => body.as_str().trim().to_string(),
            };
            if !text.is_empty() {
                found.push(text);
            }
        }
    }
    dedup(found)
}

/// Strip the leading `*` gutter from block comment lines
fn clean_block(body: &str) -> String {
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

const TEST_NAME_MARKERS: &[&str] = &[".test.", ".spec.", "_test.", "_spec."];

/// Pairs of calls that together mark a test file
const TEST_CALL_PAIRS: &[(&str, &str)] = &[
    (r"\bdescribe\s*\(", r"\bit\s*\("),
    (r"\bdescribe\s*\(", r"\btest\s*\("),
    (r"(?m)^\s*def\s+test_", r"\b(?:pytest|unittest)\b"),
    (r"(?m)^func\s+Test\w*\s*\(", r#""testing""#),
];

const UI_MARKERS: &[&str] = &[
    r#"from\s+['"]react['"]"#,
    r#"require\(\s*['"]react['"]\s*\)"#,
    r"\buse(?:State|Effect|Context|Reducer|Memo|Callback|Ref|LayoutEffect)\s*\(",
];

const CONFIG_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "jsconfig.json",
    "cargo.toml",
    "pyproject.toml",
    "setup.cfg",
    "setup.py",
    "requirements.txt",
    "go.mod",
    "gemfile",
    "composer.json",
    "pom.xml",
    "build.gradle",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "makefile",
    ".babelrc",
    ".editorconfig",
    ".gitignore",
];

const CONFIG_PREFIXES: &[&str] = &[".eslintrc", ".prettierrc"];

static TEST_PAIRS: Lazy<Vec<(Regex, Regex)>> = Lazy::new(|| {
    TEST_CALL_PAIRS
        .iter()
        .filter_map(|(a, b)| Some((Regex::new(a).ok()?, Regex::new(b).ok()?)))
        .collect()
});

static UI_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| UI_MARKERS.iter().filter_map(|p| Regex::new(p).ok()).collect());

/// Refine the language into a file type
///
/// Rules run in priority order: test, UI component (JS/TS only), config,
/// documentation. The first hit wins.
pub fn detect_file_type(file_name: Option<&str>, content: &str, language: Language) -> FileType {
    let lower = file_name.map(|n| n.to_ascii_lowercase());
    let lower = lower.as_deref();

    if is_test_file(lower, content) {
        return FileType::Test(language);
    }
    if language.is_js_ts() && UI_PATTERNS.iter().any(|re| re.is_match(content)) {
        return FileType::ReactComponent;
    }
    if lower.is_some_and(is_config_name) {
        return FileType::Config;
    }
    if language == Language::Markdown || lower.is_some_and(|n| n.starts_with("readme")) {
        return FileType::Documentation;
    }
    FileType::Source(language)
}

fn is_test_file(lower_name: Option<&str>, content: &str) -> bool {
    if let Some(name) = lower_name {
        if TEST_NAME_MARKERS.iter().any(|m| name.contains(m)) || name.starts_with("test_") {
            return true;
        }
    }
    TEST_PAIRS
        .iter()
        .any(|(a, b)| a.is_match(content) && b.is_match(content))
}

fn is_config_name(lower_name: &str) -> bool {
    if CONFIG_FILES.contains(&lower_name) {
        return true;
    }
    if CONFIG_PREFIXES.iter().any(|p| lower_name.starts_with(p)) {
        return true;
    }
    // webpack.config.js, vite.config.ts, jest.config.mjs ...
    let mut parts = lower_name.rsplitn(3, '.');
    let ext = parts.next();
    let middle = parts.next();
    parts.next().is_some()
        && middle == Some("config")
        && matches!(ext, Some("js" | "ts" | "mjs" | "cjs" | "json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(items: &[String], want: &str) -> bool {
        items.iter().any(|i| i == want)
    }

    #[test]
    fn test_typescript_component() {
        let source = r#"import React, { useState } from 'react';
import { helper } from "./utils/helper";
const fs = require('fs');
// Renders the main app
/**
 * Main component
 */
export default function App() {
  const [count, setCount] = useState(0);
  return null;
}
export const formatName = (name) => name.trim();
export class UserService {
  async fetchUser(id) {
    return id;
  }
}
function internalHelper() {}
"#;
        let meta = extract_for_path(Path::new("App.tsx"), source, Language::TypeScript);

        for sym in ["App", "formatName", "UserService", "fetchUser", "internalHelper", "fs"] {
            assert!(has(&meta.symbols, sym), "missing symbol {sym}: {:?}", meta.symbols);
        }
        assert!(!has(&meta.symbols, "return"));
        assert_eq!(meta.imports, vec!["react", "./utils/helper", "fs"]);
        assert!(has(&meta.exports, "default:App"));
        assert!(has(&meta.exports, "formatName"));
        assert!(has(&meta.exports, "UserService"));
        assert!(!has(&meta.exports, "internalHelper"));
        assert!(has(&meta.comments, "Renders the main app"));
        assert!(has(&meta.comments, "Main component"));
        assert_eq!(meta.file_type, FileType::ReactComponent);
    }

    #[test]
    fn test_js_export_lists_and_commonjs() {
        let source = "function a() {}\nfunction b() {}\nexport { a, b as renamed };\nexport * from './other';\nmodule.exports = { a, c: b };\nexports.d = 1;\n";
        let meta = extract(source, Language::JavaScript);
        assert!(has(&meta.exports, "a"));
        assert!(has(&meta.exports, "renamed"));
        assert!(has(&meta.exports, "c"));
        assert!(has(&meta.exports, "d"));
        assert!(has(&meta.imports, "./other"));
        // deduplicated: `a` appears in both export lists
        assert_eq!(meta.exports.iter().filter(|e| *e == "a").count(), 1);
    }

    #[test]
    fn test_python() {
        let source = r#"import os
import numpy as np
from collections import OrderedDict
from .models import User

__all__ = ['load_config', "Loader"]

MAX_RETRIES = 3

# Loads configuration from disk
def load_config(path):
    return path

class Loader:
    async def fetch(self):
        pass
"#;
        let meta = extract(source, Language::Python);
        for sym in ["load_config", "Loader", "fetch", "MAX_RETRIES"] {
            assert!(has(&meta.symbols, sym), "missing symbol {sym}");
        }
        assert_eq!(meta.imports, vec!["os", "numpy", "collections", ".models"]);
        assert_eq!(meta.exports, vec!["load_config", "Loader"]);
        assert_eq!(meta.comments, vec!["Loads configuration from disk"]);
        assert_eq!(meta.file_type, FileType::Source(Language::Python));
    }

    #[test]
    fn test_rust() {
        let source = r#"use std::collections::HashMap;
use serde::{Deserialize, Serialize};
extern crate regex;

/// A cache entry
pub struct Entry { value: String }

pub(crate) enum Kind { A }

pub trait Store {}

const LIMIT: usize = 10;

pub async fn load(path: &str) -> Entry {
    todo!()
}

fn helper() {}
"#;
        let meta = extract(source, Language::Rust);
        for sym in ["Entry", "Kind", "Store", "LIMIT", "load", "helper"] {
            assert!(has(&meta.symbols, sym), "missing symbol {sym}");
        }
        assert_eq!(
            meta.imports,
            vec!["std::collections::HashMap", "serde", "regex"]
        );
        assert_eq!(meta.exports, vec!["Entry", "Store", "load"]);
        assert_eq!(meta.comments, vec!["A cache entry"]);
    }

    #[test]
    fn test_go() {
        let source = "package main\n\nimport (\n\t\"fmt\"\n\tlog \"github.com/sirupsen/logrus\"\n)\n\nimport \"os\"\n\n// Server handles requests\ntype Server struct{}\n\nfunc (s *Server) Start() error { return nil }\n\nfunc helper() {}\n";
        let meta = extract(source, Language::Go);
        for sym in ["Server", "Start", "helper"] {
            assert!(has(&meta.symbols, sym), "missing symbol {sym}");
        }
        for import in ["fmt", "github.com/sirupsen/logrus", "os"] {
            assert!(has(&meta.imports, import), "missing import {import}");
        }
        assert!(has(&meta.exports, "Server"));
        assert!(has(&meta.exports, "Start"));
        assert!(!has(&meta.exports, "helper"));
        assert!(has(&meta.comments, "Server handles requests"));
    }

    #[test]
    fn test_java() {
        let source = r#"package com.example;

import java.util.List;
import static org.junit.Assert.assertEquals;

/* Service layer */
public class UserService {
    private final List<String> names;

    public List<String> findAll() {
        return names;
    }
}
"#;
        let meta = extract(source, Language::Java);
        assert!(has(&meta.symbols, "UserService"));
        assert!(has(&meta.symbols, "findAll"));
        assert!(!has(&meta.symbols, "names"));
        assert_eq!(
            meta.imports,
            vec!["java.util.List", "org.junit.Assert.assertEquals"]
        );
        assert_eq!(meta.exports, vec!["UserService"]);
        assert_eq!(meta.comments, vec!["Service layer"]);
    }

    #[test]
    fn test_c() {
        let source = "#include <stdio.h>\n#include \"config.h\"\n\n// entry point\nstruct point { int x; };\n\nstatic int add(int a, int b) {\n    return a + b;\n}\n";
        let meta = extract(source, Language::C);
        assert!(has(&meta.symbols, "point"));
        assert!(has(&meta.symbols, "add"));
        assert_eq!(meta.imports, vec!["stdio.h", "config.h"]);
        assert!(meta.exports.is_empty());
        assert_eq!(meta.comments, vec!["entry point"]);
    }

    #[test]
    fn test_ruby_and_shell() {
        let ruby = "require 'json'\nrequire_relative \"lib/util\"\n\nmodule Billing\n  class Invoice\n    def total?\n    end\n  end\nend\n";
        let meta = extract(ruby, Language::Ruby);
        assert!(has(&meta.symbols, "Billing"));
        assert!(has(&meta.symbols, "Invoice"));
        assert!(has(&meta.symbols, "total?"));
        assert_eq!(meta.imports, vec!["json", "lib/util"]);

        let shell = "#!/bin/bash\nsource ./env.sh\n# deploy helper\ndeploy() {\n  echo hi\n}\nfunction cleanup {\n  rm -rf tmp\n}\n";
        let meta = extract(shell, Language::Shell);
        assert!(has(&meta.symbols, "deploy"));
        assert!(has(&meta.symbols, "cleanup"));
        assert_eq!(meta.imports, vec!["./env.sh"]);
        assert!(has(&meta.comments, "deploy helper"));
    }

    #[test]
    fn test_unsupported_language_has_no_symbols() {
        let meta = extract("{\"name\": \"x\"}", Language::Json);
        assert!(meta.symbols.is_empty());
        assert!(meta.imports.is_empty());
        assert!(meta.exports.is_empty());
        assert!(meta.comments.is_empty());
    }

    #[test]
    fn test_empty_comments_discarded() {
        let meta = extract("//\n/* */\n//   \nlet x = 1; // real one\n", Language::JavaScript);
        assert_eq!(meta.comments, vec!["real one"]);
    }

    #[test]
    fn test_url_in_string_is_not_a_comment() {
        let meta = extract("const url = \"https://example.com\";\n", Language::TypeScript);
        assert!(meta.comments.is_empty());
    }

    #[test]
    fn test_file_type_test_markers() {
        let detect = |name: &str, content: &str, lang| detect_file_type(Some(name), content, lang);

        assert_eq!(
            detect("app.test.ts", "", Language::TypeScript),
            FileType::Test(Language::TypeScript)
        );
        assert_eq!(
            detect("user_spec.rb", "", Language::Ruby),
            FileType::Test(Language::Ruby)
        );
        assert_eq!(
            detect("test_models.py", "", Language::Python),
            FileType::Test(Language::Python)
        );
        assert_eq!(
            detect("helpers.js", "describe('x', () => { it('works', () => {}) })", Language::JavaScript),
            FileType::Test(Language::JavaScript)
        );
        assert_eq!(
            detect("server.go", "import \"testing\"\nfunc TestStart(t *testing.T) {}", Language::Go),
            FileType::Test(Language::Go)
        );
    }

    #[test]
    fn test_file_type_priority() {
        // test beats react
        assert_eq!(
            detect_file_type(
                Some("Button.test.tsx"),
                "import React from 'react';",
                Language::TypeScript
            ),
            FileType::Test(Language::TypeScript)
        );
        // react only for js/ts
        assert_eq!(
            detect_file_type(Some("hooks.py"), "useState(1)", Language::Python),
            FileType::Source(Language::Python)
        );
        assert_eq!(
            detect_file_type(Some("Counter.jsx"), "const [n] = useState(0);", Language::JavaScript),
            FileType::ReactComponent
        );
        assert_eq!(
            detect_file_type(Some("package.json"), "{}", Language::Json),
            FileType::Config
        );
        assert_eq!(
            detect_file_type(Some("vite.config.ts"), "export default {}", Language::TypeScript),
            FileType::Config
        );
        assert_eq!(
            detect_file_type(Some(".eslintrc.json"), "{}", Language::Json),
            FileType::Config
        );
        assert_eq!(
            detect_file_type(Some("notes.md"), "# Notes", Language::Markdown),
            FileType::Documentation
        );
        assert_eq!(
            detect_file_type(Some("README"), "hello", Language::PlainText),
            FileType::Documentation
        );
        assert_eq!(
            detect_file_type(Some("lib.rs"), "fn main() {}", Language::Rust),
            FileType::Source(Language::Rust)
        );
    }

    #[test]
    fn test_extract_without_name_uses_content_only() {
        let meta = extract("describe('a', () => { test('b', () => {}) })", Language::TypeScript);
        assert_eq!(meta.file_type, FileType::Test(Language::TypeScript));
        let meta = extract("const a = 1;", Language::TypeScript);
        assert_eq!(meta.file_type, FileType::Source(Language::TypeScript));
    }
}
