//! Renders ranked documents into a single context block for prompts

use std::path::{Path, PathBuf};

use super::retrieval::SearchResult;

/// First line of every rendered context block
pub const CONTEXT_HEADER: &str = "# Relevant code from the workspace";

/// Formats search results; results are emitted in the order given
#[derive(Debug, Clone, Default)]
pub struct ContextFormatter {
    roots: Vec<PathBuf>,
}

impl ContextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show paths relative to these workspace roots where possible
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    pub fn display_path(&self, path: &Path) -> String {
        self.roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .unwrap_or(path)
            .display()
            .to_string()
    }

    pub fn format(&self, results: &[SearchResult]) -> String {
        let mut output = String::new();
        output.push_str(CONTEXT_HEADER);
        output.push('\n');

        for result in results {
            let doc = &result.document;
            output.push('\n');
            output.push_str(&format!("## File: {}\n", self.display_path(&doc.path)));

            let file_type = doc.file_type.as_string();
            if file_type == doc.language.as_str() {
                output.push_str(&format!("Language: {}\n", doc.language));
            } else {
                output.push_str(&format!("Language: {} ({})\n", doc.language, file_type));
            }

            push_list(&mut output, "Symbols", &doc.symbols);
            push_list(&mut output, "Imports", &doc.imports);
            push_list(&mut output, "Exports", &doc.exports);

            let fence = fence_for(&doc.content);
            output.push_str(&format!("{}{}\n", fence, doc.language));
            output.push_str(&doc.content);
            if !doc.content.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&fence);
            output.push('\n');
        }

        output
    }
}

/// Backtick fence longer than any backtick run in `content`, at least three
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn push_list(output: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        output.push_str(&format!("{}: {}\n", label, items.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::document::IndexedDocument;
    use chrono::Utc;
    use std::sync::Arc;

    fn result(path: &str, content: &str, score: f64) -> SearchResult {
        SearchResult {
            document: Arc::new(IndexedDocument::build(
                PathBuf::from(path),
                content.to_string(),
                Utc::now(),
            )),
            relevance_score: score,
        }
    }

    #[test]
    fn test_full_record_layout() {
        let formatter = ContextFormatter::new().with_roots(vec![PathBuf::from("/ws")]);
        let out = formatter.format(&[result(
            "/ws/src/app.test.ts",
            "import { foo } from './foo';\nexport function bar() {}",
            1.0,
        )]);

        let expected = "# Relevant code from the workspace\n\
\n\
## File: src/app.test.ts\n\
Language: typescript (typescript-test)\n\
Symbols: bar\n\
Imports: ./foo\n\
Exports: bar\n\
```typescript\n\
import { foo } from './foo';\n\
export function bar() {}\n\
```\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_lists_and_same_type_are_omitted() {
        let out = ContextFormatter::new().format(&[result("/x/notes.txt", "plain words\n", 1.0)]);

        assert!(out.contains("## File: /x/notes.txt\n"));
        assert!(out.contains("Language: plaintext\n"));
        assert!(!out.contains("Symbols:"));
        assert!(!out.contains("Imports:"));
        assert!(!out.contains("Exports:"));
        assert!(out.ends_with("```plaintext\nplain words\n```\n"));
    }

    #[test]
    fn test_keeps_given_order() {
        let out = ContextFormatter::new().format(&[
            result("/ws/low.rs", "fn low() {}", 0.1),
            result("/ws/high.rs", "fn high() {}", 9.0),
        ]);
        let low = out.find("low.rs").unwrap();
        let high = out.find("high.rs").unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_fence_outgrows_backticks_in_content() {
        let content = "# Usage\n\n```rust\nlet x = 1;\n```\n";
        let out = ContextFormatter::new().format(&[result("/ws/README.md", content, 1.0)]);

        assert!(out.contains("````markdown\n# Usage\n"));
        assert!(out.ends_with("let x = 1;\n```\n````\n"));
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("a ````` b"), "``````");
    }

    #[test]
    fn test_display_path_outside_roots() {
        let formatter = ContextFormatter::new().with_roots(vec![PathBuf::from("/ws")]);
        assert_eq!(formatter.display_path(Path::new("/ws/a/b.rs")), "a/b.rs");
        assert_eq!(formatter.display_path(Path::new("/other/c.rs")), "/other/c.rs");
    }
}
