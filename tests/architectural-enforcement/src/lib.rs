//! Architectural Enforcement Integration Tests
//!
//! Source scanners shared by the tests in `tests/`. Each test walks the
//! engine's production sources and reports lines that break a rule:
//! - No blocking I/O inside async code
//! - No sleeping in production code
//! - No panicking shortcuts (`unwrap()`, `expect()`) in production code
//!
//! The scanners are line-based. They know just enough Rust to tell which
//! function a line belongs to and whether it is test code.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source roots, relative to the workspace root
pub const PRODUCTION_ROOTS: &[&str] = &["engine/core/src"];

/// Where a line sits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineContext {
    /// Inside a `#[cfg(test)]` module or a test function
    Test,
    /// Inside an `async fn`
    Async,
    /// Inside a plain `fn`
    Sync,
    /// Outside any function (imports, statics, type definitions)
    Item,
}

/// One line of a production source file
#[derive(Debug)]
pub struct SourceLine<'a> {
    /// File the line came from
    pub path: &'a Path,
    /// 1-based line number
    pub number: usize,
    /// Full line text
    pub text: &'a str,
    /// Text before any `//` comment
    pub code: &'a str,
    /// Enclosing context
    pub context: LineContext,
}

impl SourceLine<'_> {
    /// Format a violation for this line
    pub fn violation(&self, kind: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            self.number,
            kind,
            self.text.trim()
        )
    }
}

/// A production source file loaded into memory
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,
    content: String,
}

impl SourceFile {
    /// Lines with their context
    pub fn lines(&self) -> Vec<SourceLine<'_>> {
        let raw: Vec<&str> = self.content.lines().collect();
        let mut in_test_module = false;

        raw.iter()
            .enumerate()
            .map(|(idx, &text)| {
                if text.trim_start().starts_with("#[cfg(test)]") {
                    in_test_module = true;
                }
                let context = if in_test_module {
                    LineContext::Test
                } else {
                    enclosing_context(&raw, idx)
                };
                SourceLine {
                    path: &self.path,
                    number: idx + 1,
                    text,
                    code: text.split("//").next().unwrap_or(text),
                    context,
                }
            })
            .collect()
    }
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Load every `.rs` file under the production roots
///
/// # Panics
///
/// Panics if a production root is missing, so a moved crate cannot make
/// the scans pass vacuously.
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_ROOTS {
        let path = root.join(dir);
        assert!(path.exists(), "production root not found: {}", path.display());

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(entry.path()) {
                files.push(SourceFile {
                    path: entry.path().to_path_buf(),
                    content,
                });
            }
        }
    }

    files
}

/// Run `check` over every production line and collect its findings
pub fn scan(check: impl Fn(&SourceLine<'_>) -> Option<String>) -> Vec<String> {
    production_sources()
        .iter()
        .flat_map(|file| file.lines().iter().filter_map(&check).collect::<Vec<_>>())
        .collect()
}

/// Print violations and fail the test if there are any
///
/// # Panics
///
/// Panics when `violations` is non-empty.
pub fn report(rule: &str, violations: &[String], guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in guidance {
        eprintln!("  {line}");
    }

    panic!(
        "\nFound {} violation(s) of \"{rule}\".\nFix these before merging!",
        violations.len()
    );
}

/// Whether `line` declares a function, and if so whether it is async
///
/// Handles visibility and qualifiers: `pub(crate) async fn`, `const fn`, ...
pub fn fn_declaration(line: &str) -> Option<bool> {
    let mut rest = line.trim_start();
    let mut is_async = false;

    loop {
        if let Some(after) = rest.strip_prefix("pub(") {
            rest = after.split_once(')').map_or("", |(_, r)| r).trim_start();
        } else if let Some(after) = rest.strip_prefix("pub ") {
            rest = after.trim_start();
        } else if let Some(after) = rest.strip_prefix("async ") {
            is_async = true;
            rest = after.trim_start();
        } else if let Some(after) = rest
            .strip_prefix("const ")
            .or_else(|| rest.strip_prefix("unsafe "))
        {
            rest = after.trim_start();
        } else {
            break;
        }
    }

    rest.starts_with("fn ").then_some(is_async)
}

/// Context of the nearest enclosing function declaration above `idx`
fn enclosing_context(lines: &[&str], idx: usize) -> LineContext {
    for i in (0..=idx).rev() {
        let Some(is_async) = fn_declaration(lines[i]) else {
            continue;
        };

        // Attributes directly above the declaration
        let is_test = lines[..i]
            .iter()
            .rev()
            .map(|l| l.trim())
            .take_while(|l| l.starts_with("#[") || l.starts_with("///"))
            .any(|l| l.starts_with("#[test]") || l.starts_with("#[tokio::test"));

        return if is_test {
            LineContext::Test
        } else if is_async {
            LineContext::Async
        } else {
            LineContext::Sync
        };
    }
    LineContext::Item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("sample.rs"),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_fn_declaration() {
        assert_eq!(fn_declaration("fn load() {"), Some(false));
        assert_eq!(fn_declaration("    pub async fn submit(&self) {"), Some(true));
        assert_eq!(fn_declaration("pub(crate) async fn go() {"), Some(true));
        assert_eq!(fn_declaration("pub const fn new() -> Self {"), Some(false));
        assert_eq!(fn_declaration("let f = |x| x;"), None);
        assert_eq!(fn_declaration("// fn commented()"), None);
    }

    #[test]
    fn test_line_contexts() {
        let source = file(
            "use std::sync::Arc;\n\
             pub async fn fetch() {\n\
             \x20   read();\n\
             }\n\
             fn load() {\n\
             \x20   read();\n\
             }\n\
             #[cfg(test)]\n\
             mod tests {\n\
             \x20   fn helper() {}\n\
             }\n",
        );
        let contexts: Vec<_> = source.lines().iter().map(|l| l.context).collect();
        assert_eq!(
            contexts,
            vec![
                LineContext::Item,
                LineContext::Async,
                LineContext::Async,
                LineContext::Async,
                LineContext::Sync,
                LineContext::Sync,
                LineContext::Sync,
                LineContext::Test,
                LineContext::Test,
                LineContext::Test,
                LineContext::Test,
            ]
        );
    }

    #[test]
    fn test_comments_stripped() {
        let source = file("fn f() { x(); // std::fs::read\n}");
        assert_eq!(source.lines()[0].code, "fn f() { x(); ");
    }

    #[test]
    fn test_production_roots_exist() {
        assert!(!production_sources().is_empty());
    }
}
