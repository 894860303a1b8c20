use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImportRef {
    Literal(String),
    Dynamic,
}

/// Rule scripts may be authored with a `package ...` header for editor
/// tooling. They never run inside that namespace, so the line is dropped.
pub(crate) fn strip_package_header(source: &str) -> String {
    package_header_regex().replace_all(source, "").into_owned()
}

pub(crate) fn strip_comments(source: &str) -> String {
    let without_line_comments = line_comment_regex().replace_all(source, " ");
    block_comment_regex()
        .replace_all(&without_line_comments, " ")
        .into_owned()
}

/// Every `import` statement in the source, skipping the word when it only
/// appears inside a string literal.
pub(crate) fn scan_imports(source: &str) -> Vec<ImportRef> {
    let stripped = strip_comments(source);
    let mut imports = Vec::new();
    for captures in import_or_string_regex().captures_iter(&stripped) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if !whole.as_str().starts_with("import") {
            continue;
        }
        match captures.get(1) {
            Some(path) => imports.push(ImportRef::Literal(path.as_str().to_string())),
            None => imports.push(ImportRef::Dynamic),
        }
    }
    imports
}

fn package_header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?m)^[ \t]*package[ \t]+.*$").expect("package header regex"))
}

fn line_comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"//[^\n]*").expect("line comment regex"))
}

fn block_comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"))
}

fn import_or_string_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'|`[^`]*`|\bimport\b\s*(?:"([^"\\]*)")?"#,
        )
        .expect("import regex")
    })
}

#[cfg(test)]
mod sanitize_tests {
    use super::*;

    #[test]
    fn package_header_is_removed_wherever_it_leads_a_line() {
        let source = "package rules.premiums;\nlet rate = 3;\nrate";
        let stripped = strip_package_header(source);
        assert!(!stripped.contains("package"));
        assert!(stripped.contains("let rate = 3;"));

        let indented = strip_package_header("  package a.b\nsumInsured");
        assert_eq!(indented.trim(), "sumInsured");

        let untouched = strip_package_header("let packaged = 1; packaged");
        assert_eq!(untouched, "let packaged = 1; packaged");
    }

    #[test]
    fn comments_are_blanked() {
        let stripped = strip_comments("a // import \"fs\"\n/* import \"net\" */ b");
        assert!(!stripped.contains("fs"));
        assert!(!stripped.contains("net"));
        assert!(stripped.contains('a'));
        assert!(stripped.contains('b'));
    }

    #[test]
    fn imports_are_found_outside_strings_and_comments() {
        let imports = scan_imports(
            r#"
import "math" as m;
// import "fs" as f;
let label = "import \"net\"";
import path_var as p;
m::floor(1.5)
"#,
        );
        assert_eq!(
            imports,
            vec![ImportRef::Literal("math".to_string()), ImportRef::Dynamic]
        );
    }

    #[test]
    fn identifiers_containing_import_are_not_imports() {
        assert!(scan_imports("let important = 1; let reimport = 2; important").is_empty());
    }
}
