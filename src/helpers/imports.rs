//! Import specifier rewriting
//!
//! A regex heuristic, not a parser. Recognized forms:
//!
//! | Form | Example |
//! |------|---------|
//! | static import / re-export | `import { a } from "x"`, `export * from 'x'` |
//! | side-effect import | `import "x"` |
//! | dynamic import | `import("x")` |
//!
//! Only the specifier text changes; quotes and surrounding code are kept.
//! Strings that are not in one of these positions are left alone.

use regex_lite::Regex;
use std::sync::OnceLock;

fn import_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r#"\bimport\s*\(\s*["']([^"'\n]+)["']\s*\)"#,
            r#"|\bimport\s*["']([^"'\n]+)["']"#,
            r#"|\b(?:import|export)\s[^"'`;]*?\bfrom\s*["']([^"'\n]+)["']"#,
        ))
        .expect("import pattern is valid")
    })
}

/// Rewrite every import specifier in `source` through `rewrite`
pub fn transform_imports(source: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for caps in import_pattern().captures_iter(source) {
        let Some(specifier) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        out.push_str(&source[cursor..specifier.start()]);
        out.push_str(&rewrite(specifier.as_str()));
        cursor = specifier.end();
    }

    out.push_str(&source[cursor..]);
    out
}
