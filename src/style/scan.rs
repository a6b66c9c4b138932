//! Class-name candidate scanning
//!
//! Utility-first stylesheets only emit rules for class names that appear
//! somewhere in the project. Scanning is deliberately loose: any token
//! that could be a utility class is a candidate, and the compiler ignores
//! the ones it does not recognize.

use crate::error::{BundleError, BundleResult};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Longest token still considered a candidate
const MAX_CANDIDATE_LEN: usize = 128;

/// Directories never scanned
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "dist"];

/// Caller-supplied content to scan instead of a directory tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub content: String,
    pub extension: String,
}

/// Where candidates come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ScanSource {
    /// Walk a source tree, reading files with matching extensions
    Directory {
        root: PathBuf,
        extensions: Vec<String>,
    },
    /// Scan the given content only
    Entries { entries: Vec<ScanEntry> },
}

impl ScanSource {
    /// Scan a directory with the default source extensions
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self::Directory {
            root: root.into(),
            extensions: default_extensions(),
        }
    }
}

/// File extensions scanned by default
pub fn default_extensions() -> Vec<String> {
    ["html", "js", "jsx", "ts", "tsx", "vue", "svelte", "md", "mdx"]
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn candidate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[!@\-\[]?[a-z\[][A-Za-z0-9_\-:/.\[\]#%()!@&*,'+]*$")
            .expect("candidate pattern is valid")
    })
}

/// Extract candidate class names from one piece of content
pub fn extract_candidates(content: &str, out: &mut BTreeSet<String>) {
    let pattern = candidate_pattern();
    let separators = |c: char| c.is_whitespace() || matches!(c, '"' | '`' | '<' | '>' | '{' | '}' | ';' | '=' | '\\');

    for token in content.split(separators) {
        let token = token.trim_end_matches(['.', ':', ',']).trim_start_matches('\'');
        let token = token.trim_end_matches('\'');
        if token.is_empty() || token.len() > MAX_CANDIDATE_LEN || token.contains("://") {
            continue;
        }
        if pattern.is_match(token) {
            out.insert(token.to_string());
        }
    }
}

/// Collect the sorted, de-duplicated candidate set for `source`
pub async fn scan_candidates(source: &ScanSource) -> BundleResult<Vec<String>> {
    match source {
        ScanSource::Entries { entries } => {
            let mut found = BTreeSet::new();
            for entry in entries {
                extract_candidates(&entry.content, &mut found);
            }
            Ok(found.into_iter().collect())
        }
        ScanSource::Directory { root, extensions } => {
            let root = root.clone();
            let extensions = extensions.clone();
            tokio::task::spawn_blocking(move || scan_directory(&root, &extensions))
                .await
                .map_err(|e| BundleError::Internal(format!("Scan task failed: {}", e)))?
        }
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn scan_directory(root: &Path, extensions: &[String]) -> BundleResult<Vec<String>> {
    if !root.is_dir() {
        return Err(BundleError::NotFound(root.to_path_buf()));
    }

    let mut found = BTreeSet::new();
    let mut files = 0usize;

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
    {
        let entry = entry.map_err(|e| BundleError::Io {
            context: format!("scanning {}", root.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if !matches {
            continue;
        }

        let bytes = std::fs::read(entry.path())
            .map_err(|e| BundleError::read(entry.path(), e))?;
        extract_candidates(&String::from_utf8_lossy(&bytes), &mut found);
        files += 1;
    }

    debug!(
        "Scanned {} files under {}: {} candidates",
        files,
        root.display(),
        found.len()
    );
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn extract(content: &str) -> Vec<String> {
        let mut out = BTreeSet::new();
        extract_candidates(content, &mut out);
        out.into_iter().collect()
    }

    #[test]
    fn extracts_class_attribute_tokens() {
        let found = extract(r#"<div class="flex md:grid p-4 hover:bg-red-500">Hello</div>"#);
        for expected in ["flex", "md:grid", "p-4", "hover:bg-red-500"] {
            assert!(found.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!found.contains(&"Hello".to_string()));
    }

    #[test]
    fn keeps_arbitrary_values_and_important() {
        let found = extract("className={`w-[calc(100%-2rem)] !mt-0 -mx-2 bg-[#fff]`}");
        for expected in ["w-[calc(100%-2rem)]", "!mt-0", "-mx-2", "bg-[#fff]"] {
            assert!(found.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn skips_urls() {
        let found = extract("see https://example.com/a-b for details");
        assert!(found.iter().all(|c| !c.contains("example.com")));
    }

    #[tokio::test]
    async fn entries_are_sorted_and_deduplicated() {
        let source = ScanSource::Entries {
            entries: vec![
                ScanEntry {
                    content: "<p class=\"text-sm flex\">".into(),
                    extension: "html".into(),
                },
                ScanEntry {
                    content: "const c = 'flex block';".into(),
                    extension: "ts".into(),
                },
            ],
        };
        let found = scan_candidates(&source).await.unwrap();
        let mut sorted = found.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(found, sorted);
        assert!(found.contains(&"block".to_string()));
        assert_eq!(found.iter().filter(|c| *c == "flex").count(), 1);
    }

    #[tokio::test]
    async fn directory_scan_respects_extensions_and_skips() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("src/page.tsx"), r#"<a className="underline">"#).unwrap();
        std::fs::write(root.join("src/notes.txt"), "txt-only-class").unwrap();
        std::fs::write(root.join("node_modules/pkg/i.js"), "'vendored-class'").unwrap();
        std::fs::write(root.join(".git/x.html"), "<b class=\"git-class\">").unwrap();

        let found = scan_candidates(&ScanSource::directory(root)).await.unwrap();
        assert!(found.contains(&"underline".to_string()));
        assert!(!found.contains(&"txt-only-class".to_string()));
        assert!(!found.contains(&"vendored-class".to_string()));
        assert!(!found.contains(&"git-class".to_string()));
    }

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let err = scan_candidates(&ScanSource::directory("/no/such/tree"))
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::NotFound(_)));
    }
}
