//! Stylesheet loading and `@import` inlining
//!
//! Resolution rules of the default [`RegistryLoader`]:
//!
//! | Specifier | Resolved to |
//! |-----------|-------------|
//! | `npm:<pkg>/<path>` | `https://cdn.jsdelivr.net/npm/<pkg>/<path>` (fetched) |
//! | `jsr:<pkg>/<path>` | `https://esm.sh/jsr/<pkg>/<path>` (fetched) |
//! | `http(s)://…` | fetched as-is |
//! | `./x.css`, `../x.css` | relative to the importing sheet (disk or URL) |
//! | anything else | `InvalidSpecifier` |

use crate::error::{BundleError, BundleResult};
use crate::net::fetch_text;
use async_trait::async_trait;
use regex_lite::{Captures, Regex};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

const NPM_CDN: &str = "https://cdn.jsdelivr.net/npm/";
const JSR_CDN: &str = "https://esm.sh/jsr/";

/// Location relative imports of a sheet resolve against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetBase {
    /// Directory on disk
    Dir(PathBuf),
    /// URL of the remote sheet itself
    Url(Url),
}

/// Where a specifier points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSheet {
    File(PathBuf),
    Remote(Url),
}

impl ResolvedSheet {
    /// Identity used for cycle detection
    fn id(&self) -> String {
        match self {
            Self::File(path) => std::fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .to_string_lossy()
                .into_owned(),
            Self::Remote(url) => url.to_string(),
        }
    }

    /// Base for the loaded sheet's own relative imports
    fn base(&self) -> SheetBase {
        match self {
            Self::File(path) => SheetBase::Dir(
                path.parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".")),
            ),
            Self::Remote(url) => SheetBase::Url(url.clone()),
        }
    }
}

/// A loaded stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSheet {
    pub content: String,
    pub base: SheetBase,
    pub id: String,
}

/// Pluggable resolver/reader for `@import` targets
#[async_trait]
pub trait StylesheetLoader: Send + Sync {
    /// Load the sheet `specifier` refers to, as seen from `base`
    async fn load(&self, specifier: &str, base: &SheetBase) -> BundleResult<LoadedSheet>;
}

/// Default loader: CDN registries, absolute URLs and relative paths
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryLoader;

impl RegistryLoader {
    /// Create the default loader
    pub fn new() -> Self {
        Self
    }

    /// Resolve a specifier without loading it
    pub fn resolve(specifier: &str, base: &SheetBase) -> BundleResult<ResolvedSheet> {
        let invalid = || BundleError::InvalidSpecifier(specifier.to_string());

        if let Some(url) = registry_url(specifier) {
            return Url::parse(&url)
                .map(ResolvedSheet::Remote)
                .map_err(|_| invalid());
        }

        if specifier.starts_with("https://") || specifier.starts_with("http://") {
            return Url::parse(specifier)
                .map(ResolvedSheet::Remote)
                .map_err(|_| invalid());
        }

        if specifier.starts_with("./") || specifier.starts_with("../") {
            return match base {
                SheetBase::Dir(dir) => Ok(ResolvedSheet::File(dir.join(specifier))),
                SheetBase::Url(url) => url
                    .join(specifier)
                    .map(ResolvedSheet::Remote)
                    .map_err(|_| invalid()),
            };
        }

        Err(invalid())
    }
}

/// Rewrite a registry specifier to its CDN URL
pub fn registry_url(specifier: &str) -> Option<String> {
    if let Some(rest) = specifier.strip_prefix("npm:") {
        Some(format!("{}{}", NPM_CDN, rest.trim_start_matches('/')))
    } else {
        specifier
            .strip_prefix("jsr:")
            .map(|rest| format!("{}{}", JSR_CDN, rest.trim_start_matches('/')))
    }
}

#[async_trait]
impl StylesheetLoader for RegistryLoader {
    async fn load(&self, specifier: &str, base: &SheetBase) -> BundleResult<LoadedSheet> {
        let resolved = Self::resolve(specifier, base)?;
        let content = match &resolved {
            ResolvedSheet::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| BundleError::read(path, e))?,
            ResolvedSheet::Remote(url) => fetch_text(url.as_str()).await?,
        };

        debug!("Loaded stylesheet {} ({} bytes)", specifier, content.len());
        Ok(LoadedSheet {
            content,
            base: resolved.base(),
            id: resolved.id(),
        })
    }
}

fn import_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // 1: url(...) target, 2: quoted target, 3: conditions
        Regex::new(
            r#"@import\s+(?:url\(\s*["']?([^"')\s]+)["']?\s*\)|["']([^"'\n]+)["'])\s*([^;]*);"#,
        )
        .expect("import pattern is valid")
    })
}

/// Split `name(...)` off the front of `conditions`, honoring nested parens
fn take_function<'a>(conditions: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let rest = conditions.strip_prefix(name)?.strip_prefix('(')?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[..i].trim(), rest[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    None
}

/// Wrap inlined content the way its `@import` conditions require.
///
/// Conditions follow `layer`, `supports(...)`, media list order; the
/// media query ends up outermost.
fn wrap_conditions(content: &str, conditions: &str) -> String {
    let mut conditions = conditions.trim();
    let mut layer = None;

    if let Some((name, rest)) = take_function(conditions, "layer") {
        layer = Some(name.to_string());
        conditions = rest;
    } else if conditions == "layer" || conditions.starts_with("layer ") {
        layer = Some(String::new());
        conditions = conditions["layer".len()..].trim();
    }

    let mut supports = None;
    if let Some((test, rest)) = take_function(conditions, "supports") {
        // A bare declaration needs its own parens inside @supports
        supports = Some(if test.contains('(') {
            test.to_string()
        } else {
            format!("({})", test)
        });
        conditions = rest;
    }

    let mut out = content.trim_end().to_string();
    if let Some(name) = layer {
        out = if name.is_empty() {
            format!("@layer {{\n{}\n}}", out)
        } else {
            format!("@layer {} {{\n{}\n}}", name, out)
        };
    }
    if let Some(test) = supports {
        out = format!("@supports {} {{\n{}\n}}", test, out);
    }
    if !conditions.is_empty() {
        out = format!("@media {} {{\n{}\n}}", conditions, out);
    }
    out
}

/// Replace every `@import` in `css` with the imported content, recursively.
///
/// An import that would re-enter a sheet already being inlined is dropped.
pub async fn inline_imports(
    css: &str,
    base: &SheetBase,
    loader: &dyn StylesheetLoader,
) -> BundleResult<String> {
    inline_imports_except(css, base, loader, &[]).await
}

/// Like [`inline_imports`], but imports of the `keep` specifiers are left
/// in place for a downstream compiler to resolve
pub async fn inline_imports_except(
    css: &str,
    base: &SheetBase,
    loader: &dyn StylesheetLoader,
    keep: &[String],
) -> BundleResult<String> {
    let mut stack = Vec::new();
    inline_inner(css.to_string(), base.clone(), loader, keep, &mut stack).await
}

/// Like [`inline_imports_except`] for a sheet read from `path`, so that a
/// cycle leading back into the file itself is cut as well
pub async fn inline_file_imports(
    css: &str,
    path: &Path,
    base: &SheetBase,
    loader: &dyn StylesheetLoader,
    keep: &[String],
) -> BundleResult<String> {
    let mut stack = vec![ResolvedSheet::File(path.to_path_buf()).id()];
    inline_inner(css.to_string(), base.clone(), loader, keep, &mut stack).await
}

fn inline_inner<'a>(
    css: String,
    base: SheetBase,
    loader: &'a dyn StylesheetLoader,
    keep: &'a [String],
    stack: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = BundleResult<String>> + Send + 'a>> {
    Box::pin(async move {
        // Collect first: the captures borrow `css`
        let imports: Vec<(usize, usize, String, String)> = import_pattern()
            .captures_iter(&css)
            .filter_map(|caps: Captures<'_>| {
                let whole = caps.get(0)?;
                Some((
                    whole.start(),
                    whole.end(),
                    caps.get(1).or_else(|| caps.get(2))?.as_str().to_string(),
                    caps.get(3).map_or_else(String::new, |m| m.as_str().to_string()),
                ))
            })
            .collect();

        let mut out = String::with_capacity(css.len());
        let mut cursor = 0;

        for (start, end, specifier, conditions) in imports {
            out.push_str(&css[cursor..start]);
            cursor = end;

            if keep.contains(&specifier) {
                out.push_str(&css[start..end]);
                continue;
            }

            let sheet = loader.load(&specifier, &base).await?;
            if stack.contains(&sheet.id) {
                debug!("Skipping circular import: {}", specifier);
                continue;
            }

            stack.push(sheet.id.clone());
            let inlined = inline_inner(sheet.content, sheet.base, loader, keep, stack).await?;
            stack.pop();

            out.push_str(&wrap_conditions(&inlined, &conditions));
        }

        out.push_str(&css[cursor..]);
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn registry_specifiers_rewrite_to_cdn() {
        assert_eq!(
            registry_url("npm:tailwindcss@4/index.css").as_deref(),
            Some("https://cdn.jsdelivr.net/npm/tailwindcss@4/index.css")
        );
        assert_eq!(
            registry_url("jsr:@std/css/reset.css").as_deref(),
            Some("https://esm.sh/jsr/@std/css/reset.css")
        );
        assert_eq!(registry_url("./local.css"), None);
    }

    #[test]
    fn relative_resolution() {
        let dir = SheetBase::Dir(PathBuf::from("/proj/styles"));
        assert_eq!(
            RegistryLoader::resolve("./a.css", &dir).unwrap(),
            ResolvedSheet::File(PathBuf::from("/proj/styles/./a.css"))
        );

        let remote = SheetBase::Url(Url::parse("https://cdn.jsdelivr.net/npm/tw@4/index.css").unwrap());
        assert_eq!(
            RegistryLoader::resolve("./theme.css", &remote).unwrap(),
            ResolvedSheet::Remote(Url::parse("https://cdn.jsdelivr.net/npm/tw@4/theme.css").unwrap())
        );
    }

    #[test]
    fn unknown_specifier_is_invalid() {
        let base = SheetBase::Dir(PathBuf::from("/"));
        for specifier in ["tailwindcss", "/abs.css", "~pkg/x.css"] {
            assert!(matches!(
                RegistryLoader::resolve(specifier, &base),
                Err(BundleError::InvalidSpecifier(s)) if s == specifier
            ));
        }
    }

    #[test]
    fn layer_and_media_wrapping() {
        assert_eq!(wrap_conditions("a{}", ""), "a{}");
        assert_eq!(wrap_conditions("a{}", "layer(base)"), "@layer base {\na{}\n}");
        assert_eq!(wrap_conditions("a{}", "layer"), "@layer {\na{}\n}");
        assert_eq!(
            wrap_conditions("a{}", "layer(x) screen"),
            "@media screen {\n@layer x {\na{}\n}\n}"
        );
    }

    #[test]
    fn supports_conditions_wrap_in_supports() {
        assert_eq!(
            wrap_conditions("a{}", "supports(display:grid)"),
            "@supports (display:grid) {\na{}\n}"
        );
        assert_eq!(
            wrap_conditions("a{}", "supports(not (display:grid))"),
            "@supports not (display:grid) {\na{}\n}"
        );
        assert_eq!(
            wrap_conditions("a{}", "layer(base) supports(display:grid) print"),
            "@media print {\n@supports (display:grid) {\n@layer base {\na{}\n}\n}\n}"
        );
    }

    #[tokio::test]
    async fn inlines_nested_local_imports() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir(root.join("parts")).unwrap();
        std::fs::write(root.join("parts/a.css"), "@import \"./b.css\";\n.a{color:red}").unwrap();
        std::fs::write(root.join("parts/b.css"), ".b{color:blue}").unwrap();

        let css = "@import './parts/a.css' layer(components);\nbody{margin:0}";
        let out = inline_imports(css, &SheetBase::Dir(root.to_path_buf()), &RegistryLoader)
            .await
            .unwrap();

        assert!(!out.contains("@import"));
        assert!(out.contains("@layer components {"));
        assert!(out.contains(".b{color:blue}"));
        assert!(out.find(".b{").unwrap() < out.find(".a{").unwrap());
        assert!(out.ends_with("body{margin:0}"));
    }

    #[tokio::test]
    async fn circular_imports_terminate() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::write(root.join("a.css"), "@import \"./b.css\";\n.a{}").unwrap();
        std::fs::write(root.join("b.css"), "@import \"./a.css\";\n.b{}").unwrap();

        let out = inline_imports(
            "@import \"./a.css\";",
            &SheetBase::Dir(root.to_path_buf()),
            &RegistryLoader,
        )
        .await
        .unwrap();
        assert_eq!(out.matches(".a{}").count(), 1);
        assert_eq!(out.matches(".b{}").count(), 1);
    }

    #[tokio::test]
    async fn cycle_through_the_entry_file_inlines_it_once() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let entry = root.join("a.css");
        std::fs::write(&entry, "@import \"./b.css\";\n.a{}").unwrap();
        std::fs::write(root.join("b.css"), "@import \"./a.css\";\n.b{}").unwrap();

        let css = std::fs::read_to_string(&entry).unwrap();
        let out = inline_file_imports(
            &css,
            &entry,
            &SheetBase::Dir(root.to_path_buf()),
            &RegistryLoader,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(out.matches(".a{}").count(), 1);
        assert_eq!(out.matches(".b{}").count(), 1);
    }

    #[tokio::test]
    async fn unquoted_url_imports_are_inlined() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("x.css"), ".x{}").unwrap();

        let out = inline_imports(
            "@import url(./x.css) supports(display:grid);\n.y{}",
            &SheetBase::Dir(temp.path().to_path_buf()),
            &RegistryLoader,
        )
        .await
        .unwrap();
        assert_eq!(out, "@supports (display:grid) {\n.x{}\n}\n.y{}");
    }

    #[tokio::test]
    async fn missing_and_invalid_imports_fail() {
        let temp = TempDir::new().unwrap();
        let base = SheetBase::Dir(temp.path().to_path_buf());

        let err = inline_imports("@import \"./nope.css\";", &base, &RegistryLoader)
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::NotFound(_)));

        let err = inline_imports("@import \"tailwindcss\";", &base, &RegistryLoader)
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::InvalidSpecifier(_)));
    }

    #[tokio::test]
    async fn kept_specifiers_stay_in_place() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.css"), ".a{}").unwrap();
        let css = "@import \"tailwindcss\";\n@import \"./a.css\";";

        let out = inline_imports_except(
            css,
            &SheetBase::Dir(temp.path().to_path_buf()),
            &RegistryLoader,
            &["tailwindcss".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(out, "@import \"tailwindcss\";\n.a{}");
    }
}
