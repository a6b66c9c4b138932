//! In-process bundling library
//!
//! The library itself is supplied by the host through [`LibraryBundler`];
//! this engine only assembles its input/output option objects and picks
//! the first emitted chunk.

use crate::bundler::Bundle;
use crate::error::{BundleError, BundleResult};
use crate::project::merge::deep_merge;
use crate::script::ScriptEngine;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// One emitted output chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub code: String,
    pub map: Option<String>,
}

/// An in-process bundler taking rollup-style option objects
#[async_trait]
pub trait LibraryBundler: Send + Sync {
    /// Stable library identifier
    fn name(&self) -> &'static str;

    /// Bundle with the given input and output options
    async fn bundle(&self, input: Value, output: Value) -> BundleResult<Vec<OutputChunk>>;
}

/// Caller-supplied option objects, merged over the defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedOptions {
    pub input: Value,
    pub output: Value,
}

impl Default for EmbeddedOptions {
    fn default() -> Self {
        Self {
            input: json!({}),
            output: json!({}),
        }
    }
}

/// Script engine delegating to a [`LibraryBundler`]
pub struct EmbeddedEngine<L> {
    library: L,
}

impl<L: LibraryBundler> EmbeddedEngine<L> {
    /// Wrap a bundling library
    pub fn new(library: L) -> Self {
        Self { library }
    }

    /// Input options for `entry`; the entry always wins over caller input
    pub fn input_options(entry: &Path, user: &Value) -> Value {
        let mut input = json!({});
        deep_merge(&mut input, user);
        deep_merge(&mut input, &json!({ "input": entry.to_string_lossy() }));
        input
    }

    /// Output options: ES modules unless the caller says otherwise
    pub fn output_options(user: &Value) -> Value {
        let mut output = json!({ "format": "es" });
        deep_merge(&mut output, user);
        output
    }
}

#[async_trait]
impl<L: LibraryBundler> ScriptEngine for EmbeddedEngine<L> {
    type Options = EmbeddedOptions;

    fn name(&self) -> &'static str {
        self.library.name()
    }

    async fn bundle_entry(
        &self,
        entry: &Path,
        _project_dir: &Path,
        options: &EmbeddedOptions,
    ) -> BundleResult<Bundle> {
        let input = Self::input_options(entry, &options.input);
        let output = Self::output_options(&options.output);

        let chunk = self
            .library
            .bundle(input, output)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BundleError::backend(self.library.name(), "no output chunks emitted"))?;

        Ok(Bundle {
            source_code: chunk.code,
            source_map: chunk.map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Echoes its options back as the chunk code
    #[derive(Default)]
    struct EchoLibrary {
        chunks: usize,
        calls: Mutex<Vec<(Value, Value)>>,
    }

    #[async_trait]
    impl LibraryBundler for EchoLibrary {
        fn name(&self) -> &'static str {
            "rollup"
        }

        async fn bundle(&self, input: Value, output: Value) -> BundleResult<Vec<OutputChunk>> {
            self.calls.lock().unwrap().push((input.clone(), output));
            Ok((0..self.chunks)
                .map(|i| OutputChunk {
                    code: format!("chunk{}:{}", i, input["input"].as_str().unwrap_or("")),
                    map: (i == 0).then(|| "{\"version\":3}".to_string()),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn first_chunk_becomes_the_bundle() {
        let engine = EmbeddedEngine::new(EchoLibrary {
            chunks: 2,
            ..Default::default()
        });
        let options = EmbeddedOptions {
            input: json!({"treeshake": false, "input": "ignored.ts"}),
            output: json!({"sourcemap": true}),
        };

        let bundle = engine
            .bundle_entry(Path::new("/p/entry.ts"), Path::new("/p"), &options)
            .await
            .unwrap();

        assert_eq!(bundle.source_code, "chunk0:/p/entry.ts");
        assert_eq!(bundle.source_map.as_deref(), Some("{\"version\":3}"));

        let calls = engine.library.calls.lock().unwrap();
        let (input, output) = &calls[0];
        assert_eq!(input, &json!({"treeshake": false, "input": "/p/entry.ts"}));
        assert_eq!(output, &json!({"format": "es", "sourcemap": true}));
    }

    #[tokio::test]
    async fn no_chunks_is_a_bundle_error() {
        let engine = EmbeddedEngine::new(EchoLibrary::default());
        let err = engine
            .bundle_entry(Path::new("/p/e.ts"), Path::new("/p"), &EmbeddedOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::Bundle { .. }));
    }
}
