//! Direct stylesheet transform/bundle backend

use crate::bundler::{Backend, Bundle};
use crate::error::BundleResult;
use crate::style::{StyleTransformer, TransformInput, TransformSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options of the direct backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectStyleOptions {
    pub minify: bool,
    /// Browserslist query
    pub targets: Option<String>,
    /// Directory inline stylesheets are resolved from
    pub base_dir: Option<PathBuf>,
}

/// Sends stylesheets straight to a [`StyleTransformer`].
///
/// A stylesheet on disk is bundled with its whole import chain; inline text
/// is transformed on its own.
pub struct DirectStyleBackend {
    options: DirectStyleOptions,
    transformer: Arc<dyn StyleTransformer>,
}

impl DirectStyleBackend {
    pub fn new(options: DirectStyleOptions, transformer: Arc<dyn StyleTransformer>) -> Self {
        Self {
            options,
            transformer,
        }
    }

    fn settings(&self, bundle: bool) -> TransformSettings {
        TransformSettings {
            bundle,
            minify: self.options.minify,
            targets: self.options.targets.clone(),
        }
    }
}

#[async_trait]
impl Backend for DirectStyleBackend {
    type Options = DirectStyleOptions;

    fn name(&self) -> &'static str {
        "direct-css"
    }

    fn options(&self) -> &DirectStyleOptions {
        &self.options
    }

    async fn produce(
        &self,
        source: &str,
        path: Option<&Path>,
        _extra: Option<&Value>,
    ) -> BundleResult<Bundle> {
        match path {
            Some(path) => {
                self.transformer
                    .transform(TransformInput::File(path.to_path_buf()), &self.settings(true))
                    .await
            }
            None => {
                let base_dir = self
                    .options
                    .base_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."));
                let input = TransformInput::Code {
                    code: source.to_string(),
                    base_dir,
                };
                self.transformer.transform(input, &self.settings(false)).await
            }
        }
    }
}
