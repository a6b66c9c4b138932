//! Lightning CSS command-line transformer

use crate::bundler::Bundle;
use crate::error::{BundleError, BundleResult};
use crate::process::run_tool;
use crate::style::{StyleTransformer, TransformInput, TransformSettings};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix of stylesheet text written to disk for the transformer
pub const STYLE_TEMP_PREFIX: &str = ".bundlekit-style-";

/// [`StyleTransformer`] running the `lightningcss` CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightningCssCli {
    program: String,
}

impl Default for LightningCssCli {
    fn default() -> Self {
        Self::new("lightningcss")
    }
}

impl LightningCssCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for one run; output goes to stdout
    pub fn cli_args(file: &Path, settings: &TransformSettings) -> Vec<String> {
        let mut args = Vec::new();
        if settings.bundle {
            args.push("--bundle".to_string());
        }
        if settings.minify {
            args.push("--minify".to_string());
        }
        if let Some(targets) = &settings.targets {
            args.push("--targets".to_string());
            args.push(targets.clone());
        }
        args.push(file.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl StyleTransformer for LightningCssCli {
    fn name(&self) -> &'static str {
        "lightningcss"
    }

    async fn transform(
        &self,
        input: TransformInput,
        settings: &TransformSettings,
    ) -> BundleResult<Bundle> {
        match input {
            TransformInput::File(path) => {
                if !path.is_file() {
                    return Err(BundleError::NotFound(path));
                }
                let cwd = parent_dir(&path);
                let args = Self::cli_args(&path, settings);
                let code = run_tool(self.name(), &self.program, &args, &cwd).await?;
                Ok(Bundle::new(code))
            }
            TransformInput::Code { code, base_dir } => {
                // Written next to the caller's sheets so relative urls resolve
                let mut file = tempfile::Builder::new()
                    .prefix(STYLE_TEMP_PREFIX)
                    .suffix(".css")
                    .tempfile_in(&base_dir)
                    .map_err(|e| {
                        BundleError::io(format!("creating stylesheet in {}", base_dir.display()), e)
                    })?;
                file.write_all(code.as_bytes())
                    .and_then(|_| file.flush())
                    .map_err(|e| BundleError::io("writing stylesheet", e))?;

                let args = Self::cli_args(file.path(), settings);
                let code = run_tool(self.name(), &self.program, &args, &base_dir).await?;
                Ok(Bundle::new(code))
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn args_follow_settings() {
        let settings = TransformSettings {
            bundle: true,
            minify: true,
            targets: Some(">= 0.25%".to_string()),
        };
        assert_eq!(
            LightningCssCli::cli_args(Path::new("/s/app.css"), &settings),
            vec!["--bundle", "--minify", "--targets", ">= 0.25%", "/s/app.css"]
        );
        assert_eq!(
            LightningCssCli::cli_args(Path::new("a.css"), &TransformSettings::default()),
            vec!["a.css"]
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = LightningCssCli::default()
            .transform(
                TransformInput::File(PathBuf::from("/no/such/sheet.css")),
                &TransformSettings::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn code_is_passed_through_a_removed_temp_file() {
        let dir = TempDir::new().unwrap();
        // `cat` stands in for the transformer: it echoes the file it is given
        let cli = LightningCssCli::new("cat");

        let bundle = cli
            .transform(
                TransformInput::Code {
                    code: ".a{color:red}".to_string(),
                    base_dir: dir.path().to_path_buf(),
                },
                &TransformSettings::default(),
            )
            .await
            .unwrap();

        assert_eq!(bundle.source_code, ".a{color:red}");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
