//! Css command - transform or bundle a plain stylesheet

use super::{bundler_options, emit, open_cache};
use crate::bundler::Bundler;
use crate::cli::args::CssArgs;
use crate::config::Config;
use crate::error::BundleResult;
use crate::style::{DirectStyleBackend, DirectStyleOptions, LightningCssCli};
use std::sync::Arc;

/// Execute the css command
pub async fn execute(args: CssArgs, config: &Config) -> BundleResult<()> {
    let options = DirectStyleOptions {
        minify: args.minify || config.style.minify,
        targets: args.targets.clone().or_else(|| config.style.targets.clone()),
        base_dir: None,
    };
    let transformer = Arc::new(LightningCssCli::new(&config.style.lightningcss_program));

    let backend = DirectStyleBackend::new(options, transformer);
    let bundler = Bundler::new(backend, open_cache(config)?)
        .with_options(bundler_options(config, args.no_cache));
    let bundle = bundler.from_file(&args.input).await?;

    emit(&bundle, args.output.as_deref()).await
}
