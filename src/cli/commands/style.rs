//! Style command - build a utility-class stylesheet

use super::{bundler_options, current_dir, emit, open_cache};
use crate::bundler::Bundler;
use crate::cli::args::StyleArgs;
use crate::config::Config;
use crate::error::BundleResult;
use crate::style::{
    LightningCssCli, RegistryLoader, ScanSource, TailwindCli, UtilityStyleBackend,
    UtilityStyleOptions,
};
use std::sync::Arc;

/// Execute the style command
pub async fn execute(args: StyleArgs, config: &Config) -> BundleResult<()> {
    let scan_root = match args.scan.clone().or_else(|| config.style.scan_root.clone()) {
        Some(root) => root,
        None => current_dir()?,
    };

    let options = UtilityStyleOptions {
        base_dir: current_dir()?,
        scan: ScanSource::Directory {
            root: scan_root,
            extensions: config.style.scan_extensions.clone(),
        },
        minify: args.minify || config.style.minify,
        targets: args.targets.clone().or_else(|| config.style.targets.clone()),
        ..UtilityStyleOptions::default()
    };

    let backend = UtilityStyleBackend::new(
        options,
        Arc::new(RegistryLoader::new()),
        Arc::new(TailwindCli::new(&config.style.tailwind_program)),
    )
    .with_transformer(Arc::new(LightningCssCli::new(
        &config.style.lightningcss_program,
    )));

    let bundler = Bundler::new(backend, open_cache(config)?)
        .with_options(bundler_options(config, args.no_cache));
    let bundle = bundler.from_file(&args.input).await?;

    emit(&bundle, args.output.as_deref()).await
}
