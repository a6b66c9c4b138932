//! Script command - bundle a script with esbuild

use super::{bundler_options, current_dir, emit, open_cache};
use crate::bundler::Bundler;
use crate::cli::args::ScriptArgs;
use crate::config::Config;
use crate::error::BundleResult;
use crate::project::ConfigLockRegistry;
use crate::script::{ScriptBundler, ScriptOptions, SubprocessEngine, SubprocessOptions};

/// Execute the script command
pub async fn execute(args: ScriptArgs, config: &Config) -> BundleResult<()> {
    let project_dir = match args.project.clone().or_else(|| config.script.project_dir.clone()) {
        Some(dir) => dir,
        None => current_dir()?,
    };

    let project = ScriptOptions {
        config_path: config
            .script
            .config_file
            .as_ref()
            .map(|file| project_dir.join(file)),
        config_overrides: config.script.config_overrides.clone(),
        project_dir,
        ..ScriptOptions::default()
    };
    let engine_options = SubprocessOptions {
        program: config.script.program.clone(),
        args: config.script.args.clone(),
        esbuild_module: config.script.esbuild_module.clone(),
        ..SubprocessOptions::default()
    };

    let backend = ScriptBundler::new(
        SubprocessEngine::new(),
        project,
        engine_options,
        ConfigLockRegistry::global(),
    );
    let bundler = Bundler::new(backend, open_cache(config)?)
        .with_options(bundler_options(config, args.no_cache));

    let bundle = match (&args.input, &args.eval, &args.url) {
        (Some(input), _, _) => bundler.from_file(input).await?,
        (_, Some(source), _) if args.call => bundler.from_function(source).await?,
        (_, Some(source), _) => bundler.from_src(source, None).await?,
        (_, _, Some(url)) => bundler.from_url(url).await?,
        // clap requires one of the three
        (None, None, None) => unreachable!("source group is required"),
    };

    emit(&bundle, args.output.as_deref()).await
}
