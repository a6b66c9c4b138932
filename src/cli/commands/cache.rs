//! Cache command - manage the result cache

use super::open_cache;
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::Config;
use crate::error::BundleResult;
use console::style;
use std::io::{self, Write};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> BundleResult<()> {
    let cache = open_cache(config)?;

    match args.action {
        CacheAction::Path => {
            println!("{}", cache.path().display());
            Ok(())
        }
        CacheAction::Clear { yes } => {
            let count = cache.entry_count().await?;
            if count == 0 {
                println!("No cached bundles to clear.");
                return Ok(());
            }

            println!(
                "This will remove {} cached bundle(s) from {}",
                count,
                cache.path().display()
            );

            if !yes {
                print!("Are you sure? [y/N] ");
                let _ = io::stdout().flush();

                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_err() {
                    println!("Failed to read input, aborting.");
                    return Ok(());
                }

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let removed = cache.clear().await?;
            println!("{} cleared {} bundle(s)", style("✓").green(), removed);
            Ok(())
        }
    }
}
