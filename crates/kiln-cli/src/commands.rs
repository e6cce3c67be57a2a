//! CLI command implementations.

use colored::Colorize;
use kiln_core::{DebouncedTrigger, MainContext, RebuildRunner};
use kiln_watcher::{FileFilter, WatchController, WatchTarget};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::rebuild::CommandRunner;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config for a project.
pub fn init(path: &Path) -> Result<()> {
    if Config::path_in(path).exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let written = Config::default().save(path)?;

    println!("{} Wrote {}", "✓".green(), written.display());
    println!(
        "  Run {} to start rebuilding on save",
        "kiln watch".cyan()
    );
    Ok(())
}

/// Watch the configured folder and rebuild on every save, until Ctrl-C.
pub async fn watch(
    path: &Path,
    command: Option<&str>,
    ext: &[String],
    no_recursive: bool,
) -> Result<()> {
    let mut config = Config::load(path)?;
    if let Some(command) = command {
        config.rebuild = command.split_whitespace().map(str::to_string).collect();
    }
    if !ext.is_empty() {
        config.extensions = ext.to_vec();
    }
    if no_recursive {
        config.recursive = false;
    }

    let runner = Arc::new(CommandRunner::new(&config.rebuild)?);
    let ctx = MainContext::spawn();
    let trigger = DebouncedTrigger::new(ctx, runner.clone());

    let root = config.resolved_root(path);
    let mut target = WatchTarget::new(&root, FileFilter::new(config.extensions.clone()));
    if !config.recursive {
        target = target.non_recursive();
    }

    let mut controller = WatchController::new(trigger.clone());
    controller.initialize(target)?;

    println!(
        "{} Watching {} ({})",
        "✓".green(),
        root.display(),
        runner.describe().cyan()
    );
    println!("  Press {} to stop", "Ctrl-C".cyan());

    // First build up front, through the same serialized path saves take.
    trigger.notify();

    tokio::signal::ctrl_c().await?;

    controller.destroy();
    println!("\n{} Stopped watching", "✓".green());
    Ok(())
}

/// Run the configured rebuild once.
pub fn rebuild(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let runner = CommandRunner::new(&config.rebuild)?;
    runner.rebuild()?;
    println!("{} Rebuild complete", "✓".green());
    Ok(())
}
