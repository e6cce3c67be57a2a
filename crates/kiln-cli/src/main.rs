//! Kiln CLI - background rebuilds for source trees
//!
//! This is the entry point for the `kiln` binary. It provides commands
//! for creating a project config, watching a source folder, and running
//! the configured rebuild by hand.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod rebuild;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(author = "Kiln Contributors")]
#[command(version)]
#[command(about = "Rebuild your project the moment a source file is saved", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default config in .kiln/
    Init {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Watch the configured folder and rebuild on every save
    Watch {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Rebuild command to run instead of the configured one,
        /// split on whitespace (e.g. --command "cargo test")
        #[arg(short, long)]
        command: Option<String>,

        /// File extensions to react to, overriding the config
        #[arg(short, long)]
        ext: Vec<String>,

        /// Watch only the top level of the folder
        #[arg(long)]
        no_recursive: bool,
    },

    /// Run the configured rebuild once and exit
    Rebuild {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Watch {
            path,
            command,
            ext,
            no_recursive,
        } => commands::watch(&path, command.as_deref(), &ext, no_recursive).await,
        Commands::Rebuild { path } => commands::rebuild(&path),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
