mod commands;
mod config;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Bake visual-edit overrides back into project sources
#[derive(Parser, Debug)]
#[command(name = "retouch-patch")]
#[command(author, version, about, long_about = None)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RETOUCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| commands::patch(&cwd));

    match result {
        Ok(summary) => {
            println!();
            println!(
                "✨ {} {} ({} templates patched)",
                "Wrote".green().bold(),
                summary.archive.display(),
                summary.patched.len()
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "Patch run failed");
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), err);
            eprintln!();
            std::process::exit(1);
        }
    }
}
