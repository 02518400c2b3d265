//! Show the effective configuration.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

pub async fn execute(config: &Config) -> Result<()> {
    let path = Config::config_path();
    let source = if path.exists() { "loaded" } else { "not found, using defaults" };

    println!("{} {} ({})", "Config:".bold(), path.display(), source);
    println!("{} {}", "Store:".bold(), config.store_path().display());
    println!("{} {}", "Export:".bold(), config.export_dir().display());
    match config.sync.remote_url() {
        Some(url) => println!("{} {}", "Remote:".bold(), url),
        None => println!("{} {}", "Remote:".bold(), "not configured".dimmed()),
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
