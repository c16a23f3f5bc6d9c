//! `stratus status` — show configuration and service status.

use anyhow::Result;
use colored::Colorize;

use stratus_agent::ResultsLog;
use stratus_core::config::{get_config_path, load_config};

use crate::helpers::display_path;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "☁ Stratus Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        display_path(&config_path),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.provider.model);
    println!("  {:<18} {}", "API base:".bold(), config.provider.api_base);
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.provider.temperature).dimmed(),
        config.provider.max_tokens,
        config.provider.timeout_secs,
    );

    println!();
    println!("  {}", "Credentials:".bold());
    println!("    {:<20} {}", "Completion service", key_status(config.provider.is_configured()));
    println!("    {:<20} {}", "Weather provider", key_status(config.weather.is_configured()));

    println!();
    println!(
        "  {:<18} timeout {}s, {}",
        "Tools:".bold(),
        config.tools.timeout_secs,
        if config.tools.parallel_calls {
            "parallel calls"
        } else {
            "sequential calls"
        }
    );
    println!(
        "  {:<18} {}",
        "Results file:".bold(),
        display_path(ResultsLog::from_config(&config).path())
    );
    println!();

    Ok(())
}

fn key_status(configured: bool) -> String {
    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
