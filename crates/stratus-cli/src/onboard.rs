//! `stratus onboard` — write a default configuration file.

use anyhow::Result;
use colored::Colorize;

use stratus_core::config::{get_config_path, save_config, Config};
use stratus_core::utils::get_data_path;

use crate::helpers::display_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "☁ Stratus — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            display_path(&config_path)
        );
    } else {
        save_config(&Config::default(), Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            display_path(&config_path)
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)?;
    println!("  {} history dir at {}", "✓".green(), display_path(&history_dir));

    println!();
    println!(
        "{}",
        "  Add your API keys to the config (or set API_KEY and WEATHER_API_KEY),".green()
    );
    println!("{}", "  then run `stratus chat` to start.".green());
    println!();

    Ok(())
}
