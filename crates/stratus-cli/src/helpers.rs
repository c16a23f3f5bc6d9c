//! Shared CLI helpers — profile selection, response printing, banner.

use std::path::Path;

use colored::Colorize;

use stratus_agent::ProfileKind;

/// Parse a profile name, falling back to Basic on anything unrecognized.
pub fn resolve_profile(name: &str) -> ProfileKind {
    match name.parse::<ProfileKind>() {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("{} {e}. Defaulting to Basic agent.", "!".yellow().bold());
            ProfileKind::Basic
        }
    }
}

/// Show `path` with the home directory abbreviated to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs_next::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Print an agent answer to stdout.
pub fn print_response(profile: &str, response: Option<&str>) {
    println!();
    println!("{}", format!("☁ {profile}").cyan().bold());
    match response {
        Some(text) => println!("{text}"),
        None => println!("{}", "(no response)".dimmed()),
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(profile: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "☁ Stratus".cyan().bold(),
        version.dimmed(),
        format!("[{profile}]").dimmed()
    );
    println!(
        "{}",
        "Ask about the weather, or type \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}
