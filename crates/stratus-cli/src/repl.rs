//! Interactive chat REPL.
//!
//! Uses `rustyline` for line editing with persistent input history. The
//! conversation itself lives in memory and ends with the session.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use stratus_agent::{AgentProfile, DialogueLoop};
use stratus_core::types::Conversation;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "bye", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop.
pub async fn run(dialogue: &DialogueLoop, profile: &AgentProfile) -> Result<()> {
    helpers::print_banner(profile.name());

    let mut editor = create_editor()?;
    let mut conversation = Conversation::new(profile.system_prompt());

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(profile = profile.name(), turns = conversation.non_system_len(), "processing input");
        helpers::print_thinking();

        let result = dialogue.send(&mut conversation, profile, trimmed).await;
        helpers::clear_thinking();
        match result {
            Ok(outcome) => {
                if outcome.tool_calls > 0 {
                    println!(
                        "{}",
                        format!("({} tool call(s))", outcome.tool_calls).dimmed()
                    );
                }
                helpers::print_response(profile.name(), outcome.answer.as_deref());
            }
            Err(e) => eprintln!("\n{} {e}\n", "Error:".red().bold()),
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// `~/.stratus/history/cli_history`.
pub fn history_path() -> std::path::PathBuf {
    stratus_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("Bye"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("weather in paris"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".stratus"));
        assert!(path.ends_with("history/cli_history"));
    }
}
