//! `stratus compare` — run one query through every profile, collect a 1–5
//! rating for each answer, and append the results to the CSV log.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use colored::Colorize;

use stratus_agent::evaluation::parse_rating;
use stratus_agent::{AgentProfile, ComparativeRun, DialogueLoop, ProfileKind, ResultsLog};

use crate::helpers;

/// Run the comparative evaluation against stdin/stdout.
pub async fn run(
    dialogue: &DialogueLoop,
    profiles: &[AgentProfile],
    query: Option<String>,
    log: &ResultsLog,
) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let query = match query {
        Some(q) => q,
        None => read_line(&mut input, &mut output, "\nEnter your query: ")?.unwrap_or_default(),
    };
    if query.trim().is_empty() {
        println!("Query cannot be empty.");
        return Ok(());
    }

    helpers::print_thinking();
    let result = ComparativeRun::execute(dialogue, profiles, &query).await;
    helpers::clear_thinking();
    let mut run = result?;

    println!("\n{}\n", "--- Comparative Evaluation ---".bold());
    for entry in run.entries() {
        println!("{}\n{}\n", format!("{} Response:", entry.kind).cyan().bold(), entry.response);
    }

    let kinds: Vec<ProfileKind> = run.entries().iter().map(|e| e.kind).collect();
    for kind in kinds {
        let rating = read_rating(&mut input, &mut output, kind)?;
        run.rate(kind, rating)?;
    }

    log.append(&run)?;
    println!(
        "\nResults saved successfully to {}.",
        helpers::display_path(log.path())
    );
    Ok(())
}

/// Prompt until a valid 1–5 rating for `kind` is entered.
fn read_rating<R: BufRead, W: Write>(input: &mut R, output: &mut W, kind: ProfileKind) -> Result<u8> {
    let prompt = format!("Rate the {kind} response (1-5): ");
    loop {
        let Some(line) = read_line(input, output, &prompt)? else {
            bail!("input closed before a rating for {kind} was given");
        };
        match parse_rating(&line) {
            Ok(rating) => return Ok(rating),
            Err(msg) => writeln!(output, "{msg}")?,
        }
    }
}

/// Print `prompt` and read one line; `None` at end of input.
fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
