//! Comparative evaluation — one query through every profile, rated by a
//! human, appended to a CSV log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use stratus_core::config::Config;
use stratus_core::utils::{expand_home, local_timestamp};
use thiserror::Error;
use tracing::{info, warn};

use crate::dialogue::DialogueLoop;
use crate::profiles::{AgentProfile, ProfileKind};

/// Recorded when a profile produced no usable answer.
pub const NO_RESPONSE: &str = "No valid response generated.";

const HEADER: [&str; 8] = [
    "Timestamp",
    "Query",
    "Basic Response",
    "Basic Rating",
    "Chain of Thought Response",
    "Chain of Thought Rating",
    "ReAct Response",
    "ReAct Rating",
];

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("{0} response has not been rated")]
    Unrated(ProfileKind),

    #[error("no {0} response in this run")]
    MissingProfile(ProfileKind),

    #[error("could not write results: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a 1–5 rating typed by a user.
pub fn parse_rating(input: &str) -> Result<u8, String> {
    match input.trim().parse::<u8>() {
        Ok(n) if (1..=5).contains(&n) => Ok(n),
        Ok(_) => Err("Please enter a number between 1 and 5.".to_string()),
        Err(_) => Err("Invalid input. Please enter a number between 1 and 5.".to_string()),
    }
}

// ─────────────────────────────────────────────
// ComparativeRun
// ─────────────────────────────────────────────

/// One profile's answer and its rating, once given.
#[derive(Clone, Debug, PartialEq)]
pub struct RunEntry {
    pub kind: ProfileKind,
    pub response: String,
    pub rating: Option<u8>,
}

/// The answers of several profiles to the same query.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparativeRun {
    query: String,
    entries: Vec<RunEntry>,
}

impl ComparativeRun {
    /// Ask `query` of each profile, each on its own fresh conversation.
    ///
    /// A profile whose exchange fails or produces no text is recorded with
    /// [`NO_RESPONSE`].
    pub async fn execute(
        dialogue: &DialogueLoop,
        profiles: &[AgentProfile],
        query: &str,
    ) -> Result<Self, EvaluationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EvaluationError::EmptyQuery);
        }

        let mut entries = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let response = match dialogue.ask(profile, query).await {
                Ok((_, outcome)) => outcome.answer_or(NO_RESPONSE),
                Err(e) => {
                    warn!(profile = profile.name(), error = %e, "exchange failed");
                    NO_RESPONSE.to_string()
                }
            };
            info!(profile = profile.name(), len = response.len(), "profile answered");
            entries.push(RunEntry {
                kind: profile.kind(),
                response,
                rating: None,
            });
        }

        Ok(Self {
            query: query.to_string(),
            entries,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Rate the response of `kind`.
    pub fn rate(&mut self, kind: ProfileKind, rating: u8) -> Result<(), EvaluationError> {
        if !(1..=5).contains(&rating) {
            return Err(EvaluationError::RatingOutOfRange(rating));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.kind == kind)
            .ok_or(EvaluationError::MissingProfile(kind))?;
        entry.rating = Some(rating);
        Ok(())
    }

    fn entry(&self, kind: ProfileKind) -> Result<&RunEntry, EvaluationError> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .ok_or(EvaluationError::MissingProfile(kind))
    }

    /// CSV fields for this run, in header order.
    fn row(&self, timestamp: &str) -> Result<Vec<String>, EvaluationError> {
        let mut row = vec![timestamp.to_string(), self.query.clone()];
        for kind in ProfileKind::ALL {
            let entry = self.entry(kind)?;
            let rating = entry.rating.ok_or(EvaluationError::Unrated(kind))?;
            row.push(entry.response.clone());
            row.push(rating.to_string());
        }
        Ok(row)
    }
}

// ─────────────────────────────────────────────
// ResultsLog
// ─────────────────────────────────────────────

/// Append-only CSV file of rated runs.
#[derive(Clone, Debug)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log at the `evaluation.resultsFile` location.
    pub fn from_config(config: &Config) -> Self {
        Self::new(expand_home(&config.evaluation.results_file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `run` stamped with the current local time.
    ///
    /// Writes the header first if the file is new or empty. Every profile
    /// must have been rated.
    pub fn append(&self, run: &ComparativeRun) -> Result<(), EvaluationError> {
        self.append_at(run, &local_timestamp())
    }

    fn append_at(&self, run: &ComparativeRun, timestamp: &str) -> Result<(), EvaluationError> {
        let row = run.row(timestamp)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut out = String::new();
        if needs_header {
            out.push_str(&csv_record(HEADER.iter().copied()));
        }
        out.push_str(&csv_record(row.iter().map(String::as_str)));
        file.write_all(out.as_bytes())?;

        info!(path = %self.path.display(), "evaluation results saved");
        Ok(())
    }
}

/// One CRLF-terminated CSV record.
fn csv_record<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(csv_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

/// Quote a field if it holds a separator, quote, or line break.
fn csv_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::builtin_registry;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use stratus_core::error::GatewayError;
    use stratus_core::types::{LlmResponse, Message, ToolDefinition};
    use stratus_providers::traits::CompletionGateway;

    struct QueueGateway(Mutex<Vec<Result<LlmResponse, GatewayError>>>);

    #[async_trait]
    impl CompletionGateway for QueueGateway {
        async fn complete(
            &self,
            _history: &[Message],
            _tools: Option<&[ToolDefinition]>,
        ) -> Result<LlmResponse, GatewayError> {
            let mut queue = self.0.lock().unwrap();
            if queue.is_empty() {
                return Err(GatewayError::EmptyResponse);
            }
            queue.remove(0)
        }
        fn model(&self) -> &str {
            "queue"
        }
        fn display_name(&self) -> &str {
            "Queue"
        }
    }

    fn profiles() -> Vec<AgentProfile> {
        let registry = builtin_registry(&Config::default()).unwrap();
        ProfileKind::ALL
            .iter()
            .map(|&k| AgentProfile::build(k, &registry).unwrap())
            .collect()
    }

    fn sample_run() -> ComparativeRun {
        ComparativeRun {
            query: "Weather in Paris?".into(),
            entries: vec![
                RunEntry {
                    kind: ProfileKind::Basic,
                    response: "Sunny.".into(),
                    rating: Some(3),
                },
                RunEntry {
                    kind: ProfileKind::ChainOfThought,
                    response: "Step 1, it is \"sunny\".".into(),
                    rating: Some(4),
                },
                RunEntry {
                    kind: ProfileKind::ReAct,
                    response: "Thought: check.\nFinal Answer: sunny".into(),
                    rating: Some(5),
                },
            ],
        }
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(" 4 "), Ok(4));
        assert!(parse_rating("0").is_err());
        assert!(parse_rating("6").is_err());
        assert!(parse_rating("great").unwrap_err().starts_with("Invalid input"));
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("results.csv"));

        log.append_at(&sample_run(), "2024-05-01 12:00:00").unwrap();
        log.append_at(&sample_run(), "2024-05-01 12:05:00").unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("Timestamp,Query").count(), 1);
        assert!(content.starts_with(
            "Timestamp,Query,Basic Response,Basic Rating,Chain of Thought Response,\
             Chain of Thought Rating,ReAct Response,ReAct Rating\r\n"
        ));
        assert!(content.contains(
            "2024-05-01 12:00:00,Weather in Paris?,Sunny.,3,\"Step 1, it is \"\"sunny\"\".\",4,"
        ));
        assert!(content.ends_with(",5\r\n"));
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("nested/deeper/results.csv"));
        log.append(&sample_run()).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_unrated_run_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("results.csv"));
        let mut run = sample_run();
        run.entries[1].rating = None;

        let err = log.append(&run).unwrap_err();
        assert!(matches!(err, EvaluationError::Unrated(ProfileKind::ChainOfThought)));
        assert!(!log.path().exists());
    }

    #[test]
    fn test_rate_validates_range() {
        let mut run = sample_run();
        assert!(matches!(
            run.rate(ProfileKind::Basic, 9),
            Err(EvaluationError::RatingOutOfRange(9))
        ));
        run.rate(ProfileKind::Basic, 1).unwrap();
        assert_eq!(run.entries()[0].rating, Some(1));
    }

    #[tokio::test]
    async fn test_execute_runs_every_profile() {
        let gateway = Arc::new(QueueGateway(Mutex::new(vec![
            Ok(LlmResponse::text("basic answer")),
            Ok(LlmResponse::default()),
            Err(GatewayError::Request("boom".into())),
        ])));
        let dialogue = DialogueLoop::new(gateway);

        let run = ComparativeRun::execute(&dialogue, &profiles(), "  Is it raining?  ")
            .await
            .unwrap();

        assert_eq!(run.query(), "Is it raining?");
        let responses: Vec<&str> = run.entries().iter().map(|e| e.response.as_str()).collect();
        assert_eq!(responses, vec!["basic answer", NO_RESPONSE, NO_RESPONSE]);
        assert!(run.entries().iter().all(|e| e.rating.is_none()));
    }

    #[tokio::test]
    async fn test_execute_rejects_empty_query() {
        let dialogue = DialogueLoop::new(Arc::new(QueueGateway(Mutex::new(vec![]))));
        let err = ComparativeRun::execute(&dialogue, &profiles(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::EmptyQuery));
    }
}
