//! Stratus Agent — tools, agent profiles, and the dialogue loop.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, executor, and built-in tools
//!   (weather, forecast, calculator, simulated search)
//! - **profiles**: Basic / Chain-of-Thought / ReAct prompt + tool pairings
//! - **dialogue**: one-round LLM ↔ tool exchange over a conversation
//! - **evaluation**: run all profiles on one query and log ratings

pub mod dialogue;
pub mod evaluation;
pub mod profiles;
pub mod tools;

pub use dialogue::{DialogueError, DialogueLoop, ExchangeOutcome};
pub use evaluation::{ComparativeRun, EvaluationError, ResultsLog};
pub use profiles::{builtin_registry, AgentProfile, ProfileKind};
pub use tools::{Tool, ToolExecutor, ToolRegistry};
