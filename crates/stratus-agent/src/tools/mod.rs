//! Tool modules for the Stratus agent.

pub mod base;
pub mod calculator;
pub mod executor;
pub mod registry;
pub mod search;
pub mod weather;

pub use base::{optional_i64, require_string, validate_params, Tool, ToolOutput};
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
