//! Agent profiles — a system prompt paired with a scoped set of tools.
//!
//! Three strategies are available, each a strict superset of the previous
//! one in terms of tools:
//!
//! | Profile          | Tools                                         |
//! |------------------|-----------------------------------------------|
//! | Basic            | current weather, forecast                     |
//! | Chain of Thought | + calculator                                  |
//! | ReAct            | + web search                                  |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use stratus_core::config::Config;
use stratus_core::error::ToolError;
use stratus_core::types::ToolDefinition;

use crate::tools::calculator::CalculatorTool;
use crate::tools::registry::ToolRegistry;
use crate::tools::search::SimulatedSearchTool;
use crate::tools::weather::{CurrentWeatherTool, ForecastTool, WeatherClient};

const BASIC_PROMPT: &str = "You are a helpful weather assistant.";

const COT_PROMPT: &str = "\
You are a helpful assistant that can answer questions about weather and perform calculations.

When responding to complex questions, please follow these steps:
1. Think step-by-step about what information you need
2. Break down the problem into smaller parts
3. Use the appropriate tools to gather information
4. Explain your reasoning clearly
5. Provide a clear final answer
For example, if someone asks about temperature conversions or comparisons between cities, first get the weather data, then use the calculator if needed, showing your work.
";

const REACT_PROMPT: &str = "\
You are a helpful weather and information assistant that uses the ReAct (Reasoning and Acting) approach to solve problems.

When responding to questions, follow this pattern:

1. Thought: Think about what you need to know and what steps to take
2. Action: Use a tool to gather information (weather data, search, calculator)
3. Observation: Review what you learned from the tool
4. ... (repeat the Thought, Action, Observation steps as needed)
5. Final Answer: Provide your response based on all observations

For example:
User: What's the temperature difference between New York and London today?
Thought: I need to find the current temperatures in both New York and London, then calculate the difference.
Action: [Use get_current_weather for New York]
Observation: [Results from weather tool]
Thought: Now I need London's temperature.
Action: [Use get_current_weather for London]
Observation: [Results from weather tool]
Thought: Now I can calculate the difference.
Action: [Use calculator to subtract]
Observation: [Result of calculation]
Final Answer: The temperature difference between New York and London today is X degrees.
Always make your reasoning explicit and show your work.
";

const WEATHER_TOOLS: &[&str] = &["get_current_weather", "get_weather_forecast"];
const COT_TOOLS: &[&str] = &["get_current_weather", "get_weather_forecast", "calculator"];
const REACT_TOOLS: &[&str] = &[
    "get_current_weather",
    "get_weather_forecast",
    "calculator",
    "web_search",
];

// ─────────────────────────────────────────────
// ProfileKind
// ─────────────────────────────────────────────

/// Which prompting strategy an agent uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Basic,
    ChainOfThought,
    ReAct,
}

impl ProfileKind {
    /// Every profile, in evaluation order.
    pub const ALL: [ProfileKind; 3] = [
        ProfileKind::Basic,
        ProfileKind::ChainOfThought,
        ProfileKind::ReAct,
    ];

    /// Human-readable name, also used as the CSV column prefix.
    pub fn display_name(self) -> &'static str {
        match self {
            ProfileKind::Basic => "Basic",
            ProfileKind::ChainOfThought => "Chain of Thought",
            ProfileKind::ReAct => "ReAct",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            ProfileKind::Basic => BASIC_PROMPT,
            ProfileKind::ChainOfThought => COT_PROMPT,
            ProfileKind::ReAct => REACT_PROMPT,
        }
    }

    /// Names of the tools this profile may call.
    pub fn tool_names(self) -> &'static [&'static str] {
        match self {
            ProfileKind::Basic => WEATHER_TOOLS,
            ProfileKind::ChainOfThought => COT_TOOLS,
            ProfileKind::ReAct => REACT_TOOLS,
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "1" => Ok(ProfileKind::Basic),
            "cot" | "chain-of-thought" | "2" => Ok(ProfileKind::ChainOfThought),
            "react" | "3" => Ok(ProfileKind::ReAct),
            other => Err(format!("unknown profile '{other}' (expected basic, cot or react)")),
        }
    }
}

// ─────────────────────────────────────────────
// AgentProfile
// ─────────────────────────────────────────────

/// A ready-to-use profile: prompt, scoped registry and the declarations
/// advertised to the model.
#[derive(Clone)]
pub struct AgentProfile {
    kind: ProfileKind,
    tools: Arc<ToolRegistry>,
    definitions: Vec<ToolDefinition>,
}

impl AgentProfile {
    /// Scope `registry` down to the tools `kind` allows.
    ///
    /// Fails if `registry` is missing one of them.
    pub fn build(kind: ProfileKind, registry: &ToolRegistry) -> Result<Self, ToolError> {
        let scoped = registry.subset(kind.tool_names())?;
        let definitions = scoped.definitions();
        Ok(Self {
            kind,
            tools: Arc::new(scoped),
            definitions,
        })
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn system_prompt(&self) -> &'static str {
        self.kind.system_prompt()
    }

    /// Registry holding only this profile's tools.
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Declarations sent with the first completion call of an exchange.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }
}

/// Registry with every built-in tool, weather tools sharing one client.
pub fn builtin_registry(config: &Config) -> Result<ToolRegistry, ToolError> {
    let weather = Arc::new(WeatherClient::new(&config.weather));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CurrentWeatherTool::new(weather.clone())))?;
    registry.register(Arc::new(ForecastTool::new(weather)))?;
    registry.register(Arc::new(CalculatorTool))?;
    registry.register(Arc::new(SimulatedSearchTool))?;
    Ok(registry)
}
