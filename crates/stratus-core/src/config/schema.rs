//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProviderSettings`, `WeatherConfig`, `ToolsConfig`,
//! `EvaluationConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.stratus/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: ProviderSettings,
    pub weather: WeatherConfig,
    pub tools: ToolsConfig,
    pub evaluation: EvaluationConfig,
}

// ─────────────────────────────────────────────
// Completion provider
// ─────────────────────────────────────────────

/// Settings for the OpenAI-compatible completion service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl ProviderSettings {
    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Weather data provider
// ─────────────────────────────────────────────

/// Settings for the weatherapi.com-style data provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "http://api.weatherapi.com/v1".to_string(),
            timeout_secs: 15,
        }
    }
}

impl WeatherConfig {
    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool execution settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Upper bound for a single tool call, in seconds.
    pub timeout_secs: u64,
    /// Run the tool calls of one assistant turn concurrently.
    pub parallel_calls: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            parallel_calls: false,
        }
    }
}

// ─────────────────────────────────────────────
// Evaluation
// ─────────────────────────────────────────────

/// Comparative evaluation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationConfig {
    /// CSV file that ratings are appended to.
    pub results_file: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            results_file: "evaluation_results.csv".to_string(),
        }
    }
}
