//! Config loader — reads `~/.stratus/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.stratus/config.json`
//! 3. Plain credential variables (`API_KEY`, `BASE_URL`, `LLM_MODEL`,
//!    `WEATHER_API_KEY`, with `OPTOGPT_*` fallbacks)
//! 4. Environment variables `STRATUS_<SECTION>__<FIELD>`

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// First non-empty value among the given env vars.
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.is_empty())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `API_KEY` / `OPTOGPT_API_KEY` → `provider.api_key`
/// - `BASE_URL` → `provider.api_base`
/// - `LLM_MODEL` / `OPTOGPT_MODEL` → `provider.model`
/// - `WEATHER_API_KEY` → `weather.api_key`
/// - `STRATUS_PROVIDER__API_KEY`, `__API_BASE`, `__MODEL`, `__MAX_TOKENS`,
///   `__TEMPERATURE`, `__TIMEOUT_SECS`
/// - `STRATUS_WEATHER__API_KEY`, `__API_BASE`, `__TIMEOUT_SECS`
/// - `STRATUS_TOOLS__TIMEOUT_SECS`, `__PARALLEL_CALLS`
/// - `STRATUS_EVALUATION__RESULTS_FILE`
fn apply_env_overrides(mut config: Config) -> Config {
    // Plain credential variables
    if let Some(val) = first_env(&["API_KEY", "OPTOGPT_API_KEY"]) {
        config.provider.api_key = val;
    }
    if let Some(val) = first_env(&["BASE_URL"]) {
        config.provider.api_base = val;
    }
    if let Some(val) = first_env(&["LLM_MODEL", "OPTOGPT_MODEL"]) {
        config.provider.model = val;
    }
    if let Some(val) = first_env(&["WEATHER_API_KEY"]) {
        config.weather.api_key = val;
    }

    // Provider
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__MODEL") {
        config.provider.model = val;
    }
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.provider.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.provider.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("STRATUS_PROVIDER__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.provider.timeout_secs = n;
        }
    }

    // Weather
    if let Ok(val) = std::env::var("STRATUS_WEATHER__API_KEY") {
        config.weather.api_key = val;
    }
    if let Ok(val) = std::env::var("STRATUS_WEATHER__API_BASE") {
        config.weather.api_base = val;
    }
    if let Ok(val) = std::env::var("STRATUS_WEATHER__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.weather.timeout_secs = n;
        }
    }

    // Tools
    if let Ok(val) = std::env::var("STRATUS_TOOLS__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.tools.timeout_secs = n;
        }
    }
    if let Ok(val) = std::env::var("STRATUS_TOOLS__PARALLEL_CALLS") {
        config.tools.parallel_calls = val == "true" || val == "1";
    }

    // Evaluation
    if let Ok(val) = std::env::var("STRATUS_EVALUATION__RESULTS_FILE") {
        config.evaluation.results_file = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.provider.max_tokens, 1024);
        assert_eq!(config.weather.timeout_secs, 15);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "provider": {
                "model": "gpt-4o",
                "maxTokens": 2048
            },
            "weather": { "apiKey": "wk-123" }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, 2048);
        assert_eq!(config.provider.temperature, 0.7);
        assert_eq!(config.weather.api_key, "wk-123");
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.provider.max_tokens, 1024);
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path());
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.provider.model = "llama3".to_string();
        config.weather.api_key = "wk-test".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.provider.model, "llama3");
        assert_eq!(reloaded.weather.api_key, "wk-test");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["provider"].get("maxTokens").is_some());
        assert!(raw["provider"].get("max_tokens").is_none());
        assert!(raw["tools"].get("parallelCalls").is_some());
    }

    // Env-var tests share process state, so they live in one test.
    #[test]
    fn test_env_overrides() {
        std::env::set_var("STRATUS_PROVIDER__MODEL", "env-model");
        std::env::set_var("STRATUS_TOOLS__PARALLEL_CALLS", "1");
        std::env::set_var("STRATUS_WEATHER__TIMEOUT_SECS", "5");
        std::env::set_var("WEATHER_API_KEY", "wk-env");

        let config = apply_env_overrides(Config::default());
        assert_eq!(config.provider.model, "env-model");
        assert!(config.tools.parallel_calls);
        assert_eq!(config.weather.timeout_secs, 5);
        assert_eq!(config.weather.api_key, "wk-env");

        std::env::remove_var("STRATUS_PROVIDER__MODEL");
        std::env::remove_var("STRATUS_TOOLS__PARALLEL_CALLS");
        std::env::remove_var("STRATUS_WEATHER__TIMEOUT_SECS");
        std::env::remove_var("WEATHER_API_KEY");
    }
}
