//! Weather tools — current conditions and multi-day forecast.
//!
//! Both tools share one [`WeatherClient`] that talks to a weatherapi.com-style
//! service (`/current.json`, `/forecast.json`). A provider-reported error
//! (unknown location, bad key) is returned as a handler error, which the
//! executor hands back to the model as text.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use stratus_core::config::schema::WeatherConfig;
use tracing::debug;

use super::base::{optional_i64, require_string, Tool, ToolOutput};

/// Forecast length when the model does not ask for one.
const DEFAULT_FORECAST_DAYS: i64 = 3;
const MIN_FORECAST_DAYS: i64 = 1;
const MAX_FORECAST_DAYS: i64 = 10;

const LOCATION_DESCRIPTION: &str =
    "The city and state, e.g., San Francisco, CA or country e.g., France";

// ─────────────────────────────────────────────
// Provider response shapes
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: Number,
    temp_f: Number,
    condition: Condition,
    humidity: Number,
    wind_kph: Number,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: Number,
    mintemp_c: Number,
    condition: Condition,
    daily_chance_of_rain: Number,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: Location,
    forecast: Forecast,
}

// ─────────────────────────────────────────────
// Tool output shapes
// ─────────────────────────────────────────────

/// Snapshot returned by `get_current_weather`.
#[derive(Debug, Serialize)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature_c: Number,
    pub temperature_f: Number,
    pub condition: String,
    pub humidity: Number,
    pub wind_kph: Number,
}

/// One day of `get_weather_forecast` output.
#[derive(Debug, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub max_temp_c: Number,
    pub min_temp_c: Number,
    pub condition: String,
    pub chance_of_rain: Number,
}

// ─────────────────────────────────────────────
// WeatherClient
// ─────────────────────────────────────────────

/// HTTP client for the weather data provider.
pub struct WeatherClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl WeatherClient {
    /// Build a client from the `weather` config section.
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// GET `{api_base}/{endpoint}` and return the body, or the provider's
    /// error message as an `Err`.
    async fn fetch(&self, endpoint: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        if self.api_key.is_empty() {
            anyhow::bail!("No weather API key configured (set WEATHER_API_KEY)");
        }

        let url = format!("{}/{}", self.api_base, endpoint);
        debug!(url = %url, "fetching weather data");

        let resp = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("aqi", "no")])
            .query(query)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Weather request failed: {e}"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse weather response: {e}"))?;

        if let Some(err) = body.get("error") {
            let err: ProviderError = serde_json::from_value(err.clone())
                .unwrap_or_else(|_| ProviderError { message: err.to_string() });
            anyhow::bail!("{}", err.message);
        }
        if !status.is_success() {
            anyhow::bail!("Weather provider returned {status}");
        }

        Ok(body)
    }

    /// Current conditions for `location`.
    pub async fn current(&self, location: &str) -> anyhow::Result<CurrentWeather> {
        let body = self
            .fetch("current.json", &[("q", location.to_string())])
            .await?;
        let data: CurrentResponse = serde_json::from_value(body)
            .map_err(|e| anyhow::anyhow!("Unexpected weather response: {e}"))?;

        Ok(CurrentWeather {
            location: data.location.name,
            temperature_c: data.current.temp_c,
            temperature_f: data.current.temp_f,
            condition: data.current.condition.text,
            humidity: data.current.humidity,
            wind_kph: data.current.wind_kph,
        })
    }

    /// `days`-day forecast for `location`, returning the resolved location name.
    pub async fn forecast(
        &self,
        location: &str,
        days: i64,
    ) -> anyhow::Result<(String, Vec<DailyForecast>)> {
        let body = self
            .fetch(
                "forecast.json",
                &[("q", location.to_string()), ("days", days.to_string())],
            )
            .await?;
        let data: ForecastResponse = serde_json::from_value(body)
            .map_err(|e| anyhow::anyhow!("Unexpected forecast response: {e}"))?;

        let days = data
            .forecast
            .forecastday
            .into_iter()
            .map(|d| DailyForecast {
                date: d.date,
                max_temp_c: d.day.maxtemp_c,
                min_temp_c: d.day.mintemp_c,
                condition: d.day.condition.text,
                chance_of_rain: d.day.daily_chance_of_rain,
            })
            .collect();

        Ok((data.location.name, days))
    }
}

// ─────────────────────────────────────────────
// CurrentWeatherTool
// ─────────────────────────────────────────────

/// `get_current_weather(location)`.
pub struct CurrentWeatherTool {
    client: Arc<WeatherClient>,
}

impl CurrentWeatherTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather in a given location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": LOCATION_DESCRIPTION
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<ToolOutput> {
        let location = require_string(&params, "location")?;
        let snapshot = self.client.current(&location).await?;
        Ok(ToolOutput::Json(serde_json::to_value(snapshot)?))
    }
}

// ─────────────────────────────────────────────
// ForecastTool
// ─────────────────────────────────────────────

/// `get_weather_forecast(location, days = 3)`, days bounded to [1, 10].
pub struct ForecastTool {
    client: Arc<WeatherClient>,
}

impl ForecastTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Get the weather forecast for a location for a specific number of days"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": LOCATION_DESCRIPTION
                },
                "days": {
                    "type": "integer",
                    "description": "The number of days to forecast (1-10)",
                    "minimum": 1,
                    "maximum": 10
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<ToolOutput> {
        let location = require_string(&params, "location")?;
        let days = optional_i64(&params, "days")
            .unwrap_or(DEFAULT_FORECAST_DAYS)
            .clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS);

        let (resolved, forecast) = self.client.forecast(&location, days).await?;
        Ok(ToolOutput::Json(json!({
            "location": resolved,
            "forecast": forecast,
        })))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::executor::ToolExecutor;
    use crate::tools::registry::ToolRegistry;
    use stratus_core::types::ToolCall;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Arc<WeatherClient> {
        Arc::new(WeatherClient::new(&WeatherConfig {
            api_key: "wk-test".into(),
            api_base: server.uri(),
            timeout_secs: 5,
        }))
    }

    fn params(v: Value) -> HashMap<String, Value> {
        serde_json::from_value(v).unwrap()
    }

    fn paris_current() -> Value {
        json!({
            "location": { "name": "Paris", "country": "France" },
            "current": {
                "temp_c": 18.0,
                "temp_f": 64.4,
                "condition": { "text": "Partly cloudy" },
                "humidity": 72,
                "wind_kph": 11.2
            }
        })
    }

    #[tokio::test]
    async fn test_current_weather_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("q", "Paris"))
            .and(query_param("key", "wk-test"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_current()))
            .mount(&server)
            .await;

        let tool = CurrentWeatherTool::new(client_for(&server));
        let out = tool
            .execute(params(json!({"location": "Paris"})))
            .await
            .unwrap()
            .into_text();
        let v: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(v["location"], "Paris");
        assert_eq!(v["temperature_c"], 18.0);
        assert_eq!(v["temperature_f"], 64.4);
        assert_eq!(v["condition"], "Partly cloudy");
        assert_eq!(v["humidity"], 72);
        assert_eq!(v["wind_kph"], 11.2);
    }

    #[tokio::test]
    async fn test_unknown_location_is_recovered_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;

        let tool = CurrentWeatherTool::new(client_for(&server));
        let err = tool
            .execute(params(json!({"location": "Atlantis"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No matching location found.");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = Arc::new(WeatherClient::new(&WeatherConfig::default()));
        let tool = CurrentWeatherTool::new(client);
        let err = tool
            .execute(params(json!({"location": "Paris"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("WEATHER_API_KEY"));
    }

    #[tokio::test]
    async fn test_forecast_defaults_to_three_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("q", "Tokyo"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": { "name": "Tokyo" },
                "forecast": { "forecastday": [
                    { "date": "2026-10-18", "day": {
                        "maxtemp_c": 22.1, "mintemp_c": 15.3,
                        "condition": { "text": "Sunny" }, "daily_chance_of_rain": 0 } },
                    { "date": "2026-10-19", "day": {
                        "maxtemp_c": 19.8, "mintemp_c": 14.0,
                        "condition": { "text": "Light rain" }, "daily_chance_of_rain": 86 } }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = ForecastTool::new(client_for(&server));
        let out = tool
            .execute(params(json!({"location": "Tokyo"})))
            .await
            .unwrap()
            .into_text();
        let v: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(v["location"], "Tokyo");
        let days = v["forecast"].as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1]["date"], "2026-10-19");
        assert_eq!(days[1]["condition"], "Light rain");
        assert_eq!(days[1]["chance_of_rain"], 86);
        assert_eq!(days[0]["max_temp_c"], 22.1);
    }

    #[tokio::test]
    async fn test_forecast_days_out_of_range_never_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(ForecastTool::new(client_for(&server))))
            .unwrap();
        let executor = ToolExecutor::new(Arc::new(registry));

        let call = ToolCall::new(
            "call_1",
            "get_weather_forecast",
            r#"{"location": "Oslo", "days": 15}"#,
        );
        let result = executor.execute(&call).await;

        assert!(result.starts_with("Error: Invalid arguments for get_weather_forecast"));
        assert!(result.contains("<= 10"));
        server.verify().await;
    }

    async fn forecast_days_sent(requested: i64, expected: &str) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("q", "Oslo"))
            .and(query_param("days", expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": { "name": "Oslo" },
                "forecast": { "forecastday": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = ForecastTool::new(client_for(&server));
        let out = tool
            .execute(params(json!({"location": "Oslo", "days": requested})))
            .await
            .unwrap()
            .into_text();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["location"], "Oslo");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_forecast_handler_clamps_days() {
        forecast_days_sent(15, "10").await;
        forecast_days_sent(0, "1").await;
        forecast_days_sent(-4, "1").await;
        forecast_days_sent(7, "7").await;
    }

    #[test]
    fn test_forecast_schema_bounds() {
        let client = Arc::new(WeatherClient::new(&WeatherConfig::default()));
        let schema = ForecastTool::new(client).parameters();
        assert_eq!(schema["properties"]["days"]["minimum"], 1);
        assert_eq!(schema["properties"]["days"]["maximum"], 10);
        assert_eq!(schema["required"], json!(["location"]));
    }
}
