use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// How `/forecast` answers after a successful remote fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMode {
    /// Return only the rows normalized from the response just fetched.
    Live,
    /// Persist, then return everything stored for the office.
    History,
}

impl FromStr for ForecastMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(ForecastMode::Live),
            "history" => Ok(ForecastMode::History),
            other => Err(anyhow::anyhow!(
                "FORECAST_MODE must be 'live' or 'history', got '{}'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub areas_path: String,
    pub forecast_base_url: String,
    pub forecast_mode: ForecastMode,
    pub http_timeout_secs: u64,
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let forecast_mode = match env::var("FORECAST_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => ForecastMode::History,
        };

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS is not a number: {}", value))?,
            Err(_) => 30,
        };

        Ok(Config {
            areas_path: env::var("AREAS_PATH").unwrap_or_else(|_| "jma/areas.json".to_string()),
            forecast_base_url: env::var("FORECAST_BASE_URL").unwrap_or_else(|_| {
                "https://www.jma.go.jp/bosai/forecast/data/forecast".to_string()
            }),
            forecast_mode,
            http_timeout_secs,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./jma_weather.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}
