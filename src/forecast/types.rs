use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One element of the array served at `forecast/{office_code}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub publishing_office: Option<String>,
    pub report_datetime: Option<String>,
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub areas: Vec<AreaForecast>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaForecast {
    pub area: Option<AreaRef>,
    #[serde(default)]
    pub weathers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRef {
    pub name: Option<String>,
}

/// A single normalized (report × area) row, as stored in `forecasts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ForecastEntry {
    pub office_code: String,
    pub publishing_office: String,
    pub report_datetime: String,
    pub area_name: Option<String>,
    pub weather: String,
    pub created_at: Option<DateTime<Utc>>,
}
