use super::types::ForecastReport;
use crate::config::Config;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JmaError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("{0}")]
    Status(StatusCode),
    #[error("Invalid office code: {0:?}")]
    InvalidOfficeCode(String),
}

impl JmaError {
    /// The short text shown to the user in place of a forecast.
    pub fn user_message(&self) -> String {
        match self {
            JmaError::Status(status) => format!("Error: {}", status.as_u16()),
            JmaError::RequestFailed(e) => match e.status() {
                Some(status) => format!("Error: {}", status.as_u16()),
                None => "Error: forecast service unreachable".to_string(),
            },
            JmaError::InvalidOfficeCode(code) => format!("Error: invalid office code {:?}", code),
        }
    }
}

pub struct JmaClient {
    client: Client,
    base_url: String,
}

impl JmaClient {
    pub fn new(config: &Config) -> Result<Self, JmaError> {
        let client = Client::builder()
            .user_agent("jma-weather/0.1")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn forecast_url(&self, office_code: &str) -> String {
        format!("{}/{}.json", self.base_url, office_code)
    }

    /// One GET, no retry. Anything but `200 OK` is an error.
    pub async fn get_forecast(&self, office_code: &str) -> Result<Vec<ForecastReport>, JmaError> {
        if !is_valid_office_code(office_code) {
            return Err(JmaError::InvalidOfficeCode(office_code.to_string()));
        }

        let url = self.forecast_url(office_code);
        tracing::debug!("Fetching forecast from {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => {
                tracing::warn!("Forecast request for {} returned {}", office_code, status);
                Err(JmaError::Status(status))
            }
        }
    }
}

pub fn is_valid_office_code(office_code: &str) -> bool {
    !office_code.is_empty() && office_code.chars().all(|c| c.is_ascii_alphanumeric())
}
