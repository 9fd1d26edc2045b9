//! FRED (Federal Reserve Economic Data) client

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::models::{DateRange, Observation, SeriesMetadata};
use crate::provider::SeriesProvider;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// FRED marks a missing observation with a single dot.
const MISSING_VALUE: &str = ".";

#[derive(Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.fred_api_key.clone(),
            base_url: config.fred_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        series_code: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut query: Vec<(&str, String)> = vec![
            ("series_id", series_code.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        query.extend(params.iter().cloned());

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which holds the api key.
                let e = e.without_url();
                error!("FRED request failed for {}: {}", path, e);
                AgentError::ProviderUnavailable(format!("FRED request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AgentError::ProviderUnavailable(format!("FRED response unreadable: {}", e.without_url()))
        })?;

        if !status.is_success() {
            return Err(classify_error(status, series_code, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SeriesProvider for FredClient {
    async fn get_metadata(&self, series_code: &str) -> Result<SeriesMetadata> {
        debug!(series_code, "Fetching FRED series metadata");

        let response: SeriesResponse = self.get_json("/fred/series", series_code, &[]).await?;
        parse_metadata(series_code, response)
    }

    async fn get_observations(
        &self,
        series_code: &str,
        range: DateRange,
    ) -> Result<Vec<Observation>> {
        debug!(series_code, start = %range.start, end = %range.end, "Fetching FRED observations");

        let params = [
            ("observation_start", range.start.format(DATE_FORMAT).to_string()),
            ("observation_end", range.end.format(DATE_FORMAT).to_string()),
            ("sort_order", "asc".to_string()),
        ];

        let response: ObservationsResponse = self
            .get_json("/fred/series/observations", series_code, &params)
            .await?;

        parse_observations(response)
    }
}

/// Map a non-success FRED response onto the error taxonomy.
fn classify_error(status: StatusCode, series_code: &str, body: &str) -> AgentError {
    let message = serde_json::from_str::<FredErrorBody>(body)
        .map(|b| b.error_message)
        .unwrap_or_else(|_| body.to_string());

    let not_found = status == StatusCode::NOT_FOUND
        || message.to_ascii_lowercase().contains("does not exist");

    if not_found {
        warn!(series_code, %status, "FRED does not recognise series");
        AgentError::UnknownSeries(format!("{} ({})", series_code, message.trim()))
    } else {
        error!(series_code, %status, "FRED error response: {}", message);
        AgentError::ProviderUnavailable(format!("FRED returned {}: {}", status, message.trim()))
    }
}

fn parse_metadata(series_code: &str, response: SeriesResponse) -> Result<SeriesMetadata> {
    let series = response
        .seriess
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::UnknownSeries(series_code.to_string()))?;

    Ok(SeriesMetadata {
        series_code: series.id,
        units: series.units,
    })
}

fn parse_observations(response: ObservationsResponse) -> Result<Vec<Observation>> {
    let mut points = Vec::with_capacity(response.observations.len());

    for raw in response.observations {
        let value = raw.value.trim();
        if value == MISSING_VALUE {
            continue;
        }

        let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT).map_err(|e| {
            AgentError::ProviderUnavailable(format!("Invalid observation date {}: {}", raw.date, e))
        })?;
        let value: f64 = value.parse().map_err(|_| {
            AgentError::ProviderUnavailable(format!("Invalid observation value {}", raw.value))
        })?;

        points.push(Observation::new(date, value));
    }

    Ok(points)
}

#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_message: String,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    seriess: Vec<SeriesRecord>,
}

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    id: String,
    units: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}
