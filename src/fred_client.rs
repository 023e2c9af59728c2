use crate::config;
use crate::error::IngestError;
use crate::models::{FredResponse, RateObservation};
use chrono::{Days, Utc};
use reqwest::{Client, header};
use tracing::info;

/// Source of the authoritative 30-year observation. The production impl
/// talks to FRED; tests substitute their own.
pub trait RateSource {
    async fn latest_30_year(&self) -> Result<RateObservation, IngestError>;
}

// -----------------------------------------------
// FRED CLIENT
// -----------------------------------------------
pub struct FredClient {
    client: Client,
    api_key: String,
}

fn build_client() -> Result<Client, IngestError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .timeout(config::HTTP_TIMEOUT)
        .default_headers(headers)
        .build()
        .map_err(|e| IngestError::Fetch(format!("Failed to build HTTP client: {}", e)))
}

impl FredClient {
    pub fn new(api_key: String) -> Result<Self, IngestError> {
        Ok(Self {
            client: build_client()?,
            api_key,
        })
    }

    /// Most recent 30-year fixed observation within the lookback window,
    /// requested in descending order with limit 1.
    pub async fn fetch_latest_30_year(&self) -> Result<RateObservation, IngestError> {
        let end = Utc::now().date_naive();
        let start = end - Days::new(config::LOOKBACK_DAYS);
        let url = config::fred_observations_url(&self.api_key, start, end);

        info!(series = config::FRED_SERIES_30_YEAR, "Fetching 30-year rate from FRED");

        let res = self.client.get(&url).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(IngestError::Fetch(format!(
                "FRED API error: {} {}",
                status, preview
            )));
        }

        let data: FredResponse = res
            .json()
            .await
            .map_err(|e| IngestError::Fetch(format!("Failed to parse FRED response: {}", e)))?;

        parse_latest_observation(&data)
    }
}

impl RateSource for FredClient {
    async fn latest_30_year(&self) -> Result<RateObservation, IngestError> {
        self.fetch_latest_30_year().await
    }
}

/// Validate the most recent observation out of a FRED response. Rejects
/// empty payloads, non-numeric values (FRED's "." placeholder included),
/// and anything outside (0, 15].
pub fn parse_latest_observation(data: &FredResponse) -> Result<RateObservation, IngestError> {
    let observation = data
        .observations
        .first()
        .ok_or_else(|| IngestError::Fetch("No rate data found".to_string()))?;

    let value: f64 = observation
        .value
        .parse()
        .map_err(|_| IngestError::Fetch(format!("Invalid rate value: {}", observation.value)))?;

    if !value.is_finite()
        || value <= config::MIN_RATE_EXCLUSIVE
        || value > config::MAX_RATE_INCLUSIVE
    {
        return Err(IngestError::Fetch(format!("Invalid rate value: {}", value)));
    }

    Ok(RateObservation::thirty_year_fixed(
        observation.date.clone(),
        value,
    ))
}
