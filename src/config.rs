use crate::error::IngestError;
use chrono::NaiveDate;
use std::time::Duration;

// -----------------------------------------------
// FRED API
// -----------------------------------------------
pub const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Weekly 30-year fixed mortgage rate series.
pub const FRED_SERIES_30_YEAR: &str = "MORTGAGE30US";

/// How far back to look for the most recent observation. The series is
/// published weekly, so a week is always enough to find one data point.
pub const LOOKBACK_DAYS: u64 = 7;

pub fn fred_observations_url(api_key: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}?series_id={}&api_key={}&file_type=json&sort_order=desc&limit=1&observation_start={}&observation_end={}",
        FRED_OBSERVATIONS_URL, FRED_SERIES_30_YEAR, api_key, start, end
    )
}

// -----------------------------------------------
// RATE VALIDATION AND DERIVATION
// -----------------------------------------------

/// Accepted range for a fetched rate, open at the bottom: (0, 15].
pub const MIN_RATE_EXCLUSIVE: f64 = 0.0;
pub const MAX_RATE_INCLUSIVE: f64 = 15.0;

/// Fixed-offset approximations of the shorter tenors relative to the
/// 30-year rate. Calibration constants, adjust here rather than in code.
pub const OFFSET_15_YEAR: f64 = 0.625;
pub const OFFSET_20_YEAR: f64 = 0.3125;

pub const RATE_TYPE_FIXED: &str = "Fixed";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------
// APPLICATION CONFIG
// -----------------------------------------------

/// Runtime configuration, read once from the environment at startup and
/// passed in explicitly everywhere else.
pub struct AppConfig {
    pub fred_api_key: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub port: u16,
}

impl AppConfig {
    /// Create new configuration from environment variables.
    /// Missing secrets abort here, before any network call is attempted.
    pub fn from_env() -> Result<Self, IngestError> {
        Ok(Self {
            fred_api_key: require_env("FRED_API_KEY")?,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_service_role_key: require_env("SUPABASE_SERVICE_ROLE_KEY")?,
            port: get_port(),
        })
    }
}

fn require_env(name: &str) -> Result<String, IngestError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(IngestError::Config(format!("{} not configured", name))),
    }
}

/// Get port from environment or default.
fn get_port() -> u16 {
    std::env::var("PORT")
        .unwrap_or_else(|_| DEFAULT_PORT.to_string())
        .parse::<u16>()
        .unwrap_or(DEFAULT_PORT)
}
