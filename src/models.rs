use crate::config;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single market data point for one loan term. Built fresh on every
/// invocation and never persisted directly; `RateHistoryRecord` is the
/// stored shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateObservation {
    pub date: String,

    #[serde(rename = "type")]
    pub rate_type: String,

    pub value: f64,

    #[serde(rename = "termYears")]
    pub term_years: u32,
}

impl RateObservation {
    pub fn thirty_year_fixed(date: String, value: f64) -> Self {
        Self {
            date,
            rate_type: config::RATE_TYPE_FIXED.to_string(),
            value,
            term_years: 30,
        }
    }

    /// Storage representation, stamped with the write time.
    pub fn to_record(&self) -> RateHistoryRecord {
        RateHistoryRecord {
            rate_date: self.date.clone(),
            rate_type: self.rate_type.clone(),
            rate_value: self.value,
            term_years: self.term_years,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Row shape for the `rate_history` table. At most one row exists per
/// `(rate_date, term_years)` pair; writes are upserts on that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateHistoryRecord {
    pub rate_date: String,
    pub rate_type: String,
    pub rate_value: f64,
    pub term_years: u32,
    pub created_at: String,
}

/// Response envelope from the FRED observations endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FredResponse {
    #[serde(default)]
    pub observations: Vec<FredObservation>,
}

/// FRED returns the value as a string; missing data points come through
/// as "." and must fail numeric parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct FredObservation {
    pub date: String,
    pub value: String,
}
