use crate::config;
use crate::error::IngestError;
use crate::fred_client::RateSource;
use crate::models::RateObservation;
use crate::rate_store::RateStore;
use tracing::{error, info};

/// Expand the observed 30-year rate into the full three-term set, in the
/// fixed order [30, 15, 20]. The shorter tenors are fixed-offset
/// estimates clamped at zero, not independently observed quotes.
pub fn derive_rates(thirty_year: &RateObservation) -> Vec<RateObservation> {
    vec![
        thirty_year.clone(),
        RateObservation {
            value: (thirty_year.value - config::OFFSET_15_YEAR).max(0.0),
            term_years: 15,
            ..thirty_year.clone()
        },
        RateObservation {
            value: (thirty_year.value - config::OFFSET_20_YEAR).max(0.0),
            term_years: 20,
            ..thirty_year.clone()
        },
    ]
}

// -----------------------------------------------
// INGESTION JOB
// -----------------------------------------------

/// One-shot ingestion pipeline: fetch and validate the 30-year rate,
/// derive the 15- and 20-year estimates, persist all three. Stateless
/// across invocations; both collaborators are injected.
pub struct RateIngestor<F: RateSource, S: RateStore> {
    source: F,
    store: S,
}

impl<F: RateSource, S: RateStore> RateIngestor<F, S> {
    pub fn new(source: F, store: S) -> Self {
        Self { source, store }
    }

    /// Run one full ingestion pass. Returns the three observations as
    /// fetched/derived (not as stored), in the order [30, 15, 20].
    pub async fn run(&self) -> Result<Vec<RateObservation>, IngestError> {
        let thirty_year = self.source.latest_30_year().await?;
        info!(
            date = %thirty_year.date,
            value = thirty_year.value,
            "Fetched 30-year observation"
        );

        let rates = derive_rates(&thirty_year);
        self.persist_all(&rates).await?;

        Ok(rates)
    }

    /// Upsert each observation in sequence. The first failure aborts the
    /// remaining writes; earlier successful writes are not rolled back,
    /// and their count is carried in the error.
    async fn persist_all(&self, rates: &[RateObservation]) -> Result<(), IngestError> {
        for (stored, rate) in rates.iter().enumerate() {
            if let Err(e) = self.store.upsert(&rate.to_record()).await {
                error!(
                    term_years = rate.term_years,
                    error = %e,
                    "Failed to store rate"
                );
                return Err(IngestError::Persist {
                    stored,
                    message: format!("{:#}", e),
                });
            }

            info!(
                term_years = rate.term_years,
                date = %rate.date,
                "Stored rate"
            );
        }

        Ok(())
    }
}
