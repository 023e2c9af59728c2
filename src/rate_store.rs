use crate::config;
use crate::error::IngestError;
use crate::models::RateHistoryRecord;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

/// Upsert-by-composite-key persistence for rate history rows. The key is
/// `(rate_date, term_years)`; a repeated write for the same key overwrites
/// the existing row. Atomicity per key is the backend's guarantee.
pub trait RateStore {
    async fn upsert(&self, record: &RateHistoryRecord) -> Result<()>;
}

// -----------------------------------------------
// SUPABASE (POSTGREST) STORE
// -----------------------------------------------
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: String, service_role_key: String) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(config::HTTP_TIMEOUT)
            .build()
            .map_err(|e| {
                IngestError::Config(format!("Failed to build storage client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
        })
    }

    fn upsert_url(&self) -> String {
        format!(
            "{}/rest/v1/rate_history?on_conflict=rate_date,term_years",
            self.base_url
        )
    }
}

impl RateStore for SupabaseStore {
    async fn upsert(&self, record: &RateHistoryRecord) -> Result<()> {
        debug!(
            rate_date = %record.rate_date,
            term_years = record.term_years,
            "Upserting rate history row"
        );

        let res = self
            .client
            .post(self.upsert_url())
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await
            .context("Storage request send failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("Storage upsert rejected: {} {}", status, preview);
        }

        Ok(())
    }
}
