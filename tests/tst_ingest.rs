use fetch_rates::error::IngestError;
use fetch_rates::fred_client::RateSource;
use fetch_rates::ingest::RateIngestor;
use fetch_rates::models::{RateHistoryRecord, RateObservation};
use fetch_rates::rate_store::RateStore;
use std::collections::HashMap;
use std::sync::Mutex;

// -----------------------------------------------
// FAKES
// -----------------------------------------------

struct FixedSource(RateObservation);

impl RateSource for FixedSource {
    async fn latest_30_year(&self) -> Result<RateObservation, IngestError> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl RateSource for FailingSource {
    async fn latest_30_year(&self) -> Result<RateObservation, IngestError> {
        Err(IngestError::Fetch("No rate data found".to_string()))
    }
}

/// In-memory stand-in for the rate_history table, keyed the way the real
/// table is. `fail_after` makes the (n+1)-th and later upserts fail.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<HashMap<(String, u32), RateHistoryRecord>>,
    calls: Mutex<usize>,
    fail_after: Option<usize>,
}

impl MemoryStore {
    fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn row(&self, date: &str, term: u32) -> Option<RateHistoryRecord> {
        self.rows
            .lock()
            .unwrap()
            .get(&(date.to_string(), term))
            .cloned()
    }

    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl RateStore for &MemoryStore {
    async fn upsert(&self, record: &RateHistoryRecord) -> anyhow::Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if let Some(limit) = self.fail_after {
            if *calls > limit {
                anyhow::bail!("permission denied for table rate_history");
            }
        }

        self.rows
            .lock()
            .unwrap()
            .insert((record.rate_date.clone(), record.term_years), record.clone());
        Ok(())
    }
}

fn observation(date: &str, value: f64) -> RateObservation {
    RateObservation::thirty_year_fixed(date.to_string(), value)
}

// -----------------------------------------------
// TESTS
// -----------------------------------------------

#[tokio::test]
async fn run_returns_three_rates_and_stores_them() {
    let store = MemoryStore::default();
    let ingestor = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);

    let rates = ingestor.run().await.unwrap();

    assert_eq!(rates.len(), 3);
    assert_eq!(rates[0].term_years, 30);
    assert_eq!(rates[1].term_years, 15);
    assert_eq!(rates[2].term_years, 20);
    assert_eq!(rates[0].value, 6.91);

    assert_eq!(store.calls(), 3);
    assert_eq!(store.len(), 3);

    let row = store.row("2024-06-01", 30).unwrap();
    assert_eq!(row.rate_value, 6.91);
    assert_eq!(row.rate_type, "Fixed");
    assert!(!row.created_at.is_empty());
}

#[tokio::test]
async fn fetch_failure_persists_nothing() {
    let store = MemoryStore::default();
    let ingestor = RateIngestor::new(FailingSource, &store);

    let err = ingestor.run().await.unwrap_err();

    assert!(matches!(err, IngestError::Fetch(_)));
    assert_eq!(store.calls(), 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn rerun_with_same_observation_is_idempotent() {
    let store = MemoryStore::default();

    let first = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);
    first.run().await.unwrap();

    let second = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);
    second.run().await.unwrap();

    // One row per (date, term) pair, not six
    assert_eq!(store.len(), 3);
    assert_eq!(store.row("2024-06-01", 30).unwrap().rate_value, 6.91);
}

#[tokio::test]
async fn rerun_with_new_value_overwrites() {
    let store = MemoryStore::default();

    let first = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);
    first.run().await.unwrap();

    let second = RateIngestor::new(FixedSource(observation("2024-06-01", 7.02)), &store);
    second.run().await.unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.row("2024-06-01", 30).unwrap().rate_value, 7.02);
}

#[tokio::test]
async fn thirty_year_write_failure_aborts_before_derived_writes() {
    let store = MemoryStore::failing_after(0);
    let ingestor = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);

    let err = ingestor.run().await.unwrap_err();

    match err {
        IngestError::Persist { stored, .. } => assert_eq!(stored, 0),
        other => panic!("expected persistence error, got {}", other),
    }
    assert_eq!(store.calls(), 1);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn later_write_failure_keeps_earlier_writes() {
    let store = MemoryStore::failing_after(1);
    let ingestor = RateIngestor::new(FixedSource(observation("2024-06-01", 6.91)), &store);

    let err = ingestor.run().await.unwrap_err();

    match err {
        IngestError::Persist { stored, .. } => assert_eq!(stored, 1),
        other => panic!("expected persistence error, got {}", other),
    }

    // 30-year landed, the 20-year write was never attempted
    assert_eq!(store.calls(), 2);
    assert_eq!(store.len(), 1);
    assert!(store.row("2024-06-01", 30).is_some());
    assert!(store.row("2024-06-01", 15).is_none());
    assert!(store.row("2024-06-01", 20).is_none());
}
