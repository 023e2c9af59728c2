pub mod api_server;
pub mod config;
pub mod error;
pub mod fred_client;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod rate_store;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::IngestError;
pub use fred_client::{FredClient, RateSource};
pub use ingest::RateIngestor;
pub use models::{RateHistoryRecord, RateObservation};
pub use rate_store::{RateStore, SupabaseStore};
