use crate::config::AppConfig;
use crate::error::IngestError;
use crate::fred_client::FredClient;
use crate::ingest::RateIngestor;
use crate::rate_store::SupabaseStore;
use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json},
    routing::options,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

// -----------------------------------------------
// CORS
// -----------------------------------------------

/// Every response carries the same permissive set, matching what the
/// scheduled caller and the dashboard expect.
fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    headers
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    ingestor: Arc<RateIngestor<FredClient, SupabaseStore>>,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let fred = FredClient::new(cfg.fred_api_key.clone())?;
        let store = SupabaseStore::new(
            cfg.supabase_url.clone(),
            cfg.supabase_service_role_key.clone(),
        )?;

        Ok(Self {
            ingestor: Arc::new(RateIngestor::new(fred, store)),
        })
    }
}

// -----------------------------------------------
// HANDLERS
// -----------------------------------------------

/// Pre-flight: empty 204 with CORS headers. Never touches the ingestion
/// pipeline.
async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, cors_headers())
}

/// Any non-OPTIONS method triggers a full ingestion pass. Success returns
/// the three observations as fetched/derived; every failure collapses to
/// the same generic 500 payload.
async fn run_fetch_rates(State(state): State<AppState>) -> impl IntoResponse {
    match state.ingestor.run().await {
        Ok(rates) => (StatusCode::OK, cors_headers(), Json(json!(rates))),
        Err(e) => {
            error!(error = %e, "Rate ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                cors_headers(),
                Json(error_body(&e)),
            )
        }
    }
}

pub fn error_body(e: &IngestError) -> Value {
    json!({
        "error": "Failed to fetch rates",
        "details": e.to_string(),
    })
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", options(preflight).fallback(run_fetch_rates))
        .route("/fetch-rates", options(preflight).fallback(run_fetch_rates))
        .with_state(state)
}

pub async fn start_server(cfg: AppConfig) -> Result<()> {
    let state = AppState::new(&cfg)?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "Rate ingestion server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
