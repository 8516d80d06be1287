//! HTTP surface: `POST /api/company_analysis`
//!
//! Status mapping:
//! - 200 with the profile for any valid request, whatever the upstreams did
//! - 400 when `company_name` is missing, null or blank
//! - 500 for everything else, including malformed JSON, bodies over
//!   [`MAX_BODY_BYTES`] and handler panics

use crate::aggregator::CompanyProfiler;
use crate::error::{ProfileError, Result};
use crate::profile::{CompanyProfile, CompanyQuery};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const ANALYSIS_PATH: &str = "/api/company_analysis";

/// Largest request body the endpoint buffers; anything bigger is a JSON 500
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    profiler: Arc<CompanyProfiler>,
}

impl AppState {
    pub fn new(profiler: CompanyProfiler) -> Self {
        Self {
            profiler: Arc::new(profiler),
        }
    }
}

/// Router with the analysis route and the CORS, tracing and panic layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(ANALYSIS_PATH, post(company_analysis))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn company_analysis(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<CompanyProfile>> {
    let body = body.map_err(|rejection| {
        ProfileError::InvalidInput(format!(
            "could not read request body: {}",
            rejection.body_text()
        ))
    })?;
    let query = parse_request(&body)?;
    info!(company = query.name(), "company analysis requested");
    Ok(Json(state.profiler.profile(&query).await))
}

/// Extract the company name from a raw request body
///
/// The body is read as JSON regardless of its declared content type.
pub fn parse_request(body: &[u8]) -> Result<CompanyQuery> {
    let value: Value = serde_json::from_slice(body)?;

    let Some(raw) = value.get("company_name").filter(|v| !v.is_null()) else {
        return Err(ProfileError::MissingCompanyName);
    };
    let name = raw
        .as_str()
        .ok_or_else(|| ProfileError::InvalidInput("company_name must be a string".to_string()))?;

    CompanyQuery::parse(name)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "request handler panicked".to_string()
    };
    ProfileError::Other(message).into_response()
}
