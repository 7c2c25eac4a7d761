pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub service_name: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: Pipeline, service_name: impl Into<String>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            service_name: service_name.into(),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState, allowed_origins: &[String]) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/proxy", get(routes::proxy))
        .route("/extract", get(routes::extract))
        .route("/metadata", get(routes::metadata))
        .route("/search", get(routes::search))
        .fallback(routes::not_found)
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Static allow-list with credentials. Methods and headers are mirrored from
/// the preflight, since `*` is not allowed together with credentials.
fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid cors origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
