use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use super::error::ApiError;
use crate::error::PipelineError;
use crate::formats::{
    ExtractRecord, HealthStatus, PageMetadata, SearchSuggestions, ServiceStatus,
};
use crate::pipeline::{Pipeline, ProxyOutcome};
use crate::search::search_suggestions;

const PROXIED_BY: &str = "x-proxied-by";
const PROXIED_BY_VALUE: &str = "hellonet";

#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    url: Option<String>,
}

impl TargetQuery {
    fn require(self, path: &'static str) -> Result<String, ApiError> {
        match self.url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(ApiError::MissingParam {
                message: "URL parameter is required",
                usage: format!("{path}?url=https://example.com"),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn root() -> Json<ServiceStatus> {
    let endpoints = [
        ("health", "/health"),
        ("proxy", "/proxy?url=<url>"),
        ("extract", "/extract?url=<url>"),
        ("metadata", "/metadata?url=<url>"),
        ("search", "/search?q=<query>"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceStatus {
        message: "Hello Net Browser Backend".to_owned(),
        status: "running".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        endpoints,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_owned(),
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn proxy(
    State(state): State<AppState>,
    Query(q): Query<TargetQuery>,
) -> Result<Response, ApiError> {
    let url = q.require("/proxy")?;
    let outcome = run_detached(&state, move |pipeline| async move {
        pipeline.proxy(&url).await
    })
    .await?;

    let mut resp = match outcome {
        ProxyOutcome::Html(html) => Html(html).into_response(),
        ProxyOutcome::Passthrough { content_type, body } => {
            let mut resp = body.into_response();
            let content_type = HeaderValue::from_str(&content_type)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
            resp.headers_mut().insert(header::CONTENT_TYPE, content_type);
            resp.headers_mut().insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            resp
        }
    };
    resp.headers_mut().insert(
        HeaderName::from_static(PROXIED_BY),
        HeaderValue::from_static(PROXIED_BY_VALUE),
    );
    Ok(resp)
}

pub async fn extract(
    State(state): State<AppState>,
    Query(q): Query<TargetQuery>,
) -> Result<Json<ExtractRecord>, ApiError> {
    let url = q.require("/extract")?;
    let record = run_detached(&state, move |pipeline| async move {
        pipeline.extract(&url).await
    })
    .await?;
    Ok(Json(record))
}

pub async fn metadata(
    State(state): State<AppState>,
    Query(q): Query<TargetQuery>,
) -> Result<Json<PageMetadata>, ApiError> {
    let url = q.require("/metadata")?;
    let metadata = run_detached(&state, move |pipeline| async move {
        pipeline.metadata(&url).await
    })
    .await?;
    Ok(Json(metadata))
}

pub async fn search(Query(q): Query<SearchQuery>) -> Result<Json<SearchSuggestions>, ApiError> {
    let query = q.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::MissingParam {
            message: "Search query is required",
            usage: "/search?q=rust".to_owned(),
        });
    }
    Ok(Json(search_suggestions(&query, chrono::Utc::now().to_rfc3339())))
}

pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}

/// Runs the pipeline on its own task so an aborted client connection does not
/// cancel the upstream fetch, and a panic surfaces as a 500.
async fn run_detached<T, F, Fut>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(Arc<Pipeline>) -> Fut,
    Fut: Future<Output = Result<T, PipelineError>> + Send + 'static,
{
    let fut = f(Arc::clone(&state.pipeline));
    match tokio::spawn(fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => Err(ApiError::Unexpected(err.to_string())),
    }
}
