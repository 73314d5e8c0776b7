//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers only
//! translate between HTTP and cache actions; everything that touches the
//! cache goes through the dispatcher.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::dispatch::Dispatcher;
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, PutRequest, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Producer handle for the action queue
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Handler for PUT /put
///
/// Decoding failures are 422, an unparseable TTL is 406, a full action
/// queue is 429. Success is 204 with no body.
///
/// A body that cannot be buffered, including one over the size limit, counts
/// as undecodable.
pub async fn put_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<StatusCode> {
    let body = body.map_err(|rejection| CacheError::MalformedRequest(rejection.body_text()))?;
    let req = PutRequest::from_slice(&body)?;
    req.validate()?;
    let ttl = req.parse_ttl()?;

    state.dispatcher.put(req.key, req.value, ttl).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /get/:key
///
/// Responds with the stored JSON value itself.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    match state.dispatcher.get(key.as_str()).await? {
        Some(value) => Ok(Json(value)),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Responds with the removed JSON value.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    match state.dispatcher.remove(key.as_str()).await? {
        Some(value) => Ok(Json(value)),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.dispatcher.stats().await?;

    Ok(Json(StatsResponse::new(stats, state.dispatcher.queue_stats())))
}

/// Handler for GET /health
///
/// Reports 503 once the action dispatcher has stopped.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    if state.dispatcher.is_closed() {
        return Err(CacheError::DispatcherClosed);
    }
    Ok(Json(HealthResponse::healthy()))
}
