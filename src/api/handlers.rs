use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Sse},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

use crate::relay::ResultRelay;
use crate::search::SearchProvider;

use super::error::ApiError;
use super::models::{SearchRequest, SearchResponse};
use super::sse::frame_events;

fn validated_query(payload: Result<Json<SearchRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    match request.query {
        Some(query) if !query.trim().is_empty() => Ok(query),
        _ => Err(ApiError::BadRequest("Query is required".to_string())),
    }
}

pub async fn stream_search_handler<P: SearchProvider>(
    State(relay): State<Arc<ResultRelay<P>>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = validated_query(payload)?;
    let rx = relay.start(query);

    Ok((
        [(header::CONNECTION, "keep-alive")],
        Sse::new(frame_events(rx)),
    ))
}

pub async fn search_handler<P: SearchProvider>(
    State(relay): State<Arc<ResultRelay<P>>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let query = validated_query(payload)?;

    let results = relay.collect(&query).await?;

    let total_results = results.len();
    let processing_time_ms = start.elapsed().as_millis();
    tracing::info!(query = %query, total_results, processing_time_ms, "search served");

    Ok(Json(SearchResponse {
        query,
        results,
        total_results,
        processing_time_ms,
    }))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
