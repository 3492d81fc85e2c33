use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::relay::ResultRelay;
use crate::search::SearchProvider;

pub mod error;
pub mod handlers;
pub mod models;
pub mod sse;

pub fn create_router<P: SearchProvider>(relay: Arc<ResultRelay<P>>) -> Router {
    // The consuming UI is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/search",
            post(handlers::search_handler::<P>).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/search/stream",
            post(handlers::stream_search_handler::<P>).fallback(handlers::method_not_allowed),
        )
        .route("/api/health", get(handlers::health_handler))
        .with_state(relay)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
