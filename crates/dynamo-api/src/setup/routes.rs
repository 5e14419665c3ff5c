//! Route configuration and setup

use crate::handlers;
use crate::middleware::{drain_middleware, request_id_middleware};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    routing::{get, post},
    Router,
};
use dynamo_infra::RequestId;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let server = &state.settings.server;

    // The spool cap bounds upload size; axum's default 2 MB limit would cut uploads short.
    let mut router = Router::new()
        .route(
            "/video",
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(handlers::health::health))
        .route("/health/storage", get(handlers::health::storage_health));

    if server.expose_config {
        router = router.route("/meta/config", get(handlers::config::get_config));
    }

    let concurrency_limit = server.max_concurrent_requests.max(1);
    tracing::info!(
        http_concurrency_limit = concurrency_limit,
        expose_config = server.expose_config,
        "Routes configured"
    );

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            drain_middleware,
        ))
        // One semaphore shared by every route.
        .layer(GlobalConcurrencyLimitLayer::new(concurrency_limit))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str)
                .unwrap_or_else(|| request.uri().path());
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.as_str())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %path,
                request_id = %request_id
            )
        }))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
