use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dynamo_core::AppError;
use std::sync::Arc;

/// Counts a request as in flight for as long as it lives.
struct InFlight(Arc<AppState>);

impl InFlight {
    fn enter(state: Arc<AppState>) -> Self {
        state.request_started();
        InFlight(state)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.request_finished();
    }
}

/// Refuse new requests with 503 once the server is draining.
pub async fn drain_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.is_draining() {
        return HttpAppError::from(AppError::Unavailable(
            "Server is shutting down".to_string(),
        ))
        .into_response();
    }

    let _in_flight = InFlight::enter(state);
    next.run(request).await
}
