use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    review_queue: ReviewQueueHealth,
}

#[derive(Serialize)]
pub struct ReviewQueueHealth {
    capacity: usize,
    open: bool,
}

/// Health check endpoint
///
/// The service is healthy while the hand-off queue into the moderation loop
/// is still open; a closed queue means the loop has stopped consuming.
///
/// Returns 200 OK when healthy, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let open = !state.events.is_closed();

    let (status, status_code) = if open {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            review_queue: ReviewQueueHealth {
                capacity: state.events.max_capacity(),
                open,
            },
        }),
    )
}
