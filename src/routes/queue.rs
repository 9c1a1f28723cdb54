use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::queue::QueueStatusResponse, error::AppError, services::queue_service, state::SharedState,
};

/// Queue estimate routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/queue", get(queue_status))
        .route("/get_queue_status", get(queue_status))
}

#[utoipa::path(
    get,
    path = "/queue",
    tag = "queue",
    responses((status = 200, description = "Queue position and wait estimate", body = QueueStatusResponse))
)]
/// Return how many players are waiting and the estimated wait.
pub async fn queue_status(
    State(state): State<SharedState>,
) -> Result<Json<QueueStatusResponse>, AppError> {
    let status = queue_service::queue_status(&state).await?;
    Ok(Json(status))
}
