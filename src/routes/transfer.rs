use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::post,
};

use crate::{
    dto::transfer::{ReceiveResponse, TransferEnvelope, TransferRequest, TransferResponse},
    error::AppError,
    services::{receive_service, transfer_service},
    state::SharedState,
};

/// Envelopes carry hex encoded artifacts and can be large.
const RECEIVE_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Outbound transfer trigger of the game-facing role.
pub fn outbound_router() -> Router<SharedState> {
    Router::new()
        .route("/transfers", post(trigger_transfer))
        .route("/transfer_player_data", post(trigger_transfer))
}

/// Receive endpoint of the aggregation role.
pub fn inbound_router() -> Router<SharedState> {
    Router::new()
        .route("/transfers/receive", post(receive_transfer))
        .route("/receive_transferred_data", post(receive_transfer))
        .layer(DefaultBodyLimit::max(RECEIVE_BODY_LIMIT))
}

/// Ship resident records and staged files to the remote role.
///
/// The body is optional; an empty one means an incremental transfer without sampling.
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    request_body(content = TransferRequest, description = "Optional transfer options"),
    responses(
        (status = 200, description = "Batch delivered or nothing to send", body = TransferResponse),
        (status = 400, description = "Malformed request body"),
        (status = 502, description = "Remote store did not accept the batch; nothing was drained")
    )
)]
pub async fn trigger_transfer(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<TransferResponse>, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        TransferRequest::default()
    } else {
        serde_json::from_slice::<TransferRequest>(&body)
            .map_err(|err| AppError::BadRequest(format!("invalid transfer request: {err}")))?
    };

    let response = transfer_service::push_batch(&state, request).await?;
    Ok(Json(response))
}

/// Apply a batch delivered by the game-facing role.
#[utoipa::path(
    post,
    path = "/transfers/receive",
    tag = "transfers",
    request_body = TransferEnvelope,
    responses(
        (status = 200, description = "Batch applied", body = ReceiveResponse),
        (status = 400, description = "Envelope status is not success")
    )
)]
pub async fn receive_transfer(
    State(state): State<SharedState>,
    Json(envelope): Json<TransferEnvelope>,
) -> Result<Json<ReceiveResponse>, AppError> {
    let response = receive_service::receive_transfer(&state, envelope).await?;
    Ok(Json(response))
}
