use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::player::{AppendResponse, PlayerInput, SnapshotResponse},
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Read-only record routes available on both roles.
pub fn read_router(legacy_path: &'static str) -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players))
        .route(legacy_path, get(list_players))
}

/// Record creation routes of the game-facing role.
pub fn write_router() -> Router<SharedState> {
    Router::new()
        .route("/players", post(append_player))
        .route("/save_player_data", post(append_player))
}

/// Return every resident record, the store metadata and provenance.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses(
        (status = 200, description = "Store snapshot", body = SnapshotResponse),
        (status = 503, description = "Persisted document unavailable")
    )
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let snapshot = player_service::snapshot_records(&state).await?;
    Ok(Json(snapshot))
}

/// Validate a finished run and append it as a numbered record.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = PlayerInput,
    responses(
        (status = 200, description = "Record appended", body = AppendResponse),
        (status = 400, description = "Missing or out of range field")
    )
)]
pub async fn append_player(
    State(state): State<SharedState>,
    Json(payload): Json<PlayerInput>,
) -> Result<Json<AppendResponse>, AppError> {
    let response = player_service::append_record(&state, payload).await?;
    Ok(Json(response))
}
