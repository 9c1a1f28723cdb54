use axum::Router;
use tower_http::services::ServeDir;

use crate::{config::Role, state::SharedState};

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Health endpoints.
pub mod health;
/// Record endpoints.
pub mod players;
/// Queue endpoint.
pub mod queue;
/// Transfer endpoints.
pub mod transfer;

/// Compose the route trees of the configured role, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let common = health::router().merge(queue::router());

    let api_router = match state.config().role {
        Role::Local => common
            .merge(players::read_router("/get_player_data"))
            .merge(players::write_router())
            .merge(transfer::outbound_router()),
        Role::Remote => common
            .merge(players::read_router("/get_all_player_data"))
            .merge(transfer::inbound_router()),
    };

    let mut app = api_router.merge(docs::router());

    if let Some(dir) = state.config().static_dir.clone() {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
}
