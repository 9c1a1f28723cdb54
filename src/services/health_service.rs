use crate::{dto::health::HealthResponse, state::SharedState};

/// Report the role and whether the remote peer is currently reachable.
///
/// Only the local role has a peer; the remote role is always `ok`.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let role = state.config().role.as_str();
    if state.is_degraded() {
        HealthResponse::degraded(role)
    } else {
        HealthResponse::ok(role)
    }
}
