use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Role this process runs as ("local" or "remote").
    pub role: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(role: &str) -> Self {
        Self {
            status: "ok".to_string(),
            role: role.to_string(),
        }
    }

    /// Create a health response indicating the remote peer is unreachable.
    pub fn degraded(role: &str) -> Self {
        Self {
            status: "degraded".to_string(),
            role: role.to_string(),
        }
    }
}
