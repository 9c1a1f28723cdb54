/// Generation gate deciding which telemetry gets charts.
pub mod artifact_gate;
/// Artifact file naming, staging and persistence.
pub mod artifacts;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Record creation and reporting.
pub mod player_service;
/// Queue position and wait estimate.
pub mod queue_service;
/// Inbound transfer handling on the remote role.
pub mod receive_service;
/// Reachability supervisor for the remote store.
pub mod remote_supervisor;
/// Chart rendering collaborator.
pub mod render;
/// Outbound transfer on the local role.
pub mod transfer_service;
