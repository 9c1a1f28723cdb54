/// Health check payloads.
pub mod health;
/// Record creation and snapshot payloads.
pub mod player;
/// Queue estimate payloads.
pub mod queue;
/// Transfer envelope and responses.
pub mod transfer;
/// Custom validators.
pub mod validation;
