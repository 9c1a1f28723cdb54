//! Library crate for player-relay, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Persistence and remote client layer.
pub mod dao;
/// Wire types.
pub mod dto;
/// Service and HTTP errors.
pub mod error;
/// HTTP routers.
pub mod routes;
/// Business logic.
pub mod services;
/// Shared application state.
pub mod state;
