//! player-relay binary entrypoint: one process per role (game-facing local
//! store or remote aggregation store), wired from configuration.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use player_relay::{
    config::{AppConfig, Role},
    dao::{
        document_store::{
            DocumentStore,
            json_file::{JsonFileConfig, JsonFileStore},
        },
        remote_store::{HttpRemoteStore, RemoteConfig, RemoteStore},
    },
    routes,
    services::{remote_supervisor, render::SvgChartRenderer},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    info!(role = config.role.as_str(), data_file = %config.data_file.display(), "starting player relay");

    let backend: Arc<dyn DocumentStore> =
        Arc::new(JsonFileStore::new(JsonFileConfig::new(config.data_file.clone())));
    let remote = build_remote(&config)?;

    let port = config.port;
    let app_state = AppState::new(config, backend, remote.clone(), Arc::new(SvgChartRenderer));
    app_state
        .store()
        .initialize()
        .await
        .context("initializing record store")?;

    if let Some(remote) = remote {
        tokio::spawn(remote_supervisor::run(app_state.clone(), remote));
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// HTTP client for the remote role, only built on the local role.
fn build_remote(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn RemoteStore>>> {
    if config.role != Role::Local {
        return Ok(None);
    }
    let Some(url) = config.remote_url.clone() else {
        warn!("no remote_url configured; transfers will be refused");
        return Ok(None);
    };

    let store = HttpRemoteStore::new(RemoteConfig::new(url, config.transfer_timeout))
        .context("building remote store client")?;
    Ok(Some(Arc::new(store)))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
