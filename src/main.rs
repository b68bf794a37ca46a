mod api;
mod auth;
mod config;
mod engine;
mod error;
mod geo;
mod location;
mod models;
mod observability;
mod route;
mod session;
mod state;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::auth::{AccessPolicy, AllowListPolicy, IdentityProvider, SharedSecretProvider};
use crate::engine::transition::TransitionPolicy;
use crate::location::{FixedPositionSource, PositionSource, UnavailablePositionSource};
use crate::store::{MemoryOrderStore, OrderStore};

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
    let access_policy: Arc<dyn AccessPolicy> =
        Arc::new(AllowListPolicy::single(config.authorized_email.clone()));
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(SharedSecretProvider::new(config.driver_secret.clone()));

    let transition_policy = if config.allow_free_transitions {
        TransitionPolicy::free_form()
    } else {
        TransitionPolicy::standard()
    };

    let shared_state = Arc::new(state::AppState::new(
        store,
        config.status_vocabulary,
        transition_policy,
        access_policy,
        identity,
        config.event_buffer_size,
    ));

    let source: Arc<dyn PositionSource> = match config.driver_position {
        Some(position) => Arc::new(FixedPositionSource::new(position)),
        None => Arc::new(UnavailablePositionSource),
    };

    tokio::spawn(session::run_session_engine(
        shared_state.clone(),
        source,
        config.acquire_options(),
    ));

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
