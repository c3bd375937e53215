//! Router and listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use balance_config::Config;
use balance_core::{AdapterOptions, ApplianceConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::StartupError;
use crate::handlers;

/// Immutable per-process state shared by every request.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub options: AdapterOptions,
    pub appliance: ApplianceConfig,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            options: config.to_options(),
            appliance: config.to_appliance_config(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Every route, with and without a trailing slash.
pub fn router(state: AppState) -> Router {
    let rule = get(handlers::rule::get_rule).put(handlers::rule::put_rule);
    let backend = get(handlers::backend::get_backend)
        .post(handlers::backend::link)
        .delete(handlers::backend::unlink);
    let server = any(handlers::not_implemented);
    let f5_rule = get(handlers::f5::get_rule)
        .post(handlers::not_implemented)
        .delete(handlers::not_implemented);

    Router::new()
        .route("/", get(handlers::root))
        .route("/v1/node/{host}/rule", rule.clone())
        .route("/v1/node/{host}/rule/", rule)
        .route("/v1/node/{host}/backend", backend.clone())
        .route("/v1/node/{host}/backend/", backend)
        .route("/v1/node/{host}/server", server.clone())
        .route("/v1/node/{host}/server/", server)
        .route("/v1/f5/node/{host}/rule", f5_rule.clone())
        .route("/v1/f5/node/{host}/rule/", f5_rule)
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), StartupError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    info!(
        %addr,
        dry_run = state.options.dry_run,
        hide_passwords = state.options.hide_passwords,
        scheme = %state.appliance.scheme,
        "serving HTTP"
    );
    serve_on(listener, state).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), StartupError> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    } else {
        // No signal handler available: run until killed.
        std::future::pending::<()>().await;
    }
}
