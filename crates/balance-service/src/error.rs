//! Service error types.
//!
//! `ServiceError` is what handlers return; `IntoResponse` picks the HTTP
//! status. `StartupError` covers the binary before the listener is up and is
//! rendered with miette.

use std::net::SocketAddr;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use balance_config::ConfigError;
use balance_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;
use tracing::warn;

// ── Request errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed body, missing field or unusable path parameter.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed Basic credentials.
    #[error("not authorized")]
    Unauthorized { realm: String },

    /// Login, fetch or a required mutation failed at the appliance.
    #[error("{host} bad gateway: {reason}")]
    BadGateway { host: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{0} not implemented")]
    NotImplemented(String),
}

impl ServiceError {
    /// Map a core failure against `host` onto its HTTP category.
    pub fn from_core(host: &str, err: CoreError) -> Self {
        if err.is_gateway() {
            Self::BadGateway {
                host: host.to_owned(),
                reason: err.to_string(),
            }
        } else {
            Self::BadRequest(err.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }

        let mut response = (status, format!("{self}\n")).into_response();
        if let Self::Unauthorized { realm } = &self {
            if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

// ── Startup errors ──────────────────────────────────────────────────

#[derive(Debug, Error, Diagnostic)]
pub enum StartupError {
    #[error("Configuration error")]
    #[diagnostic(
        code(balance::config),
        help("Check the config file, BALANCE_* variables and command-line flags.")
    )]
    Config(#[from] ConfigError),

    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(balance::bind),
        help("Pick a free port with --listen or the LISTEN variable.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server stopped: {0}")]
    #[diagnostic(code(balance::serve))]
    Serve(#[source] std::io::Error),
}
