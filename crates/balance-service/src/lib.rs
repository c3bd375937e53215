// balance-service: axum front end that forwards caller credentials to A10
// and F5 appliances and serves/reconciles their load-balancing topology.

pub mod auth;
pub mod error;
pub mod format;
pub mod handlers;
pub mod server;
pub mod session;

pub use error::{ServiceError, StartupError};
pub use server::{AppState, SharedState, router, serve, serve_on};
