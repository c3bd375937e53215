//! HTTP handlers, one module per resource.

pub mod backend;
pub mod f5;
pub mod rule;

use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use tracing::info;

use crate::error::ServiceError;

/// Response header carrying the number of failed reconcile mutations.
pub const RECONCILE_ERRORS: &str = "x-reconcile-errors";

#[allow(clippy::unused_async)]
pub async fn root(method: Method, uri: Uri) -> impl IntoResponse {
    info!(%method, path = uri.path(), "root");
    format!(
        "balance {}: nothing to see here: [{}]\n",
        env!("CARGO_PKG_VERSION"),
        uri.path()
    )
}

#[allow(clippy::unused_async)]
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    info!(%method, path = uri.path(), "not found");
    (StatusCode::NOT_FOUND, format!("not found: [{}]\n", uri.path()))
}

#[allow(clippy::unused_async)]
pub async fn not_implemented(method: Method, uri: Uri) -> ServiceError {
    ServiceError::NotImplemented(format!("{method} {}", uri.path()))
}
