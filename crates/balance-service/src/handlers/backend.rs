//! `/v1/node/{host}/backend/`: server-centric view plus single-server
//! link and unlink.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use balance_core::{
    Backend, BackendChange, CoreError, fetch, link_backend, unlink_backend, validate_link,
    validate_unlink,
};
use tracing::info;

use crate::auth::require_credentials;
use crate::error::ServiceError;
use crate::format::{RenderQuery, decode, render, request_format, response_format};
use crate::server::SharedState;
use crate::session::A10Session;

#[derive(Debug, Clone, Copy)]
enum Change {
    Link,
    Unlink,
}

pub async fn get_backend(
    State(state): State<SharedState>,
    Path(host): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let credentials = require_credentials(&headers, &host)?;
    let format = response_format(&headers, &query);
    info!(host = %host, user = %credentials.username, "get backend");

    let session = A10Session::open(&state, &host, &credentials).await?;
    let inventory = fetch(session.appliance()).await;
    session.close().await;

    let view = inventory
        .map_err(|e| ServiceError::from_core(&host, e))?
        .backend_view();
    render(format, &view)
}

pub async fn link(
    state: State<SharedState>,
    host: Path<String>,
    query: Query<RenderQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServiceError> {
    change(Change::Link, state, host, query, &headers, &body).await
}

pub async fn unlink(
    state: State<SharedState>,
    host: Path<String>,
    query: Query<RenderQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServiceError> {
    change(Change::Unlink, state, host, query, &headers, &body).await
}

async fn change(
    kind: Change,
    State(state): State<SharedState>,
    Path(host): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ServiceError> {
    let credentials = require_credentials(headers, &host)?;
    let backend: Backend = decode(request_format(headers), body)?;
    match kind {
        Change::Link => validate_link(&backend),
        Change::Unlink => validate_unlink(&backend),
    }
    .map_err(|e| ServiceError::from_core(&host, e))?;
    let format = response_format(headers, &query);
    info!(
        host = %host,
        user = %credentials.username,
        backend = %backend.backend_name,
        change = ?kind,
        "backend change"
    );

    let session = A10Session::open(&state, &host, &credentials).await?;
    let task = tokio::spawn(async move {
        let result: Result<BackendChange, CoreError> = match kind {
            Change::Link => link_backend(session.appliance(), &backend).await,
            Change::Unlink => unlink_backend(session.appliance(), &backend).await,
        };
        session.close().await;
        result
    });
    let outcome = task
        .await
        .map_err(|e| ServiceError::Internal(format!("backend task: {e}")))?
        .map_err(|e| ServiceError::from_core(&host, e))?;

    render(format, &outcome)
}
