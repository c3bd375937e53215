//! `/v1/node/{host}/rule`: the virtual-server view and its reconciliation.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use balance_core::{AdapterOptions, ReconcileReport, Reconciler, VirtualServer, fetch};
use tracing::info;

use super::RECONCILE_ERRORS;
use crate::auth::require_credentials;
use crate::error::ServiceError;
use crate::format::{RenderQuery, decode, render, request_format, response_format};
use crate::server::SharedState;
use crate::session::A10Session;

pub async fn get_rule(
    State(state): State<SharedState>,
    Path(host): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let credentials = require_credentials(&headers, &host)?;
    let format = response_format(&headers, &query);
    info!(host = %host, user = %credentials.username, "get rule");

    let session = A10Session::open(&state, &host, &credentials).await?;
    let inventory = fetch(session.appliance()).await;
    session.close().await;

    let view = inventory
        .map_err(|e| ServiceError::from_core(&host, e))?
        .virtual_view();
    render(format, &view)
}

pub async fn put_rule(
    State(state): State<SharedState>,
    Path(host): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let credentials = require_credentials(&headers, &host)?;
    let desired: Vec<VirtualServer> = decode(request_format(&headers), &body)?;
    let format = response_format(&headers, &query);
    info!(host = %host, user = %credentials.username, rules = desired.len(), "put rule");

    let session = A10Session::open(&state, &host, &credentials).await?;
    let options = state.options;

    // Detached so a client disconnect cannot stop a half-applied change.
    let task = tokio::spawn(async move {
        let result = apply_rules(&session, options, &desired).await;
        session.close().await;
        result
    });
    let (report, after) = task
        .await
        .map_err(|e| ServiceError::Internal(format!("reconcile task: {e}")))??;

    let mut response = render(format, &after)?;
    response.headers_mut().insert(
        HeaderName::from_static(RECONCILE_ERRORS),
        HeaderValue::from(report.error_count()),
    );
    Ok(response)
}

/// Fetch, reconcile toward `desired`, fetch again.
async fn apply_rules(
    session: &A10Session,
    options: AdapterOptions,
    desired: &[VirtualServer],
) -> Result<(ReconcileReport, Vec<VirtualServer>), ServiceError> {
    let host = session.host();
    let before = fetch(session.appliance())
        .await
        .map_err(|e| ServiceError::from_core(host, e))?
        .virtual_view();

    let report = Reconciler::new(session.appliance(), options)
        .reconcile(&before, desired)
        .await;
    info!(
        host,
        mutations = report.outcomes.len(),
        errors = report.error_count(),
        dry_run = options.dry_run,
        "rule reconciled"
    );

    let after = fetch(session.appliance())
        .await
        .map_err(|e| ServiceError::from_core(host, e))?
        .virtual_view();
    Ok((report, after))
}
