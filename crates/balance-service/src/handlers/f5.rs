//! `/v1/f5/node/{host}/rule`: read-only F5 LTM inventory.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use balance_api::F5Client;
use balance_core::f5_inventory;
use tracing::info;

use crate::auth::require_credentials;
use crate::error::ServiceError;
use crate::format::{RenderQuery, render, response_format};
use crate::server::SharedState;
use crate::session::client_error;

pub async fn get_rule(
    State(state): State<SharedState>,
    Path(host): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let credentials = require_credentials(&headers, &host)?;
    let format = response_format(&headers, &query);
    info!(host = %host, user = %credentials.username, "get f5 rule");

    let client = F5Client::for_host(
        &state.appliance.scheme,
        &host,
        credentials.username.clone(),
        credentials.password.clone(),
        &state.appliance.transport(),
    )
    .map_err(|e| client_error(&host, &e))?;

    let inventory = f5_inventory(&client, &credentials.username)
        .await
        .map_err(|e| ServiceError::from_core(&host, e))?;
    render(format, &inventory)
}
