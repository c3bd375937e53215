//! Per-request appliance sessions.
//!
//! Each request logs in with the caller's credentials, does its work and
//! logs out. A failed logout is only logged.

use balance_api::{A10Client, Error as ApiError};
use balance_core::{Appliance, CoreError, Credentials, DryRun};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::server::AppState;

/// Client construction failures: an unusable host is the caller's fault.
pub(crate) fn client_error(host: &str, err: &ApiError) -> ServiceError {
    match err {
        ApiError::InvalidUrl(e) => ServiceError::BadRequest(format!("invalid host '{host}': {e}")),
        other => ServiceError::from_core(host, CoreError::gateway("client setup", other)),
    }
}

/// A logged-in A10 session, wrapped in `DryRun` unless mutations are enabled.
pub struct A10Session {
    host: String,
    appliance: Box<dyn Appliance>,
}

impl A10Session {
    pub async fn open(state: &AppState, host: &str, credentials: &Credentials) -> Result<Self, ServiceError> {
        let client = A10Client::for_host(&state.appliance.scheme, host, &state.appliance.transport())
            .map_err(|e| client_error(host, &e))?;
        let appliance: Box<dyn Appliance> = if state.options.dry_run {
            Box::new(DryRun::new(client))
        } else {
            Box::new(client)
        };

        info!(
            host,
            user = %credentials.username,
            password = state.options.redact(credentials.password.expose_secret()),
            dry_run = state.options.dry_run,
            "a10 login"
        );
        if let Err(e) = appliance
            .login(&credentials.username, &credentials.password)
            .await
        {
            warn!(host, user = %credentials.username, error = %e, "a10 login failed");
            return Err(ServiceError::from_core(host, CoreError::gateway("login", &e)));
        }

        Ok(Self {
            host: host.to_owned(),
            appliance,
        })
    }

    pub fn appliance(&self) -> &dyn Appliance {
        self.appliance.as_ref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub async fn close(self) {
        if let Err(e) = self.appliance.logout().await {
            warn!(host = %self.host, error = %e, "a10 session close failed");
        }
    }
}
