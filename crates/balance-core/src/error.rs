// ── Core error types ──
//
// Domain errors from balance-core. Handlers map these onto HTTP statuses;
// the `From<balance_api::Error>` impl folds transport and wire failures into
// `Gateway` or `AuthenticationFailed`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Appliance errors ─────────────────────────────────────────────
    /// A fatal appliance call failed (login, list, or a required mutation).
    #[error("Appliance {operation} failed: {reason}")]
    Gateway { operation: String, reason: String },

    #[error("Appliance authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Service group not found: {name}")]
    ServiceGroupNotFound { name: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown protocol: {value}")]
    UnknownProtocol { value: String },
}

impl CoreError {
    /// Wrap an API error as a gateway failure of `operation`.
    pub fn gateway(operation: impl Into<String>, err: &balance_api::Error) -> Self {
        Self::Gateway {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::Validation {
            field: field.into(),
            reason: "missing".into(),
        }
    }

    /// Whether the failure originated at the appliance (maps to 502).
    pub fn is_gateway(&self) -> bool {
        matches!(
            self,
            Self::Gateway { .. } | Self::AuthenticationFailed { .. } | Self::ServiceGroupNotFound { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<balance_api::Error> for CoreError {
    fn from(err: balance_api::Error) -> Self {
        match err {
            balance_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            balance_api::Error::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "no appliance session".into(),
            },
            ref e @ balance_api::Error::Transport(_) => CoreError::Gateway {
                operation: if e.is_timeout() {
                    "request (timed out)".into()
                } else if e.is_transient() {
                    "request (unreachable)".into()
                } else {
                    "request".into()
                },
                reason: e.to_string(),
            },
            balance_api::Error::Axapi { code, message } => CoreError::Gateway {
                operation: "axAPI call".into(),
                reason: format!("code {code}: {message}"),
            },
            balance_api::Error::Deserialization { message, body: _ } => CoreError::Gateway {
                operation: "decode".into(),
                reason: message,
            },
            other @ (balance_api::Error::InvalidUrl(_)
            | balance_api::Error::Tls(_)
            | balance_api::Error::AxapiHttp { .. }
            | balance_api::Error::IControl { .. }) => CoreError::Gateway {
                operation: "request".into(),
                reason: other.to_string(),
            },
        }
    }
}
