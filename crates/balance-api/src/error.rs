use thiserror::Error;

/// Top-level error type for the `balance-api` crate.
///
/// Covers every failure mode of the appliance clients: authentication,
/// transport, A10 axAPI failures and F5 iControl failures.
/// `balance-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A session-scoped call was made before `login()` succeeded.
    #[error("No appliance session -- login required")]
    NotLoggedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── A10 axAPI ───────────────────────────────────────────────────
    /// Failure reported inside the axAPI `{"response": {"status": "fail"}}` envelope.
    #[error("axAPI error {code}: {message}")]
    Axapi { code: i64, message: String },

    /// Non-success HTTP status from the axAPI endpoint.
    #[error("axAPI HTTP {status}: {message}")]
    AxapiHttp { status: u16, message: String },

    // ── F5 iControl ────────────────────────────────────────────────
    /// Non-success response from iControl REST.
    #[error("iControl error (HTTP {status}): {message}")]
    IControl { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the appliance rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::NotLoggedIn => true,
            Self::AxapiHttp { status, .. } | Self::IControl { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the underlying request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn body_preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
