// ── Runtime adapter configuration ──
//
// These types describe how the adapter behaves and how it reaches an
// appliance. They never touch disk: `balance-config` loads files and
// environment and hands these values in.

use std::path::PathBuf;
use std::time::Duration;

use balance_api::{TlsMode, TransportConfig};
use secrecy::SecretString;

/// Placeholder logged in place of a password.
pub const HIDDEN_PASSWORD: &str = "<pwd-hidden>";

/// Behaviour switches threaded through reconciler, backend operations and
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Log passwords as `<pwd-hidden>`.
    pub hide_passwords: bool,
    /// Log and record mutations instead of sending them.
    pub dry_run: bool,
    /// Log every payload the reconciler pushes.
    pub debug: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            hide_passwords: true,
            dry_run: true,
            debug: false,
        }
    }
}

impl AdapterOptions {
    /// Password as it may appear in logs.
    pub fn redact<'a>(&self, password: &'a str) -> &'a str {
        if self.hide_passwords {
            HIDDEN_PASSWORD
        } else {
            password
        }
    }
}

/// TLS verification strategy for appliance connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Appliances ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// How to reach appliances. One value serves every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceConfig {
    /// URL scheme (`https`, or `http` for lab setups and tests).
    pub scheme: String,
    pub tls: TlsVerification,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Overall per-request timeout.
    pub timeout: Duration,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            scheme: "https".into(),
            tls: TlsVerification::default(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(15),
        }
    }
}

impl ApplianceConfig {
    /// Transport settings for the API clients.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            timeout: self.timeout,
        }
    }
}

/// Caller-supplied appliance credentials (forwarded Basic auth).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}
