//! Configuration for the balance adapter service.
//!
//! Layered loading (serialized defaults, TOML file, `BALANCE_*` environment,
//! legacy `LISTEN`/`SHOW_PASSWORDS`/`NO_DRY` variables, command-line
//! overrides) and translation to `balance_core::{AdapterOptions,
//! ApplianceConfig}`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use balance_core::{AdapterOptions, ApplianceConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Listen address, `host:port` or `:port`.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Log passwords in clear text.
    #[serde(default)]
    pub show_passwords: bool,

    /// Log mutations instead of sending them.
    #[serde(default = "default_true")]
    pub dry_run: bool,

    /// Verbose request/response logging.
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub appliance: ApplianceSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            show_passwords: false,
            dry_run: true,
            debug: false,
            log_format: LogFormat::default(),
            appliance: ApplianceSection::default(),
        }
    }
}

/// `[appliance]`: how outbound appliance connections are made.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplianceSection {
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Accept self-signed appliance certificates.
    #[serde(default = "default_true")]
    pub insecure: bool,

    /// Path to a PEM CA certificate; takes precedence over `insecure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApplianceSection {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            insecure: true,
            ca_cert: None,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_true() -> bool {
    true
}
fn default_scheme() -> String {
    "https".into()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_read_timeout() -> u64 {
    10
}
fn default_timeout() -> u64 {
    15
}

// ── Override layers ─────────────────────────────────────────────────

/// Pre-`BALANCE_*` environment variables, still honored.
///
/// `LISTEN` sets the listen address; a non-empty `SHOW_PASSWORDS` shows
/// passwords; a non-empty `NO_DRY` disables dry run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LegacyEnv {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_passwords: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl LegacyEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            listen: set("LISTEN"),
            show_passwords: set("SHOW_PASSWORDS").map(|_| true),
            dry_run: set("NO_DRY").map(|_| false),
        }
    }
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "balance").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("balance");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered provider stack. A missing file contributes nothing.
pub fn figment(path: &Path, legacy: &LegacyEnv, overrides: &ConfigOverrides) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BALANCE_").split("__"))
        .merge(Serialized::defaults(legacy))
        .merge(Serialized::defaults(overrides))
}

/// Load and validate the configuration. `path` overrides the default
/// config file location.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    let default_path = config_path();
    let path = path.unwrap_or(&default_path);
    load_with(path, &LegacyEnv::from_env(), overrides)
}

pub fn load_with(
    path: &Path,
    legacy: &LegacyEnv,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let config: Config = figment(path, legacy, overrides).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Validation & translation ────────────────────────────────────────

impl Config {
    /// Listen socket address; `:8080` binds every interface.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.listen.trim();
        let full = if raw.starts_with(':') {
            format!("0.0.0.0{raw}")
        } else {
            raw.to_owned()
        };
        full.parse().map_err(|_| ConfigError::Validation {
            field: "listen".into(),
            reason: format!("expected host:port or :port, got '{}'", self.listen),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        match self.appliance.scheme.as_str() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Validation {
                    field: "appliance.scheme".into(),
                    reason: format!("expected 'http' or 'https', got '{other}'"),
                });
            }
        }
        if self.appliance.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "appliance.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn to_options(&self) -> AdapterOptions {
        AdapterOptions {
            hide_passwords: !self.show_passwords,
            dry_run: self.dry_run,
            debug: self.debug,
        }
    }

    pub fn to_appliance_config(&self) -> ApplianceConfig {
        let a = &self.appliance;
        let tls = if let Some(ref ca) = a.ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else if a.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        };
        ApplianceConfig {
            scheme: a.scheme.clone(),
            tls,
            connect_timeout: Duration::from_secs(a.connect_timeout_secs),
            read_timeout: Duration::from_secs(a.read_timeout_secs),
            timeout: Duration::from_secs(a.timeout_secs),
        }
    }

    /// Effective configuration as TOML.
    pub fn render_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn no_file() -> PathBuf {
        PathBuf::from("/nonexistent/balance/config.toml")
    }

    #[test]
    fn defaults_apply_without_file() {
        let cfg = load_with(&no_file(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.dry_run);
        assert!(cfg.to_options().hide_passwords);
        assert_eq!(cfg.to_appliance_config(), ApplianceConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
listen = ":9090"
dry_run = false
log_format = "json"

[appliance]
scheme = "http"
insecure = false
timeout_secs = 30
"#,
        );
        let cfg = load_with(file.path(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.listen_addr().unwrap(), "0.0.0.0:9090".parse().unwrap());
        assert!(!cfg.dry_run);
        assert_eq!(cfg.log_format, LogFormat::Json);

        let appliance = cfg.to_appliance_config();
        assert_eq!(appliance.scheme, "http");
        assert_eq!(appliance.tls, TlsVerification::SystemDefaults);
        assert_eq!(appliance.timeout, Duration::from_secs(30));
        assert_eq!(appliance.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn legacy_env_overrides_file() {
        let file = write_config("listen = \":9090\"\n");
        let legacy = LegacyEnv::from_lookup(|key| match key {
            "LISTEN" => Some(":7070".into()),
            "NO_DRY" => Some("1".into()),
            "SHOW_PASSWORDS" => Some(String::new()),
            _ => None,
        });
        let cfg = load_with(file.path(), &legacy, &ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.listen, ":7070");
        assert!(!cfg.dry_run);
        // empty value does not count as set
        assert!(!cfg.show_passwords);
    }

    #[test]
    fn overrides_win_over_everything() {
        let legacy = LegacyEnv {
            listen: Some(":7070".into()),
            ..LegacyEnv::default()
        };
        let overrides = ConfigOverrides {
            listen: Some("127.0.0.1:6060".into()),
            debug: Some(true),
            ..ConfigOverrides::default()
        };
        let cfg = load_with(&no_file(), &legacy, &overrides).unwrap();
        assert_eq!(cfg.listen, "127.0.0.1:6060");
        assert!(cfg.debug);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = write_config("listen = \"nonsense\"\n");
        let err = load_with(file.path(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "listen"));

        let file = write_config("[appliance]\nscheme = \"ftp\"\n");
        let err = load_with(file.path(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn ca_cert_takes_precedence_over_insecure() {
        let file = write_config("[appliance]\nca_cert = \"/etc/balance/ca.pem\"\n");
        let cfg = load_with(file.path(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap();
        assert_eq!(
            cfg.to_appliance_config().tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/balance/ca.pem"))
        );
    }

    #[test]
    fn rendered_toml_loads_back() {
        let cfg = Config {
            debug: true,
            ..Config::default()
        };
        let rendered = cfg.render_toml().unwrap();
        assert!(rendered.contains("[appliance]"));

        let file = write_config(&rendered);
        let loaded = load_with(file.path(), &LegacyEnv::default(), &ConfigOverrides::default()).unwrap();
        assert_eq!(loaded, cfg);
    }
}
