// F5 iControl REST client
//
// Stateless Basic-auth client: every request carries the caller's
// credentials, there is no session to open or close.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, body_preview};
use crate::f5::models::{F5Collection, F5Node, F5Pool, F5Virtual};
use crate::transport::TransportConfig;

/// Read-only client for the BIG-IP LTM REST API.
pub struct F5Client {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl F5Client {
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client for `host` reached over `scheme`.
    pub fn for_host(
        scheme: &str,
        host: &str,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("{scheme}://{host}/"))?;
        Self::new(base_url, username, password, transport)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── LTM collections ──────────────────────────────────────────────

    /// `GET /mgmt/tm/ltm/virtual`
    pub async fn list_virtuals(&self) -> Result<Vec<F5Virtual>, Error> {
        self.get_items("mgmt/tm/ltm/virtual").await
    }

    /// `GET /mgmt/tm/ltm/pool?expandSubcollections=true`
    pub async fn list_pools(&self) -> Result<Vec<F5Pool>, Error> {
        self.get_items("mgmt/tm/ltm/pool?expandSubcollections=true")
            .await
    }

    /// `GET /mgmt/tm/ltm/node`
    pub async fn list_nodes(&self) -> Result<Vec<F5Node>, Error> {
        self.get_items("mgmt/tm/ltm/node").await
    }

    // ── Request helper ───────────────────────────────────────────────

    async fn get_items<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let url = self.base_url.join(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::IControl {
                status: status.as_u16(),
                message: body_preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let collection: F5Collection<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", body_preview(&body)),
                body: body.clone(),
            })?;
        Ok(collection.items)
    }
}
