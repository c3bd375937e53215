// A10 axAPI v2.1 HTTP client
//
// Wraps `reqwest::Client` with axAPI URL construction (every call goes to a
// single endpoint selected by the `method` query parameter), session id
// handling, and status-envelope unwrapping. Endpoint families live in
// separate files as inherent methods.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::a10::models::AxapiStatus;
use crate::error::{Error, body_preview};
use crate::transport::TransportConfig;

/// Path of the axAPI v2.1 REST endpoint, relative to the appliance root.
const AXAPI_PATH: &str = "services/rest/v2.1/";

/// Raw HTTP client for an A10 ACOS appliance (axAPI v2.1).
///
/// One client serves one appliance session: `login()` stores the session
/// id, every `slb.*` call appends it, and `logout()` closes and forgets it.
pub struct A10Client {
    http: reqwest::Client,
    base_url: Url,
    session_id: RwLock<Option<String>>,
}

impl A10Client {
    /// Create a client for `base_url` (the appliance root, e.g.
    /// `https://10.0.0.5/`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client for `host` (`name` or `name:port`) reached over `scheme`.
    pub fn for_host(scheme: &str, host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("{scheme}://{host}/"))?;
        Self::new(base_url, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            session_id: RwLock::new(None),
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session id ────────────────────────────────────────────────────

    /// The current session id, if logged in.
    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_session_id(&self, id: Option<String>) {
        trace!(present = id.is_some(), "session id updated");
        *self
            .session_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = id;
    }

    fn require_session(&self) -> Result<String, Error> {
        self.session_id().ok_or(Error::NotLoggedIn)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/services/rest/v2.1/?format=json&method={method}[&session_id=..]`.
    pub(crate) fn method_url(&self, method: &str, session: Option<&str>) -> Result<Url, Error> {
        let mut url = self.base_url.join(AXAPI_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            query.append_pair("method", method);
            if let Some(id) = session {
                query.append_pair("session_id", id);
            }
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Session-scoped GET, decoding the body into `T`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, method: &str) -> Result<T, Error> {
        let session = self.require_session()?;
        let url = self.method_url(method, Some(&session))?;
        debug!("GET {}", redact_session(&url));

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = Self::read_body(resp).await?;
        Self::check_status(&body)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", body_preview(&body)),
            body,
        })
    }

    /// Session-scoped POST of a JSON body, expecting a status envelope.
    pub(crate) async fn post(&self, method: &str, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        let session = self.require_session()?;
        let url = self.method_url(method, Some(&session))?;
        debug!("POST {}", redact_session(&url));

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let body = Self::read_body(resp).await?;
        Self::check_status(&body)
    }

    /// Return the body text of a successful HTTP response.
    pub(crate) async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::AxapiHttp {
                status: status.as_u16(),
                message: body_preview(&body).to_owned(),
            });
        }

        resp.text().await.map_err(Error::Transport)
    }

    /// axAPI reports failures with HTTP 200 and a `fail` status envelope.
    /// Bodies that are not a status envelope (list payloads) pass through.
    pub(crate) fn check_status(body: &str) -> Result<(), Error> {
        let Ok(envelope) = serde_json::from_str::<AxapiStatus>(body) else {
            return Ok(());
        };
        if envelope.response.status.eq_ignore_ascii_case("fail") {
            let err = envelope.response.err;
            let code = err.as_ref().map_or(0, |e| e.code);
            let message = err
                .and_then(|e| e.msg)
                .unwrap_or_else(|| "unspecified failure".into());
            return Err(Error::Axapi { code, message });
        }
        Ok(())
    }
}

/// Render a URL for logging with the session id masked.
fn redact_session(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "session_id" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
