// A10 axAPI session lifecycle
//
// `authenticate` returns a session id that every later call carries in the
// `session_id` query parameter. `session.close` releases it on the appliance.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::a10::client::A10Client;
use crate::a10::models::AuthResponse;
use crate::error::{Error, body_preview};

impl A10Client {
    /// Open an appliance session.
    ///
    /// `POST ?method=authenticate` with `{"username", "password"}`; the
    /// returned `session_id` is stored on the client.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.method_url("authenticate", None)?;
        debug!(username, "logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body_preview(&body)),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        Self::check_status(&text).map_err(|e| Error::Authentication {
            message: e.to_string(),
        })?;

        let auth: AuthResponse = serde_json::from_str(&text).map_err(|_| Error::Authentication {
            message: format!("no session id in login response: {}", body_preview(&text)),
        })?;
        if auth.session_id.is_empty() {
            return Err(Error::Authentication {
                message: "empty session id in login response".into(),
            });
        }

        self.set_session_id(Some(auth.session_id));
        debug!("login successful");
        Ok(())
    }

    /// Close the current session. A client without a session is a no-op.
    ///
    /// The local session id is forgotten even when the appliance call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        let Some(session) = self.session_id() else {
            return Ok(());
        };
        self.set_session_id(None);

        let url = self.method_url("session.close", Some(&session))?;
        debug!("closing session");

        let resp = self
            .http()
            .post(url)
            .json(&json!({ "session_id": session }))
            .send()
            .await
            .map_err(Error::Transport)?;
        let body = Self::read_body(resp).await?;
        Self::check_status(&body)?;

        debug!("logout complete");
        Ok(())
    }
}
