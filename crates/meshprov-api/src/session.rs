// Session login/logout
//
// The controller hands out a `UIDARUBA` token in the login response body.
// Every later call carries it in the query string; logout invalidates it
// on the controller side.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::auth::{Credentials, Session};
use crate::client::ControllerClient;
use crate::error::{Error, preview};
use crate::models::Envelope;

impl ControllerClient {
    /// Authenticate and obtain a session token.
    ///
    /// `POST {base}/api/login` with a form-encoded `username`/`password`.
    /// Every failure mode (transport, non-2xx, unparseable body, missing
    /// `_global_result.UIDARUBA`) is reported as [`Error::Authentication`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, Error> {
        let url = self.api_url("/api/login")?;

        debug!("logging in at {}", url);

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
        ];

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read login response: {e}"),
        })?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| Error::Authentication {
            message: format!("unparseable login response: {e}"),
        })?;

        let token = envelope
            .global_result
            .and_then(|g| g.uidaruba)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "login response did not contain a UIDARUBA token".into(),
            })?;

        info!(user = %credentials.username, "logged in to controller");
        Ok(Session::new(
            self.base_url().clone(),
            self.config_path(),
            SecretString::from(token),
        ))
    }

    /// End the session.
    ///
    /// Returns the controller's `status_str` (or the HTTP status when the
    /// body has none). Takes the session by value: a token is never used
    /// again after logout.
    pub async fn logout(&self, session: Session) -> Result<String, Error> {
        let url = session.logout_url()?;

        debug!("logging out");

        let resp = self.http().post(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("logout failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let message = envelope
            .global_result
            .and_then(|g| g.status_str)
            .unwrap_or_else(|| status.to_string());

        debug!("logout complete: {message}");
        Ok(message)
    }
}
