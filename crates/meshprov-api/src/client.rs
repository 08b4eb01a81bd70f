// Controller HTTP client
//
// Wraps `reqwest::Client` with controller URL construction and response
// classification. Login/logout live in `session.rs`, the individual
// configuration objects in `commands.rs`; this module only deals with
// transport mechanics.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Session;
use crate::error::Error;
use crate::models::{CommandResponse, ObjectEndpoint};
use crate::transport::TransportConfig;

/// HTTP client for one mobility controller.
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    config_path: String,
    timeout: Duration,
}

impl ControllerClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is always attached: the controller pairs the token
    /// with a session cookie set at login. `base_url` is the API root
    /// (e.g. `https://mm.example.net:4343/v1`); `config_path` is the raw
    /// query fragment selecting the configuration node.
    pub fn new(
        base_url: Url,
        config_path: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            config_path: config_path.into(),
            timeout: config.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, config_path: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            config_path: config_path.into(),
            timeout: TransportConfig::default().timeout,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    /// `{base}/{path}` without dropping a path prefix on the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}", path.trim_start_matches('/'))).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST a JSON body to `/configuration/object/<endpoint>` and classify the response.
    pub(crate) async fn post_object(
        &self,
        session: &Session,
        endpoint: ObjectEndpoint,
        body: &Value,
    ) -> Result<CommandResponse, Error> {
        let operation = endpoint.as_ref();
        let url = session.object_url(operation)?;

        // The URL carries the session token; log the object only.
        debug!(object = operation, "POST /configuration/object/{operation}");
        trace!(object = operation, body = %body, "request body");

        let resp = match self.http.post(url).json(body).send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.transport_failure(operation, &e)),
        };

        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("{operation}: session token rejected or expired (HTTP 401)"),
            });
        }

        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.transport_failure(operation, &e)),
        };

        if !status.is_success() {
            return Err(Error::Command {
                operation: operation.into(),
                status: Some(status.as_u16()),
                body: text,
                timed_out: false,
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| Error::Command {
            operation: operation.into(),
            status: Some(status.as_u16()),
            body: format!("malformed JSON ({e}): {text}"),
            timed_out: false,
        })?;

        trace!(object = operation, status = status.as_u16(), "response received");

        Ok(CommandResponse {
            operation: endpoint,
            status: status.as_u16(),
            body,
        })
    }

    fn transport_failure(&self, operation: &str, err: &reqwest::Error) -> Error {
        let timed_out = err.is_timeout();
        let reason = if timed_out {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else {
            err.to_string()
        };
        Error::Command {
            operation: operation.into(),
            status: None,
            body: reason,
            timed_out,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_preserves_prefix() {
        let client = ControllerClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://mm.example.net:4343/v1/").unwrap(),
            "",
        );
        assert_eq!(
            client.api_url("/api/login").unwrap().as_str(),
            "https://mm.example.net:4343/v1/api/login"
        );
    }
}
