use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Controller login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// An authenticated controller session.
///
/// Produced by [`ControllerClient::login`](crate::ControllerClient::login)
/// and consumed by [`ControllerClient::logout`](crate::ControllerClient::logout).
/// The controller identifies the session by the `UIDARUBA` token carried
/// in the query string of every configuration call, so the token is kept
/// secret and only exposed while building a request URL.
#[derive(Debug)]
pub struct Session {
    base_url: Url,
    config_path: String,
    token: SecretString,
}

impl Session {
    /// Build a session from an already-issued token.
    ///
    /// Normal callers get a `Session` from `login`; this exists for
    /// tests and for tooling that receives a token out of band.
    pub fn new(base_url: Url, config_path: impl Into<String>, token: SecretString) -> Self {
        Self {
            base_url,
            config_path: config_path.into(),
            token,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Raw query fragment selecting the configuration node (e.g. `config_path=%2Fmd`).
    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// `{base}/configuration/object/{object}?{config_path}&UIDARUBA={token}`
    ///
    /// Built by concatenation so a path prefix on the base URL survives.
    pub(crate) fn object_url(&self, object: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let token = self.token.expose_secret();
        let full = if self.config_path.is_empty() {
            format!("{base}/configuration/object/{object}?UIDARUBA={token}")
        } else {
            format!(
                "{base}/configuration/object/{object}?{}&UIDARUBA={token}",
                self.config_path
            )
        };
        Url::parse(&full)
    }

    /// `{base}/api/logout?UIDARUBA={token}`
    pub(crate) fn logout_url(&self) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!(
            "{base}/api/logout?UIDARUBA={}",
            self.token.expose_secret()
        ))
    }
}
