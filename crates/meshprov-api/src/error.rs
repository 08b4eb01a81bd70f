use thiserror::Error;

/// Top-level error type for the `meshprov-api` crate.
///
/// Login failures of any kind collapse into [`Error::Authentication`];
/// failures of a configuration object call collapse into [`Error::Command`].
/// `meshprov-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed, the token was missing, or the controller rejected it (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Configuration objects ───────────────────────────────────────
    /// A `/configuration/object/<operation>` call did not succeed.
    ///
    /// `status` is `None` when no HTTP response was received at all
    /// (connection failure or timeout); `body` then carries the reason.
    #[error("{operation} failed ({}): {}", status_label(.status), preview(.body))]
    Command {
        operation: String,
        status: Option<u16>,
        body: String,
        timed_out: bool,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

#[allow(clippy::ref_option)]
fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".into(), |s| format!("HTTP {s}"))
}

pub(crate) fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

impl Error {
    /// Returns `true` if the controller rejected our credentials or token.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if no response was received (transport failure or timeout).
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Command { status, .. } => status.is_none(),
            _ => false,
        }
    }

    /// Returns `true` if the request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Command { timed_out, .. } => *timed_out,
            _ => false,
        }
    }

    /// The controller operation this error belongs to, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Command { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// The HTTP status returned by the controller, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Command { status, .. } => *status,
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display_includes_status_and_body() {
        let err = Error::Command {
            operation: "ap_prov".into(),
            status: Some(500),
            body: "{\"_global_result\":{\"status\":1}}".into(),
            timed_out: false,
        };
        let text = err.to_string();
        assert!(text.starts_with("ap_prov failed (HTTP 500)"), "{text}");
        assert!(text.contains("_global_result"));
        assert!(!err.is_network());
    }

    #[test]
    fn command_error_without_status_is_network() {
        let err = Error::Command {
            operation: "read_bootinfo".into(),
            status: None,
            body: "request timed out after 30s".into(),
            timed_out: true,
        };
        assert!(err.is_network());
        assert!(err.is_timeout());
        assert_eq!(err.operation(), Some("read_bootinfo"));
        assert!(err.to_string().contains("no response"));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), 200);
    }
}
