// ── Core error types ──
//
// User-facing errors from meshprov-core. The `From<meshprov_api::Error>`
// impl sorts transport-layer failures into authentication, command and
// network errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Controller operations ────────────────────────────────────────
    #[error("Controller rejected {operation}{}: {message}", status_suffix(.status))]
    Command {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {reason}")]
    Network { reason: String },

    // ── Inventory ────────────────────────────────────────────────────
    #[error("Inventory line {line}: {reason}")]
    Inventory { line: u64, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CoreError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<meshprov_api::Error> for CoreError {
    fn from(err: meshprov_api::Error) -> Self {
        match err {
            meshprov_api::Error::Authentication { message } => {
                CoreError::Authentication { message }
            }
            meshprov_api::Error::Command {
                operation,
                status: None,
                body,
                ..
            } => CoreError::Network {
                reason: format!("{operation}: {body}"),
            },
            meshprov_api::Error::Command {
                operation,
                status,
                body,
                ..
            } => CoreError::Command {
                operation,
                status,
                message: body,
            },
            meshprov_api::Error::Transport(e) => CoreError::Network {
                reason: e.to_string(),
            },
            meshprov_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            meshprov_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
            },
            meshprov_api::Error::Deserialization { message, body: _ } => CoreError::Command {
                operation: "response".into(),
                status: None,
                message: format!("Deserialization error: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_without_status_maps_to_network() {
        let err: CoreError = meshprov_api::Error::Command {
            operation: "read_bootinfo".into(),
            status: None,
            body: "request timed out after 30s".into(),
            timed_out: true,
        }
        .into();
        match err {
            CoreError::Network { reason } => {
                assert!(reason.starts_with("read_bootinfo:"));
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[test]
    fn command_with_status_keeps_operation() {
        let err: CoreError = meshprov_api::Error::Command {
            operation: "ap_prov".into(),
            status: Some(500),
            body: "boom".into(),
            timed_out: false,
        }
        .into();
        assert_eq!(err.to_string(), "Controller rejected ap_prov (HTTP 500): boom");
    }

    #[test]
    fn authentication_is_preserved() {
        let err: CoreError = meshprov_api::Error::Authentication {
            message: "token expired".into(),
        }
        .into();
        assert!(err.is_authentication());
    }
}
