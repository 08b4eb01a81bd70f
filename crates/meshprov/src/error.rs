//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use meshprov_config::ConfigError;
use meshprov_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const INVENTORY: i32 = 4;
    pub const STEP_FAILED: i32 = 5;
    pub const CONNECTION: i32 = 6;
    pub const CONFIG: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the controller: {reason}")]
    #[diagnostic(
        code(meshprov::connection_failed),
        help(
            "Check that the controller URL is right and reachable.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in the profile.\n\
             Slow controller? Raise --timeout."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(meshprov::auth_failed),
        help(
            "Verify the username and password for this controller.\n\
             Run: meshprov config set-password\n\
             A login that could not reach the controller is reported here too; check the URL."
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(meshprov::no_credentials),
        help(
            "Set username/password in the profile, export MESHPROV_USERNAME and \
             MESHPROV_PASSWORD, or run: meshprov config set-password --profile {profile}"
        )
    )]
    NoCredentials { profile: String, what: String },

    // ── Controller operations ────────────────────────────────────────
    #[error("Controller rejected {operation}: {message}")]
    #[diagnostic(code(meshprov::command_failed))]
    CommandFailed { operation: String, message: String },

    #[error("Provisioning failed for {failed} of {matched} AP(s)")]
    #[diagnostic(
        code(meshprov::provisioning_failed),
        help("See the step results above. Re-run with -v for request details.")
    )]
    ProvisioningFailed { failed: usize, matched: usize },

    // ── Inventory ────────────────────────────────────────────────────
    #[error("Inventory {path}, line {line}: {reason}")]
    #[diagnostic(
        code(meshprov::inventory),
        help("Each row needs: building, role, floor, MAC (12 hex digits), name")
    )]
    Inventory {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("Cannot read inventory {path}: {reason}")]
    #[diagnostic(
        code(meshprov::inventory_unreadable),
        help("Pass the file with --inventory (-i) or set MESHPROV_INVENTORY.")
    )]
    InventoryUnreadable { path: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(meshprov::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(meshprov::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(meshprov::no_config),
        help(
            "Add a profile to {path}\n\
             or pass --controller with MESHPROV_USERNAME and MESHPROV_PASSWORD."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(meshprov::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Provisioning reboots APs and requires confirmation")]
    #[diagnostic(
        code(meshprov::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(meshprov::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Inventory { .. } | Self::InventoryUnreadable { .. } => exit_code::INVENTORY,
            Self::CommandFailed { .. } | Self::ProvisioningFailed { .. } => exit_code::STEP_FAILED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }

    /// Attach the inventory path to an inventory-level core error.
    pub fn inventory(path: &std::path::Path, err: CoreError) -> Self {
        match err {
            CoreError::Inventory { line, reason } => Self::Inventory {
                path: path.display().to_string(),
                line,
                reason,
            },
            CoreError::Io(e) => Self::InventoryUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { message } => Self::AuthFailed { message },
            CoreError::Command {
                operation,
                status,
                message,
            } => Self::CommandFailed {
                operation: match status {
                    Some(code) => format!("{operation} (HTTP {code})"),
                    None => operation,
                },
                message,
            },
            CoreError::Network { reason } => Self::ConnectionFailed { reason },
            CoreError::Inventory { line, reason } => Self::Inventory {
                path: "inventory".into(),
                line,
                reason,
            },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Io(e) => Self::Io(e),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::NoCredentials { profile, what } => Self::NoCredentials {
                profile,
                what: what.into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other @ (ConfigError::Keyring(_)
            | ConfigError::Serialization(_)
            | ConfigError::Figment(_)) => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_class() {
        let auth: CliError = CoreError::Authentication {
            message: "no token".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let network: CliError = CoreError::Network {
            reason: "timed out".into(),
        }
        .into();
        assert_eq!(network.exit_code(), exit_code::CONNECTION);

        let failed = CliError::ProvisioningFailed {
            failed: 1,
            matched: 3,
        };
        assert_eq!(failed.exit_code(), exit_code::STEP_FAILED);
    }

    #[test]
    fn inventory_error_carries_path() {
        let err = CliError::inventory(
            std::path::Path::new("floors.csv"),
            CoreError::Inventory {
                line: 7,
                reason: "invalid MAC".into(),
            },
        );
        assert_eq!(err.to_string(), "Inventory floors.csv, line 7: invalid MAC");
        assert_eq!(err.exit_code(), exit_code::INVENTORY);
    }

    #[test]
    fn missing_profile_lists_available() {
        let err: CliError = ConfigError::ProfileNotFound {
            name: "lab".into(),
            available: vec!["campus".into(), "east".into()],
        }
        .into();
        match &err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "campus, east"),
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }
}
