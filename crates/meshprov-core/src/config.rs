// ── Runtime provisioning configuration ──
//
// These types describe *how* to reach a controller and how a run behaves
// when a step fails. They carry credential data but never touch disk;
// the CLI resolves profiles and hands a `ProvisionerConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use meshprov_api::{Credentials, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed controller certificates).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// What to do when a provisioning step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the AP's sequence at the first failed step and stop the run.
    #[default]
    FailFast,
    /// Run every step for every AP regardless of failures.
    Continue,
}

/// Everything needed to log in and provision against one controller.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// Controller API root (e.g. `https://mm.example.net:4343/v1`).
    pub url: Url,
    /// Raw query fragment selecting the configuration node.
    pub config_path: String,
    /// Prefix joined with the mesh role to form the AP group name.
    pub group_base: String,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl ProvisionerConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            config_path: String::new(),
            group_base: String::new(),
            credentials: Credentials::new(username, password),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_tls(TlsMode::from(&self.tls))
            .with_timeout(self.timeout)
            .with_cookie_jar()
    }
}
