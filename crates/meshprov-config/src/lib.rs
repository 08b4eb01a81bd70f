//! Profile configuration for meshprov.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `meshprov_core::ProvisionerConfig`. The CLI layers its
//! flag overrides on top of what this crate produces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use meshprov_core::{FailurePolicy, ProvisionerConfig, TlsVerification};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "meshprov";

/// Environment variable consulted for the password when the profile names none.
pub const PASSWORD_ENV: &str = "MESHPROV_PASSWORD";

/// Environment variable consulted when the profile has no username.
pub const USERNAME_ENV: &str = "MESHPROV_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("no {what} configured for profile '{profile}'")]
    NoCredentials { profile: String, what: &'static str },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Controllers usually ship self-signed certificates.
    #[serde(default = "default_true")]
    pub insecure: bool,

    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: true,
            fail_fast: true,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller API root (e.g., "https://mm.example.net:4343/v1").
    pub controller: String,

    /// Raw query fragment selecting the config node, e.g. "config_path=%2Fmd".
    #[serde(default)]
    pub config_path: String,

    /// Prefix for AP group names; the mesh role is appended.
    #[serde(default)]
    pub group_base: String,

    pub username: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Plaintext password (prefer keyring or env var).
    pub password: Option<String>,

    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "meshprov", "meshprov").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("meshprov");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` (or the platform default) plus `MESHPROV_*` env.
///
/// A missing file is not an error; the result is then defaults + env.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("MESHPROV_").split("__"));

    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the platform default).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

// ── Profile lookup ──────────────────────────────────────────────────

impl Config {
    /// The requested profile name, else `default_profile`, else "default".
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Username: profile, then `MESHPROV_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    resolve_username_with(profile, profile_name, |k| std::env::var(k).ok())
}

fn resolve_username_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| env(USERNAME_ENV))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            what: "username",
        })
}

/// Password: profile's `password_env`, then `MESHPROV_PASSWORD`, then the
/// system keyring, then plaintext in the config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |k| std::env::var(k).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        debug!(profile = profile_name, "password from profile env var");
        return Ok(SecretString::from(pw));
    }

    // 2. Global env var
    if let Some(pw) = env(PASSWORD_ENV) {
        debug!(profile = profile_name, "password from {PASSWORD_ENV}");
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(&keyring_user(profile_name)) {
        debug!(profile = profile_name, "password from keyring");
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        what: "password",
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to core config ──────────────────────────────────────

fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    match (&profile.ca_cert, profile.insecure) {
        (_, Some(true)) => TlsVerification::DangerAcceptInvalid,
        (Some(ca), _) => TlsVerification::CustomCa(ca.clone()),
        (None, Some(false)) => TlsVerification::SystemDefaults,
        (None, None) if defaults.insecure => TlsVerification::DangerAcceptInvalid,
        (None, None) => TlsVerification::SystemDefaults,
    }
}

fn build_provisioner_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<ProvisionerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let mut config = ProvisionerConfig::new(url, username, password);
    config.config_path.clone_from(&profile.config_path);
    config.group_base.clone_from(&profile.group_base);
    config.tls = tls_for(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.failure_policy = if defaults.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::Continue
    };
    Ok(config)
}

/// Build a `ProvisionerConfig` from a profile, resolving credentials.
pub fn profile_to_provisioner_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProvisionerConfig, ConfigError> {
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    build_provisioner_config(profile, defaults, username, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "campus"

[defaults]
timeout = 20
fail_fast = false

[profiles.campus]
controller = "https://mm.example.net:4343/v1"
config_path = "config_path=%2Fmd%2Fcampus"
group_base = "campus-"
username = "admin"
password_env = "CAMPUS_PW"
password = "plain"
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn campus() -> Profile {
        Profile {
            controller: "https://mm.example.net:4343/v1".into(),
            password_env: Some("CAMPUS_PW".into()),
            password: Some("plain".into()),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_profiles_and_defaults_from_file() {
        let file = write_config(SAMPLE);
        let cfg = load_config(Some(file.path())).unwrap();

        assert_eq!(cfg.active_profile_name(None), "campus");
        assert_eq!(cfg.active_profile_name(Some("lab")), "lab");
        assert_eq!(cfg.defaults.timeout, 20);
        assert!(!cfg.defaults.fail_fast);
        assert!(cfg.defaults.insecure);

        let profile = cfg.profile("campus").unwrap();
        assert_eq!(profile.config_path, "config_path=%2Fmd%2Fcampus");
        assert_eq!(profile.group_base, "campus-");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.defaults.fail_fast);
    }

    #[test]
    fn unknown_profile_lists_available() {
        let file = write_config(SAMPLE);
        let cfg = load_config(Some(file.path())).unwrap();
        match cfg.profile("lab").unwrap_err() {
            ConfigError::ProfileNotFound { name, available } => {
                assert_eq!(name, "lab");
                assert_eq!(available, ["campus"]);
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), campus());

        let written = save_config(&cfg, Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(
            loaded.profile("lab").unwrap().controller,
            "https://mm.example.net:4343/v1"
        );
    }

    #[test]
    fn password_prefers_profile_env_var() {
        let env = |k: &str| match k {
            "CAMPUS_PW" => Some("from-profile-env".to_string()),
            PASSWORD_ENV => Some("from-global-env".to_string()),
            _ => None,
        };
        let pw = resolve_password_with(&campus(), "campus", env, |_| Some("kr".into())).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");
    }

    #[test]
    fn password_falls_back_through_global_env_and_keyring() {
        let global = |k: &str| (k == PASSWORD_ENV).then(|| "global".to_string());
        let pw = resolve_password_with(&campus(), "campus", global, |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "global");

        let pw = resolve_password_with(&campus(), "campus", no_env, |user| {
            (user == "campus/password").then(|| "kr".to_string())
        })
        .unwrap();
        assert_eq!(pw.expose_secret(), "kr");

        let pw = resolve_password_with(&campus(), "campus", no_env, |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn password_missing_everywhere() {
        let profile = Profile::default();
        let err = resolve_password_with(&profile, "lab", no_env, |_| None).unwrap_err();
        assert_eq!(err.to_string(), "no password configured for profile 'lab'");
    }

    #[test]
    fn username_from_profile_then_env() {
        let mut profile = campus();
        assert!(resolve_username_with(&profile, "campus", no_env).is_err());

        let env = |k: &str| (k == USERNAME_ENV).then(|| "env-admin".to_string());
        assert_eq!(resolve_username_with(&profile, "campus", env).unwrap(), "env-admin");

        profile.username = Some("admin".into());
        assert_eq!(resolve_username_with(&profile, "campus", env).unwrap(), "admin");
    }

    #[test]
    fn tls_defaults_to_accepting_self_signed() {
        let defaults = Defaults::default();
        let mut profile = campus();
        assert_eq!(tls_for(&profile, &defaults), TlsVerification::DangerAcceptInvalid);

        profile.ca_cert = Some("/etc/ssl/mm.pem".into());
        assert_eq!(
            tls_for(&profile, &defaults),
            TlsVerification::CustomCa("/etc/ssl/mm.pem".into())
        );

        profile.ca_cert = None;
        profile.insecure = Some(false);
        assert_eq!(tls_for(&profile, &defaults), TlsVerification::SystemDefaults);
    }

    #[test]
    fn provisioner_config_carries_profile_fields() {
        let mut profile = campus();
        profile.config_path = "config_path=%2Fmd".into();
        profile.group_base = "campus-".into();
        profile.timeout = Some(5);
        let defaults = Defaults {
            fail_fast: false,
            ..Defaults::default()
        };

        let config = build_provisioner_config(
            &profile,
            &defaults,
            "admin".into(),
            SecretString::from("pw".to_string()),
        )
        .unwrap();

        assert_eq!(config.url.as_str(), "https://mm.example.net:4343/v1");
        assert_eq!(config.config_path, "config_path=%2Fmd");
        assert_eq!(config.group_base, "campus-");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.credentials.username, "admin");
    }

    #[test]
    fn invalid_controller_url_is_validation_error() {
        let profile = Profile {
            controller: "not a url".into(),
            ..Profile::default()
        };
        let err = build_provisioner_config(
            &profile,
            &Defaults::default(),
            "admin".into(),
            SecretString::from("pw".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "controller"));
    }
}
