//! Translation from config file + global flags to a `ProvisionerConfig`.
//!
//! This is the single place where CLI flags override profile values.

use std::path::PathBuf;
use std::time::Duration;

use meshprov_config::{Config, Profile};
use meshprov_core::{FailurePolicy, ProvisionerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config`/`MESHPROV_CONFIG`, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(meshprov_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(meshprov_config::load_config(Some(&config_file(global)))?)
}

/// Resolve the active profile (plus flag overrides) into a `ProvisionerConfig`.
///
/// Without a matching profile, `--controller` alone is enough as long as
/// credentials come from `MESHPROV_USERNAME` / `MESHPROV_PASSWORD`.
pub fn build_provisioner_config(global: &GlobalOpts) -> Result<ProvisionerConfig, CliError> {
    let cfg = load(global)?;
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let profile = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile.clone()
    } else if global.profile.is_some() {
        // An explicitly requested profile must exist.
        cfg.profile(&profile_name)?.clone()
    } else {
        let controller = global.controller.clone().ok_or_else(|| CliError::NoConfig {
            path: config_file(global).display().to_string(),
        })?;
        Profile {
            controller,
            ..Profile::default()
        }
    };

    let mut config =
        meshprov_config::profile_to_provisioner_config(&profile, &profile_name, &cfg.defaults)?;
    apply_overrides(&mut config, global)?;
    Ok(config)
}

fn apply_overrides(config: &mut ProvisionerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref url) = global.controller {
        config.url = url.parse().map_err(|_| CliError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {url}"),
        })?;
    }

    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    } else if global.verify_tls && config.tls == TlsVerification::DangerAcceptInvalid {
        config.tls = TlsVerification::SystemDefaults;
    }

    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(())
}

/// `--continue-on-error` wins over the configured `fail_fast` default.
pub fn apply_failure_policy(config: &mut ProvisionerConfig, continue_on_error: bool) {
    if continue_on_error {
        config.failure_policy = FailurePolicy::Continue;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::SecretString;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["meshprov"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["east", "3"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn base() -> ProvisionerConfig {
        let mut config = ProvisionerConfig::new(
            "https://mm.example.net:4343/v1".parse().unwrap(),
            "admin",
            SecretString::from("pw".to_string()),
        );
        config.tls = TlsVerification::DangerAcceptInvalid;
        config
    }

    #[test]
    fn verify_tls_turns_off_insecure_default() {
        let mut config = base();
        apply_overrides(&mut config, &global(&["--verify-tls"])).unwrap();
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn verify_tls_keeps_custom_ca() {
        let mut config = base();
        config.tls = TlsVerification::CustomCa("/etc/ssl/mm.pem".into());
        apply_overrides(&mut config, &global(&["--verify-tls"])).unwrap();
        assert_eq!(config.tls, TlsVerification::CustomCa("/etc/ssl/mm.pem".into()));
    }

    #[test]
    fn controller_and_timeout_flags_override_profile() {
        let mut config = base();
        apply_overrides(
            &mut config,
            &global(&["-c", "https://other.example.net/v1", "--timeout", "7"]),
        )
        .unwrap();
        assert_eq!(config.url.as_str(), "https://other.example.net/v1");
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn bad_controller_flag_is_usage_error() {
        let mut config = base();
        let err = apply_overrides(&mut config, &global(&["-c", "::"])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn continue_on_error_switches_policy() {
        let mut config = base();
        apply_failure_policy(&mut config, false);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        apply_failure_policy(&mut config, true);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
    }
}
