//! Command handlers. Each returns `CliError` so `main` can pick the exit code.

pub mod config_cmd;
pub mod object;
pub mod provision;

use meshprov_core::Controller;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Resolve the profile and log in.
pub(crate) async fn connect(
    global: &GlobalOpts,
    continue_on_error: bool,
) -> Result<Controller, CliError> {
    let mut provisioner_config = config::build_provisioner_config(global)?;
    config::apply_failure_policy(&mut provisioner_config, continue_on_error);

    tracing::debug!(url = %provisioner_config.url, "connecting");
    Ok(Controller::connect(provisioner_config).await?)
}
