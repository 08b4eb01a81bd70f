// ── Controller facade ──
//
// Owns the HTTP client and the authenticated session for one run.
// Everything the CLI does against a controller goes through here.

use tracing::{info, warn};

use meshprov_api::{CommandResponse, ControllerClient, Session};

use crate::config::{FailurePolicy, ProvisionerConfig};
use crate::error::CoreError;
use crate::workflow::Provisioner;

/// A logged-in connection to one mobility controller.
pub struct Controller {
    client: ControllerClient,
    session: Session,
    group_base: String,
    failure_policy: FailurePolicy,
}

impl Controller {
    /// Build the client and log in.
    ///
    /// Fails with [`CoreError::Authentication`] if the controller does not
    /// hand out a session token; no configuration call is made in that case.
    pub async fn connect(config: ProvisionerConfig) -> Result<Self, CoreError> {
        let client =
            ControllerClient::new(config.url.clone(), &config.config_path, &config.transport())?;
        let session = client.login(&config.credentials).await?;

        info!(url = %config.url, "connected to controller");
        Ok(Self {
            client,
            session,
            group_base: config.group_base,
            failure_policy: config.failure_policy,
        })
    }

    /// A workflow bound to this controller's session.
    pub fn provisioner(&self) -> Provisioner<'_, ControllerClient> {
        Provisioner::new(
            &self.client,
            &self.session,
            self.group_base.clone(),
            self.failure_policy,
        )
    }

    /// Rename an AP identified by serial number.
    pub async fn rename(&self, serial: &str, new_name: &str) -> Result<CommandResponse, CoreError> {
        Ok(self.client.ap_rename(&self.session, serial, new_name).await?)
    }

    /// Move an AP identified by serial number to another group.
    pub async fn regroup(
        &self,
        serial: &str,
        new_group: &str,
    ) -> Result<CommandResponse, CoreError> {
        Ok(self
            .client
            .ap_regroup(&self.session, serial, new_group)
            .await?)
    }

    /// Log out. Failures are logged and otherwise ignored.
    pub async fn disconnect(self) {
        match self.client.logout(self.session).await {
            Ok(status) => info!(%status, "logged out"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }
}
