// Configuration object operations
//
// One method per controller object. Each is a single request/response;
// ordering between them is the caller's business.

use tracing::debug;

use crate::auth::Session;
use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{ApProvisioning, CommandResponse, ObjectEndpoint};
use crate::payload;

impl ControllerClient {
    /// Rename an AP by serial number.
    ///
    /// `POST /configuration/object/ap_rename`
    pub async fn ap_rename(
        &self,
        session: &Session,
        serial: &str,
        new_name: &str,
    ) -> Result<CommandResponse, Error> {
        debug!(serial, new_name, "renaming AP");
        self.post_object(
            session,
            ObjectEndpoint::ApRename,
            &payload::ap_rename(serial, new_name),
        )
        .await
    }

    /// Move an AP to another AP group by serial number.
    ///
    /// `POST /configuration/object/ap_regroup`
    pub async fn ap_regroup(
        &self,
        session: &Session,
        serial: &str,
        new_group: &str,
    ) -> Result<CommandResponse, Error> {
        debug!(serial, new_group, "regrouping AP");
        self.post_object(
            session,
            ObjectEndpoint::ApRegroup,
            &payload::ap_regroup(serial, new_group),
        )
        .await
    }

    /// Reset the controller's provisioning staging list.
    ///
    /// `POST /configuration/object/clear_provisioning_ap_list`
    pub async fn clear_provisioning_ap_list(
        &self,
        session: &Session,
    ) -> Result<CommandResponse, Error> {
        self.post_object(
            session,
            ObjectEndpoint::ClearProvisioningApList,
            &payload::clear_provisioning_ap_list(),
        )
        .await
    }

    /// Load an AP's current boot parameters into the staging area.
    ///
    /// `POST /configuration/object/read_bootinfo`
    pub async fn read_bootinfo(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, Error> {
        self.post_object(
            session,
            ObjectEndpoint::ReadBootinfo,
            &payload::read_bootinfo(ap_name),
        )
        .await
    }

    /// Copy the staged parameters into the editable provisioning buffer.
    ///
    /// `POST /configuration/object/copy_provisioning_params`
    pub async fn copy_provisioning_params(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, Error> {
        self.post_object(
            session,
            ObjectEndpoint::CopyProvisioningParams,
            &payload::copy_provisioning_params(ap_name),
        )
        .await
    }

    /// Modify the provisioning buffer: name, group, mesh role, portal gains.
    ///
    /// `POST /configuration/object/ap_prov`
    pub async fn ap_prov(
        &self,
        session: &Session,
        request: &ApProvisioning,
    ) -> Result<CommandResponse, Error> {
        self.post_object(session, ObjectEndpoint::ApProv, &payload::ap_prov(request))
            .await
    }

    /// Commit the buffer to the AP. The AP reboots.
    ///
    /// `POST /configuration/object/ap_reprovision`
    pub async fn ap_reprovision(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, Error> {
        self.post_object(
            session,
            ObjectEndpoint::ApReprovision,
            &payload::ap_reprovision(ap_name),
        )
        .await
    }
}
