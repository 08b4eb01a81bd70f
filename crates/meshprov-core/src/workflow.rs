// ── Provisioning workflow ──
//
// The controller stages provisioning server-side: clearing the list
// resets staging, read_bootinfo loads the AP's parameters, copy_prov
// moves them into an editable buffer, ap_prov edits the buffer and
// ap_reprovision commits it (the AP reboots). The five steps therefore
// always run in that order, one at a time.

use serde::Serialize;
use strum::Display;
use tracing::{info, warn};

use meshprov_api::{ApProvisioning, CommandResponse, ControllerClient, Session};

use crate::config::FailurePolicy;
use crate::error::CoreError;
use crate::model::ApIdentity;

// ── Controller seam ─────────────────────────────────────────────────

/// The controller operations the workflow needs.
///
/// Implemented by [`ControllerClient`]; tests substitute a recorder.
#[allow(async_fn_in_trait)]
pub trait ApOperations {
    async fn clear_provisioning_ap_list(
        &self,
        session: &Session,
    ) -> Result<CommandResponse, meshprov_api::Error>;

    async fn read_bootinfo(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error>;

    async fn copy_provisioning_params(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error>;

    async fn ap_prov(
        &self,
        session: &Session,
        request: &ApProvisioning,
    ) -> Result<CommandResponse, meshprov_api::Error>;

    async fn ap_reprovision(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error>;
}

impl ApOperations for ControllerClient {
    async fn clear_provisioning_ap_list(
        &self,
        session: &Session,
    ) -> Result<CommandResponse, meshprov_api::Error> {
        ControllerClient::clear_provisioning_ap_list(self, session).await
    }

    async fn read_bootinfo(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error> {
        ControllerClient::read_bootinfo(self, session, ap_name).await
    }

    async fn copy_provisioning_params(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error> {
        ControllerClient::copy_provisioning_params(self, session, ap_name).await
    }

    async fn ap_prov(
        &self,
        session: &Session,
        request: &ApProvisioning,
    ) -> Result<CommandResponse, meshprov_api::Error> {
        ControllerClient::ap_prov(self, session, request).await
    }

    async fn ap_reprovision(
        &self,
        session: &Session,
        ap_name: &str,
    ) -> Result<CommandResponse, meshprov_api::Error> {
        ControllerClient::ap_reprovision(self, session, ap_name).await
    }
}

// ── Steps ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
    ClearList,
    ReadBootinfo,
    CopyProv,
    ApProv,
    ApReprovision,
}

impl ProvisioningStep {
    /// Protocol order. Never reorder.
    pub const SEQUENCE: [Self; 5] = [
        Self::ClearList,
        Self::ReadBootinfo,
        Self::CopyProv,
        Self::ApProv,
        Self::ApReprovision,
    ];
}

/// Which part of the system a failed step tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Authentication,
    Command,
    Network,
}

impl FailureKind {
    fn of(err: &CoreError) -> Self {
        match err {
            CoreError::Authentication { .. } => Self::Authentication,
            CoreError::Network { .. } => Self::Network,
            _ => Self::Command,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded {
        http_status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Failed {
        kind: FailureKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
        error: String,
    },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: ProvisioningStep,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, StepStatus::Failed { .. })
    }
}

/// What happened while provisioning one AP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub identity: ApIdentity,
    pub steps: Vec<StepOutcome>,
}

impl ProvisionReport {
    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Succeeded { .. }))
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.is_failed())
    }

    /// `true` if at least one step failed and every failure was a request
    /// that got no response from the controller.
    pub fn connection_lost(&self) -> bool {
        let mut failed = self.failed_steps().peekable();
        failed.peek().is_some()
            && failed.all(|s| {
                matches!(
                    s.status,
                    StepStatus::Failed {
                        kind: FailureKind::Network,
                        ..
                    }
                )
            })
    }

    /// `true` if the session itself was rejected; nothing further can succeed.
    pub fn session_lost(&self) -> bool {
        self.steps.iter().any(|s| {
            matches!(
                s.status,
                StepStatus::Failed {
                    kind: FailureKind::Authentication,
                    ..
                }
            )
        })
    }
}

// ── Provisioner ─────────────────────────────────────────────────────

/// Runs the five-step provisioning sequence for one AP at a time.
pub struct Provisioner<'a, A: ApOperations> {
    api: &'a A,
    session: &'a Session,
    group_base: String,
    policy: FailurePolicy,
}

impl<'a, A: ApOperations> Provisioner<'a, A> {
    pub fn new(
        api: &'a A,
        session: &'a Session,
        group_base: impl Into<String>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            api,
            session,
            group_base: group_base.into(),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// AP group for a mesh role: `group_base + mesh_role`.
    pub fn ap_group(&self, identity: &ApIdentity) -> String {
        format!("{}{}", self.group_base, identity.mesh_role)
    }

    /// Provision one AP.
    ///
    /// With [`FailurePolicy::FailFast`] the first failure marks the
    /// remaining steps skipped. With [`FailurePolicy::Continue`] every step
    /// is attempted, except after an authentication failure: a rejected
    /// token cannot succeed on the next call either.
    pub async fn provision(&self, identity: &ApIdentity) -> ProvisionReport {
        info!(ap = %identity.current_name, target = %identity.target_name, role = %identity.mesh_role, "provisioning AP");

        let mut steps = Vec::with_capacity(ProvisioningStep::SEQUENCE.len());
        let mut halted = false;

        for step in ProvisioningStep::SEQUENCE {
            if halted {
                steps.push(StepOutcome {
                    step,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            let status = match self.run_step(step, identity).await {
                Ok(resp) => {
                    info!(ap = %identity.current_name, %step, status = resp.status, "step succeeded");
                    StepStatus::Succeeded {
                        http_status: resp.status,
                        message: resp.status_str(),
                    }
                }
                Err(err) => {
                    warn!(ap = %identity.current_name, %step, error = %err, "step failed");
                    let kind = FailureKind::of(&err);
                    halted = self.policy == FailurePolicy::FailFast
                        || kind == FailureKind::Authentication;
                    StepStatus::Failed {
                        kind,
                        http_status: match &err {
                            CoreError::Command { status, .. } => *status,
                            _ => None,
                        },
                        error: err.to_string(),
                    }
                }
            };

            steps.push(StepOutcome { step, status });
        }

        ProvisionReport {
            identity: identity.clone(),
            steps,
        }
    }

    async fn run_step(
        &self,
        step: ProvisioningStep,
        identity: &ApIdentity,
    ) -> Result<CommandResponse, CoreError> {
        let session = self.session;
        let ap_name = identity.current_name.as_str();

        let result = match step {
            ProvisioningStep::ClearList => self.api.clear_provisioning_ap_list(session).await,
            ProvisioningStep::ReadBootinfo => self.api.read_bootinfo(session, ap_name).await,
            ProvisioningStep::CopyProv => {
                self.api.copy_provisioning_params(session, ap_name).await
            }
            ProvisioningStep::ApProv => {
                let request = ApProvisioning {
                    ap_name: identity.target_name.clone(),
                    ap_group: self.ap_group(identity),
                    mesh_role: identity.mesh_role.clone(),
                };
                self.api.ap_prov(session, &request).await
            }
            ProvisioningStep::ApReprovision => self.api.ap_reprovision(session, ap_name).await,
        };

        result.map_err(CoreError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;

    use meshprov_api::{MeshRole, ObjectEndpoint};

    use super::*;

    /// Records every call and fails the ones it is told to. A failure
    /// status of `0` stands for a request that timed out.
    #[derive(Default)]
    pub(crate) struct RecordingApi {
        pub calls: RefCell<Vec<String>>,
        pub prov_requests: RefCell<Vec<ApProvisioning>>,
        pub failures: HashMap<ObjectEndpoint, u16>,
    }

    impl RecordingApi {
        pub fn failing(endpoint: ObjectEndpoint, status: u16) -> Self {
            Self {
                failures: HashMap::from([(endpoint, status)]),
                ..Self::default()
            }
        }

        fn respond(
            &self,
            endpoint: ObjectEndpoint,
            arg: &str,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.calls.borrow_mut().push(format!("{endpoint}({arg})"));
            match self.failures.get(&endpoint) {
                Some(401) => Err(meshprov_api::Error::Authentication {
                    message: "token expired".into(),
                }),
                Some(0) => Err(meshprov_api::Error::Command {
                    operation: endpoint.to_string(),
                    status: None,
                    body: "operation timed out".into(),
                    timed_out: true,
                }),
                Some(&status) => Err(meshprov_api::Error::Command {
                    operation: endpoint.to_string(),
                    status: Some(status),
                    body: "{}".into(),
                    timed_out: false,
                }),
                None => Ok(CommandResponse {
                    operation: endpoint,
                    status: 200,
                    body: json!({ "_global_result": { "status": 0, "status_str": "Success" } }),
                }),
            }
        }

        pub fn endpoints(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|c| c.split('(').next().unwrap_or_default().to_owned())
                .collect()
        }
    }

    impl ApOperations for RecordingApi {
        async fn clear_provisioning_ap_list(
            &self,
            _session: &Session,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.respond(ObjectEndpoint::ClearProvisioningApList, "")
        }

        async fn read_bootinfo(
            &self,
            _session: &Session,
            ap_name: &str,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.respond(ObjectEndpoint::ReadBootinfo, ap_name)
        }

        async fn copy_provisioning_params(
            &self,
            _session: &Session,
            ap_name: &str,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.respond(ObjectEndpoint::CopyProvisioningParams, ap_name)
        }

        async fn ap_prov(
            &self,
            _session: &Session,
            request: &ApProvisioning,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.prov_requests.borrow_mut().push(request.clone());
            self.respond(ObjectEndpoint::ApProv, &request.ap_name)
        }

        async fn ap_reprovision(
            &self,
            _session: &Session,
            ap_name: &str,
        ) -> Result<CommandResponse, meshprov_api::Error> {
            self.respond(ObjectEndpoint::ApReprovision, ap_name)
        }
    }

    pub(crate) fn test_session() -> Session {
        Session::new(
            Url::parse("https://mm.example.net:4343").unwrap(),
            "config_path=%2Fmd",
            SecretString::from("tok".to_string()),
        )
    }

    fn identity(role: MeshRole) -> ApIdentity {
        ApIdentity {
            current_name: "00:11:22:33:44:55".into(),
            target_name: "EAST-3-01".into(),
            mesh_role: role,
        }
    }

    const FULL_SEQUENCE: [&str; 5] = [
        "clear_provisioning_ap_list",
        "read_bootinfo",
        "copy_provisioning_params",
        "ap_prov",
        "ap_reprovision",
    ];

    #[tokio::test]
    async fn runs_five_steps_in_order() {
        let api = RecordingApi::default();
        let session = test_session();
        let provisioner = Provisioner::new(&api, &session, "campus-", FailurePolicy::FailFast);

        let report = provisioner
            .provision(&identity(MeshRole::Other("mesh-ap".into())))
            .await;

        assert!(report.is_success());
        assert_eq!(
            report.steps.iter().map(|s| s.step).collect::<Vec<_>>(),
            ProvisioningStep::SEQUENCE
        );
        assert_eq!(
            *api.calls.borrow(),
            [
                "clear_provisioning_ap_list()",
                "read_bootinfo(00:11:22:33:44:55)",
                "copy_provisioning_params(00:11:22:33:44:55)",
                "ap_prov(EAST-3-01)",
                "ap_reprovision(00:11:22:33:44:55)",
            ]
        );
    }

    #[tokio::test]
    async fn ap_prov_gets_group_from_base_and_role() {
        let api = RecordingApi::default();
        let session = test_session();
        let provisioner = Provisioner::new(&api, &session, "campus-", FailurePolicy::FailFast);

        provisioner.provision(&identity(MeshRole::Portal)).await;

        let requests = api.prov_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ap_group, "campus-mesh-portal");
        assert_eq!(requests[0].ap_name, "EAST-3-01");
        assert_eq!(requests[0].mesh_role, MeshRole::Portal);
    }

    #[tokio::test]
    async fn fail_fast_skips_remaining_steps() {
        let api = RecordingApi::failing(ObjectEndpoint::ReadBootinfo, 500);
        let session = test_session();
        let provisioner = Provisioner::new(&api, &session, "g-", FailurePolicy::FailFast);

        let report = provisioner.provision(&identity(MeshRole::Point)).await;

        assert!(!report.is_success());
        assert_eq!(api.endpoints(), ["clear_provisioning_ap_list", "read_bootinfo"]);
        assert!(matches!(
            report.steps[1].status,
            StepStatus::Failed {
                kind: FailureKind::Command,
                http_status: Some(500),
                ..
            }
        ));
        assert!(
            report.steps[2..]
                .iter()
                .all(|s| s.status == StepStatus::Skipped)
        );
    }

    #[tokio::test]
    async fn continue_policy_runs_every_step_in_order() {
        let api = RecordingApi::failing(ObjectEndpoint::CopyProvisioningParams, 400);
        let session = test_session();
        let provisioner = Provisioner::new(&api, &session, "g-", FailurePolicy::Continue);

        let report = provisioner.provision(&identity(MeshRole::Point)).await;

        assert_eq!(api.endpoints(), FULL_SEQUENCE);
        assert_eq!(report.failed_steps().count(), 1);
        assert_eq!(report.failed_steps().next().unwrap().step, ProvisioningStep::CopyProv);
        assert!(!report.session_lost());
    }

    #[tokio::test]
    async fn authentication_failure_halts_even_when_continuing() {
        let api = RecordingApi::failing(ObjectEndpoint::ClearProvisioningApList, 401);
        let session = test_session();
        let provisioner = Provisioner::new(&api, &session, "g-", FailurePolicy::Continue);

        let report = provisioner.provision(&identity(MeshRole::Point)).await;

        assert_eq!(api.endpoints(), ["clear_provisioning_ap_list"]);
        assert!(report.session_lost());
        assert_eq!(
            report
                .steps
                .iter()
                .filter(|s| s.status == StepStatus::Skipped)
                .count(),
            4
        );
    }

    #[test]
    fn step_names_and_serialization() {
        assert_eq!(ProvisioningStep::ClearList.to_string(), "clear_list");
        assert_eq!(ProvisioningStep::ApReprovision.to_string(), "ap_reprovision");

        let outcome = StepOutcome {
            step: ProvisioningStep::CopyProv,
            status: StepStatus::Failed {
                kind: FailureKind::Network,
                http_status: None,
                error: "timed out".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "step": "copy_prov", "status": "failed", "kind": "network", "error": "timed out" })
        );
    }
}
