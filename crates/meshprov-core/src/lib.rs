// meshprov-core: Provisioning workflow and inventory handling for meshprov
//
// Sits between the HTTP client in `meshprov-api` and the CLI. Knows the
// five-step staging protocol, how inventory rows become AP identities,
// and how failures propagate through a run.

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod model;
pub mod workflow;

pub use config::{FailurePolicy, ProvisionerConfig, TlsVerification};
pub use controller::Controller;
pub use driver::{PlannedProvision, RunSummary, execute, plan};
pub use error::CoreError;
pub use inventory::{InventoryFilter, InventoryReader};
pub use model::{ApIdentity, InventoryRecord, InventoryRow, MacAddress, MacParseError, MeshRole};
pub use workflow::{
    ApOperations, FailureKind, ProvisionReport, Provisioner, ProvisioningStep, StepOutcome,
    StepStatus,
};
