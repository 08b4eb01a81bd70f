// ── Inventory driver ──
//
// Selects the inventory rows for one building/floor and feeds them to
// the provisioner in file order. Planning is separate from execution so
// a dry run (and a malformed matching row) never touches the controller.

use std::fmt;
use std::io;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::CoreError;
use crate::inventory::{InventoryFilter, InventoryReader};
use crate::model::{ApIdentity, InventoryRecord};
use crate::workflow::{ApOperations, ProvisionReport, Provisioner};

/// One matching inventory row, ready to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedProvision {
    pub line: u64,
    pub record: InventoryRecord,
    pub identity: ApIdentity,
}

impl fmt::Display for PlannedProvision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Role: {}, MAC: {}, Name: {}",
            self.record.role, self.record.mac, self.record.target_name
        )
    }
}

/// Collect the rows matching `filter`, in file order.
///
/// Rows that don't match are never normalized, so a bad MAC on another
/// floor is ignored. A malformed row that does match fails the plan.
pub fn plan<R: io::Read>(
    reader: InventoryReader<R>,
    filter: &InventoryFilter,
) -> Result<Vec<PlannedProvision>, CoreError> {
    let mut planned = Vec::new();

    for row in reader {
        let row = row?;
        if !filter.matches(&row) {
            continue;
        }
        let record = row.normalize()?;
        let identity = record.identity();
        debug!(line = row.line, %identity, "planned");
        planned.push(PlannedProvision {
            line: row.line,
            record,
            identity,
        });
    }

    info!(
        building = filter.building(),
        floor = filter.floor(),
        matched = planned.len(),
        "inventory filtered"
    );
    Ok(planned)
}

/// Aggregate result of a provisioning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub matched: usize,
    pub provisioned: usize,
    pub failed: usize,
    /// `true` if the run stopped before reaching every matched AP.
    pub aborted: bool,
    pub reports: Vec<ProvisionReport>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.aborted
    }

    /// `true` if the run failed only because the controller stopped
    /// answering (timeouts or transport errors), never because it
    /// rejected a command.
    pub fn connection_lost(&self) -> bool {
        let mut failed = self.reports.iter().filter(|r| !r.is_success()).peekable();
        failed.peek().is_some() && failed.all(ProvisionReport::connection_lost)
    }

    /// APs that were never attempted because the run stopped early.
    pub fn not_attempted(&self) -> usize {
        self.matched - self.reports.len()
    }
}

/// Provision every planned AP in order.
///
/// `observer` sees each report as soon as its AP finishes. The run stops
/// after the first failed AP under fail-fast, and after an authentication
/// failure regardless of policy.
pub async fn execute<A, F>(
    provisioner: &Provisioner<'_, A>,
    plans: &[PlannedProvision],
    mut observer: F,
) -> RunSummary
where
    A: ApOperations,
    F: FnMut(&PlannedProvision, &ProvisionReport),
{
    let mut summary = RunSummary {
        matched: plans.len(),
        ..RunSummary::default()
    };

    for plan in plans {
        let report = provisioner.provision(&plan.identity).await;
        observer(plan, &report);

        let stop = if report.is_success() {
            summary.provisioned += 1;
            false
        } else {
            summary.failed += 1;
            error!(line = plan.line, ap = %plan.identity.current_name, "provisioning failed");
            report.session_lost()
                || provisioner.policy() == crate::config::FailurePolicy::FailFast
        };
        summary.reports.push(report);

        if stop {
            break;
        }
    }

    summary.aborted = summary.reports.len() < summary.matched;
    summary
}
