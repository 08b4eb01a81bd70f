//! Default command: provision every inventory AP on one building floor.

use std::io::{self, IsTerminal};

use dialoguer::Confirm;
use tracing::info;

use meshprov_core::{
    InventoryFilter, InventoryReader, PlannedProvision, StepStatus, execute, plan,
};

use crate::cli::{GlobalOpts, OutputFormat, ProvisionArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (Some(building), Some(floor)) = (args.building.as_deref(), args.floor.as_deref()) else {
        return Err(CliError::Validation {
            field: "building/floor".into(),
            reason: "both a building and a floor are required".into(),
        });
    };

    // The whole plan is read before the controller is touched, so a
    // malformed matching row aborts with no AP half-provisioned.
    let reader = InventoryReader::from_path(&args.inventory)
        .map_err(|e| CliError::inventory(&args.inventory, e))?;
    let plans = plan(reader, &InventoryFilter::new(building, floor))
        .map_err(|e| CliError::inventory(&args.inventory, e))?;

    if args.dry {
        output::print_output(&output::render_plan(global.output, &plans)?, global.quiet);
        return Ok(());
    }

    if plans.is_empty() {
        if !global.quiet {
            eprintln!("No APs in {} for building '{building}' floor '{floor}'", args.inventory.display());
        }
        return Ok(());
    }

    if !confirm(&plans, global)? {
        eprintln!("Aborted; nothing was changed.");
        return Ok(());
    }

    let controller = super::connect(global, args.continue_on_error).await?;

    let color = output::should_color();
    let progress = global.output != OutputFormat::Json && !global.quiet;
    let summary = execute(&controller.provisioner(), &plans, |plan, report| {
        if progress {
            output::print_output(&output::render_progress(plan, report, color), false);
        }
    })
    .await;

    controller.disconnect().await;

    info!(
        matched = summary.matched,
        provisioned = summary.provisioned,
        failed = summary.failed,
        "run finished"
    );
    output::print_output(
        &output::render_summary(global.output, &plans, &summary)?,
        global.quiet,
    );

    if summary.is_success() {
        return Ok(());
    }
    if let Some(lost) = summary.reports.iter().find(|r| r.session_lost()) {
        let message = lost
            .failed_steps()
            .next()
            .map_or_else(|| "session rejected".to_owned(), |s| format!("session rejected at {}", s.step));
        return Err(CliError::AuthFailed { message });
    }
    if summary.connection_lost() {
        let reason = summary
            .reports
            .iter()
            .flat_map(|r| r.failed_steps())
            .find_map(|s| match &s.status {
                StepStatus::Failed { error, .. } => {
                    Some(format!("{} got no response: {error}", s.step))
                }
                _ => None,
            })
            .unwrap_or_else(|| "controller stopped responding".to_owned());
        return Err(CliError::ConnectionFailed { reason });
    }
    Err(CliError::ProvisioningFailed {
        failed: summary.failed,
        matched: summary.matched,
    })
}

/// Reprovisioning reboots every AP in the plan; ask first unless `--yes`.
fn confirm(plans: &[PlannedProvision], global: &GlobalOpts) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes);
    }

    for plan in plans {
        eprintln!("{plan}");
    }
    Confirm::new()
        .with_prompt(format!("Provision and reboot {} AP(s)?", plans.len()))
        .default(false)
        .interact()
        .map_err(|e| CliError::Validation {
            field: "confirmation".into(),
            reason: format!("prompt failed: {e}"),
        })
}
