//! Output formatting: progress lines, summary table, JSON.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use meshprov_core::{PlannedProvision, ProvisionReport, RunSummary, StepOutcome, StepStatus};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Color only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

pub fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

// ── Dry run ─────────────────────────────────────────────────────────

pub fn render_plan(format: OutputFormat, plans: &[PlannedProvision]) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(plans),
        OutputFormat::Table | OutputFormat::Plain => Ok(plans
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

// ── Live progress ───────────────────────────────────────────────────

fn status_text(status: &StepStatus, color: bool) -> String {
    let text = match status {
        StepStatus::Succeeded {
            message: Some(msg), ..
        } => format!("ok ({msg})"),
        StepStatus::Succeeded { http_status, .. } => format!("ok (HTTP {http_status})"),
        StepStatus::Failed { error, .. } => format!("failed: {error}"),
        StepStatus::Skipped => "skipped".into(),
    };
    if !color {
        return text;
    }
    match status {
        StepStatus::Succeeded { .. } => text.green().to_string(),
        StepStatus::Failed { .. } => text.red().to_string(),
        StepStatus::Skipped => text.dimmed().to_string(),
    }
}

fn step_line(outcome: &StepOutcome, color: bool) -> String {
    format!("  {}: {}", outcome.step, status_text(&outcome.status, color))
}

/// The plan line followed by one `<step>: <status>` line per step.
pub fn render_progress(plan: &PlannedProvision, report: &ProvisionReport, color: bool) -> String {
    let mut lines = vec![plan.to_string()];
    lines.extend(report.steps.iter().map(|s| step_line(s, color)));
    lines.join("\n")
}

// ── Summary ─────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Line")]
    line: u64,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Result")]
    result: String,
}

fn report_row(plan: &PlannedProvision, report: &ProvisionReport) -> ReportRow {
    let result = if report.is_success() {
        "provisioned".to_owned()
    } else {
        report
            .failed_steps()
            .next()
            .map_or_else(|| "failed".to_owned(), |s| format!("failed at {}", s.step))
    };
    ReportRow {
        line: plan.line,
        mac: plan.record.mac.to_string(),
        name: plan.identity.target_name.clone(),
        role: plan.identity.mesh_role.to_string(),
        result,
    }
}

fn totals_line(summary: &RunSummary) -> String {
    let mut line = format!(
        "Provisioned {}/{} AP(s)",
        summary.provisioned, summary.matched
    );
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.aborted {
        line.push_str(&format!(", {} not attempted", summary.not_attempted()));
    }
    line
}

pub fn render_summary(
    format: OutputFormat,
    plans: &[PlannedProvision],
    summary: &RunSummary,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(summary),
        OutputFormat::Plain => Ok(totals_line(summary)),
        OutputFormat::Table => {
            let rows: Vec<_> = plans
                .iter()
                .zip(&summary.reports)
                .map(|(plan, report)| report_row(plan, report))
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{table}\n{}", totals_line(summary)))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meshprov_core::{
        ApIdentity, FailureKind, InventoryRecord, MacAddress, MeshRole, ProvisioningStep,
    };

    use super::*;

    fn planned() -> PlannedProvision {
        let record = InventoryRecord {
            building: "east".into(),
            floor: "3".into(),
            role: "portal".into(),
            mac: MacAddress::parse("001122334455").unwrap(),
            target_name: "EAST-3-01".into(),
        };
        PlannedProvision {
            line: 2,
            identity: record.identity(),
            record,
        }
    }

    fn report(fail_at: Option<ProvisioningStep>) -> ProvisionReport {
        let mut failed = false;
        let steps = ProvisioningStep::SEQUENCE
            .iter()
            .map(|&step| {
                let status = if failed {
                    StepStatus::Skipped
                } else if Some(step) == fail_at {
                    failed = true;
                    StepStatus::Failed {
                        kind: FailureKind::Command,
                        http_status: Some(500),
                        error: "boom".into(),
                    }
                } else {
                    StepStatus::Succeeded {
                        http_status: 200,
                        message: Some("Success".into()),
                    }
                };
                StepOutcome { step, status }
            })
            .collect();
        ProvisionReport {
            identity: ApIdentity {
                current_name: "00:11:22:33:44:55".into(),
                target_name: "EAST-3-01".into(),
                mesh_role: MeshRole::Portal,
            },
            steps,
        }
    }

    #[test]
    fn dry_run_plain_lines() {
        let out = render_plan(OutputFormat::Plain, &[planned()]).unwrap();
        assert_eq!(out, "Role: portal, MAC: 00:11:22:33:44:55, Name: EAST-3-01");
    }

    #[test]
    fn progress_lists_every_step() {
        let out = render_progress(&planned(), &report(Some(ProvisioningStep::ApProv)), false);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "  clear_list: ok (Success)");
        assert_eq!(lines[4], "  ap_prov: failed: boom");
        assert_eq!(lines[5], "  ap_reprovision: skipped");
    }

    #[test]
    fn summary_totals_and_table() {
        let summary = RunSummary {
            matched: 2,
            provisioned: 0,
            failed: 1,
            aborted: true,
            reports: vec![report(Some(ProvisioningStep::ReadBootinfo))],
        };
        let plain = render_summary(OutputFormat::Plain, &[planned()], &summary).unwrap();
        assert_eq!(plain, "Provisioned 0/2 AP(s), 1 failed, 1 not attempted");

        let table = render_summary(OutputFormat::Table, &[planned()], &summary).unwrap();
        assert!(table.contains("failed at read_bootinfo"));
        assert!(table.contains("mesh-portal"));
    }

    #[test]
    fn summary_json_has_reports() {
        let summary = RunSummary {
            matched: 1,
            provisioned: 1,
            failed: 0,
            aborted: false,
            reports: vec![report(None)],
        };
        let json: serde_json::Value =
            serde_json::from_str(&render_summary(OutputFormat::Json, &[planned()], &summary).unwrap())
                .unwrap();
        assert_eq!(json["provisioned"], 1);
        assert_eq!(json["reports"][0]["steps"][0]["step"], "clear_list");
        assert_eq!(json["reports"][0]["steps"][0]["status"], "succeeded");
    }
}
