//! Standalone controller operations: `rename` and `regroup`.

use serde::Serialize;

use meshprov_api::CommandResponse;

use crate::cli::{GlobalOpts, OutputFormat, RegroupArgs, RenameArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ObjectResult<'a> {
    serial: &'a str,
    #[serde(flatten)]
    response: &'a CommandResponse,
}

fn render(
    format: OutputFormat,
    serial: &str,
    response: &CommandResponse,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => output::render_json(&ObjectResult { serial, response }),
        OutputFormat::Table | OutputFormat::Plain => Ok(format!(
            "{}: {}",
            response.operation,
            response
                .status_str()
                .unwrap_or_else(|| format!("HTTP {}", response.status))
        )),
    }
}

pub async fn rename(args: &RenameArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = super::connect(global, false).await?;
    let result = controller.rename(&args.serial, &args.name).await;
    controller.disconnect().await;

    let response = result?;
    output::print_output(&render(global.output, &args.serial, &response)?, global.quiet);
    Ok(())
}

pub async fn regroup(args: &RegroupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = super::connect(global, false).await?;
    let result = controller.regroup(&args.serial, &args.group).await;
    controller.disconnect().await;

    let response = result?;
    output::print_output(&render(global.output, &args.serial, &response)?, global.quiet);
    Ok(())
}
