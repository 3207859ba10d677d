use tracing::debug;

use crate::cli::{Cli, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::output::Report;

pub async fn run(cli: &Cli, args: &RunArgs) -> Result<Report, CliError> {
    let node = config::load_node(&args.node)?;
    let template = node.template()?;
    let items = config::load_items(args.items.as_deref())?;
    debug!(node = %args.node.display(), item_count = items.len(), "loaded run inputs");

    let executor = super::executor(
        cli,
        args.strict_fields || node.strict_fields,
        args.continue_on_fail || node.continue_on_fail,
    )?;
    let output = executor.run(items, &template).await?;

    Report::from_run(output)
}
