use cigotrack_core::fields::JobCall;
use cigotrack_core::NodeCall;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::Report;

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let output = super::executor(cli, false, false)?
        .run(Vec::new(), &NodeCall::Job(JobCall::Ping))
        .await?;

    Report::from_run(output)
}
