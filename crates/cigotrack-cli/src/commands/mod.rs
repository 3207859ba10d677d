mod ping;
mod routes;
mod run;

use cigotrack_core::{BodyBuilder, CigoClient, Dispatcher, ExecutionOptions, Executor};

use crate::cli::{Cli, Command};
use crate::config;
use crate::error::CliError;
use crate::output::Report;

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    match &cli.command {
        Command::Run(args) => run::run(cli, args).await,
        Command::Ping => ping::run(cli).await,
        Command::Routes(args) => routes::run(args),
    }
}

/// Wires credentials, transport and options into an executor.
fn executor(cli: &Cli, strict_fields: bool, continue_on_fail: bool) -> Result<Executor, CliError> {
    let client = CigoClient::new(config::credentials(cli)?).with_timeout_ms(cli.timeout_ms);
    Ok(Executor::new(
        Dispatcher::new(client, BodyBuilder::new(strict_fields)),
        ExecutionOptions { continue_on_fail },
    ))
}
