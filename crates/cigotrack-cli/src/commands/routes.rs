use cigotrack_core::{Resource, ROUTES};
use serde_json::json;

use crate::cli::RoutesArgs;
use crate::error::CliError;
use crate::output::Report;

pub fn run(args: &RoutesArgs) -> Result<Report, CliError> {
    let filter = args
        .resource
        .as_deref()
        .map(str::parse::<Resource>)
        .transpose()?;

    let rows = ROUTES
        .iter()
        .filter(|route| filter.is_none_or(|resource| route.resource == resource))
        .map(|route| {
            json!({
                "resource": route.resource,
                "operation": route.operation,
                "method": route.method.as_str(),
                "path": route.path,
                "has_body": route.method.allows_body(),
            })
        })
        .collect();

    Ok(Report::rows(rows))
}
