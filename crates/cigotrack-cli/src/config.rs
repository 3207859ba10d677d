//! Credential, node and item loading for the CLI host.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use cigotrack_core::credentials::{ENV_ACCOUNT_ID, ENV_AUTH_KEY, ENV_ENVIRONMENT};
use cigotrack_core::{Credentials, InputItem, NodeConfig};
use serde_json::Value;

use crate::cli::Cli;
use crate::error::CliError;

/// Environment variables, with any command-line overrides applied.
pub fn credentials(cli: &Cli) -> Result<Credentials, CliError> {
    credentials_with(cli, |name| std::env::var(name).ok())
}

fn credentials_with<F>(cli: &Cli, env: F) -> Result<Credentials, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        (ENV_ENVIRONMENT, cli.environment.as_ref()),
        (ENV_ACCOUNT_ID, cli.account_id.as_ref()),
        (ENV_AUTH_KEY, cli.auth_key.as_ref()),
    ];

    Credentials::from_lookup(|name| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.cloned())
            .or_else(|| env(name))
    })
    .map_err(CliError::from)
}

pub fn load_node(path: &Path) -> Result<NodeConfig, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.display().to_string(),
        source,
    })?;
    Ok(NodeConfig::from_json(&raw)?)
}

/// Reads items from a file or `-` (stdin). No source means no items.
pub fn load_items(source: Option<&str>) -> Result<Vec<InputItem>, CliError> {
    let raw = match source {
        None => return Ok(Vec::new()),
        Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Input {
                    path: String::from("<stdin>"),
                    source,
                })?;
            buffer
        }
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_owned(),
            source,
        })?,
    };

    parse_items(&raw)
}

/// A JSON array of items, a single object, or blank input.
pub fn parse_items(raw: &str) -> Result<Vec<InputItem>, CliError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(match serde_json::from_str::<Value>(raw)? {
        Value::Array(values) => values.into_iter().map(InputItem::new).collect(),
        other => vec![InputItem::new(other)],
    })
}
