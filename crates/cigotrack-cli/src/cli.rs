//! CLI argument definitions for cigotrack.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Run a node configuration over input items |
//! | `ping` | Check credentials against `GET /ping` |
//! | `routes` | Print the endpoint table |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `30000` | Per-request timeout in ms |
//! | `--verbose` | `false` | Debug logging on stderr |
//! | `--environment` | env | Overrides `CIGOTRACK_ENVIRONMENT` |
//! | `--account-id` | env | Overrides `CIGOTRACK_ACCOUNT_ID` |
//! | `--auth-key` | env | Overrides `CIGOTRACK_AUTH_KEY` |
//!
//! # Examples
//!
//! ```bash
//! cigotrack ping
//! cigotrack run --node get-job.json --items orders.json --continue-on-fail
//! cat orders.json | cigotrack run --node get-job.json --items - --format ndjson
//! cigotrack routes --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "cigotrack",
    author,
    version,
    about = "Run CigoTracker API operations over JSON items",
    long_about = "cigotrack exposes the CigoTracker delivery-tracking API as typed node \
operations. A node configuration names a resource, an operation and its fields; \
each input item issues one API call and the responses are printed as output items.\n\
\n\
Credentials are read from CIGOTRACK_ENVIRONMENT, CIGOTRACK_ACCOUNT_ID and \
CIGOTRACK_AUTH_KEY unless overridden by flags."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON document with run metadata (default)
    /// - ndjson: One output item per line
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Log debug events to stderr.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Target environment (production or sandbox).
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// CigoTracker account identifier.
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    /// CigoTracker API key.
    #[arg(long, global = true)]
    pub auth_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON document.
    Json,
    /// Newline-delimited JSON (one output item per line).
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a node configuration over input items.
    ///
    /// The node file holds `resource`, `operation` and the operation's
    /// fields. String values of the form `{{ $json.key }}` are filled from
    /// each input item.
    ///
    /// # Examples
    ///
    ///   cigotrack run --node job-get.json --items items.json
    ///   cigotrack run --node job-search.json
    Run(RunArgs),

    /// Check credentials with `GET /ping`.
    Ping,

    /// Print the resource/operation endpoint table.
    Routes(RoutesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Path to the node configuration JSON.
    #[arg(long)]
    pub node: PathBuf,

    /// Path to a JSON array of input items, or `-` for stdin.
    #[arg(long)]
    pub items: Option<String>,

    /// Emit error items instead of aborting on item failures.
    #[arg(long, default_value_t = false)]
    pub continue_on_fail: bool,

    /// Reject unusable optional fields instead of dropping them.
    #[arg(long, default_value_t = false)]
    pub strict_fields: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RoutesArgs {
    /// Only list routes for this resource.
    #[arg(long)]
    pub resource: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_flags_and_globals() {
        let cli = Cli::try_parse_from([
            "cigotrack",
            "--format",
            "ndjson",
            "run",
            "--node",
            "node.json",
            "--items",
            "-",
            "--continue-on-fail",
            "--timeout-ms",
            "500",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Ndjson);
        assert_eq!(cli.timeout_ms, 500);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.node, PathBuf::from("node.json"));
        assert_eq!(args.items.as_deref(), Some("-"));
        assert!(args.continue_on_fail);
        assert!(!args.strict_fields);
    }

    #[test]
    fn run_requires_node_file() {
        assert!(Cli::try_parse_from(["cigotrack", "run"]).is_err());
    }
}
