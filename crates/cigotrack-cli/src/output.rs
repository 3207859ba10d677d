use std::io::{self, Write};

use cigotrack_core::{ItemWarning, OutputItem, RunOutput};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RunMeta {
    pub run_id: String,
    pub resource: Option<String>,
    pub operation: Option<String>,
    pub item_count: usize,
    pub output_count: usize,
    pub error_count: usize,
    pub warnings: Vec<ItemWarning>,
}

/// Rendered result of a command: metadata plus data rows.
#[derive(Debug, Serialize)]
pub struct Report {
    pub meta: Option<RunMeta>,
    pub data: Vec<Value>,
}

impl Report {
    pub fn from_run(output: RunOutput) -> Result<Self, CliError> {
        let meta = RunMeta {
            run_id: output.run_id.to_string(),
            resource: output.resource.map(|resource| resource.as_str().to_owned()),
            operation: output.operation.map(str::to_owned),
            item_count: output.item_count,
            output_count: output.items.len(),
            error_count: output.error_count(),
            warnings: output.warnings,
        };
        let data = output
            .items
            .into_iter()
            .map(|item: OutputItem| serde_json::to_value(item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            meta: Some(meta),
            data,
        })
    }

    /// Rows without run metadata, e.g. the endpoint table.
    pub fn rows(data: Vec<Value>) -> Self {
        Self { meta: None, data }
    }
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_report(&mut stdout.lock(), report, format, pretty)
}

pub fn write_report<W: Write>(
    writer: &mut W,
    report: &Report,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            writeln!(writer, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            for row in &report.data {
                writeln!(writer, "{}", serde_json::to_string(row)?)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
