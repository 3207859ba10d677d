use cigotrack_core::{ConnectorError, ExecutionError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("failed to read {path}: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Connector(error) => connector_exit_code(error),
            Self::Execution(error) => connector_exit_code(&error.source),
            Self::Serialization(_) => 4,
            Self::Input { .. } | Self::Io(_) => 10,
        }
    }
}

const fn connector_exit_code(error: &ConnectorError) -> u8 {
    match error {
        ConnectorError::Configuration(_) => 2,
        ConnectorError::Serialization(_) => 4,
        ConnectorError::InvalidItem(_) | ConnectorError::Api(_) => 3,
    }
}
