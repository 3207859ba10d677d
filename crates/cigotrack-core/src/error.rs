use serde_json::{json, Value};
use thiserror::Error;

use crate::http_client::{HttpError, HttpResponse};

/// Validation and contract errors exposed by `cigotrack-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid environment '{value}', expected one of production, sandbox")]
    InvalidEnvironment { value: String },
    #[error("missing required credential '{name}'")]
    MissingCredential { name: &'static str },

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' is not a valid date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown resource '{value}', expected one of job, action, itinerary, location, vehicle, operator")]
    UnknownResource { value: String },
    #[error("operation '{operation}' is not supported for resource '{resource}'")]
    UnmappedOperation { resource: String, operation: String },
    #[error("invalid node configuration: {message}")]
    InvalidNodeConfig { message: String },
}

impl ValidationError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEnvironment { .. } => "credentials.invalid_environment",
            Self::MissingCredential { .. } => "credentials.missing",
            Self::MissingField { .. } => "field.missing",
            Self::InvalidDate { .. } => "field.invalid_date",
            Self::InvalidField { .. } => "field.invalid",
            Self::UnknownResource { .. } => "config.unknown_resource",
            Self::UnmappedOperation { .. } => "config.unmapped_operation",
            Self::InvalidNodeConfig { .. } => "config.invalid_node",
        }
    }
}

/// Structured failure of a single CigoTracker API call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    status: Option<u16>,
    body: Option<String>,
    message: String,
}

impl ApiError {
    pub fn from_transport(error: &HttpError) -> Self {
        Self {
            status: None,
            body: None,
            message: format!("CigoTracker API request failed: {}", error.message()),
        }
    }

    pub fn from_response(response: &HttpResponse) -> Self {
        let body = Some(response.body.trim())
            .filter(|body| !body.is_empty())
            .map(str::to_owned);
        Self {
            status: Some(response.status),
            body,
            message: format!(
                "CigoTracker API request failed: upstream returned status {}",
                response.status
            ),
        }
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.status {
            Some(_) => "api.status",
            None => "api.transport",
        }
    }

    /// Status and response body, with the body decoded as JSON when possible.
    pub fn details(&self) -> Value {
        let body = self.body.as_deref().map(|raw| {
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
        });
        json!({
            "status": self.status,
            "body": body,
        })
    }
}

/// Top-level error type for connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Misconfiguration of the node; never suppressed by continue-on-failure.
    #[error("configuration error: {0}")]
    Configuration(ValidationError),

    /// Item-scoped value that could not be shaped into a request.
    #[error("{0}")]
    InvalidItem(ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConnectorError {
    pub const fn configuration(error: ValidationError) -> Self {
        Self::Configuration(error)
    }

    pub const fn invalid_item(error: ValidationError) -> Self {
        Self::InvalidItem(error)
    }

    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(error) | Self::InvalidItem(error) => error.code(),
            Self::Api(error) => error.code(),
            Self::Serialization(_) => "serialization",
        }
    }

    /// Structured detail attached to error output items.
    pub fn details(&self) -> Value {
        match self {
            Self::Api(error) => error.details(),
            _ => Value::Null,
        }
    }
}
