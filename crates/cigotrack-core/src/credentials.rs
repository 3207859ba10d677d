//! Account credentials and environment selection.
//!
//! Credentials are resolved once per run and handed to the client as an
//! explicit value; nothing here is cached in process-global state.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http_client::HttpAuth;
use crate::ValidationError;

pub const ENV_ENVIRONMENT: &str = "CIGOTRACK_ENVIRONMENT";
pub const ENV_ACCOUNT_ID: &str = "CIGOTRACK_ACCOUNT_ID";
pub const ENV_AUTH_KEY: &str = "CIGOTRACK_AUTH_KEY";

/// Path prefix shared by every endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Target CigoTracker deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub const ALL: [Self; 2] = [Self::Production, Self::Sandbox];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        }
    }

    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://app.cigotracker.com",
            Self::Sandbox => "https://app-demo.cigotracker.com",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(ValidationError::InvalidEnvironment {
                value: other.to_owned(),
            }),
        }
    }
}

/// API account credentials used for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    environment: Environment,
    account_id: String,
    auth_key: String,
}

impl Credentials {
    pub fn new(
        environment: Environment,
        account_id: impl Into<String>,
        auth_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let account_id = account_id.into().trim().to_owned();
        let auth_key = auth_key.into();

        if account_id.is_empty() {
            return Err(ValidationError::MissingCredential { name: "account_id" });
        }
        if auth_key.trim().is_empty() {
            return Err(ValidationError::MissingCredential { name: "auth_key" });
        }

        Ok(Self {
            environment,
            account_id,
            auth_key,
        })
    }

    /// Reads `CIGOTRACK_ENVIRONMENT`, `CIGOTRACK_ACCOUNT_ID` and `CIGOTRACK_AUTH_KEY`.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves credentials through an arbitrary variable lookup.
    ///
    /// A missing or blank environment variable selects production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENV_ENVIRONMENT).filter(|value| !value.trim().is_empty()) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };
        let account_id = lookup(ENV_ACCOUNT_ID).unwrap_or_default();
        let auth_key = lookup(ENV_AUTH_KEY).unwrap_or_default();

        Self::new(environment, account_id, auth_key)
    }

    pub const fn environment(&self) -> Environment {
        self.environment
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn basic_auth(&self) -> HttpAuth {
        HttpAuth::Basic {
            username: self.account_id.clone(),
            password: self.auth_key.clone(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("environment", &self.environment)
            .field("account_id", &self.account_id)
            .field("auth_key", &"<redacted>")
            .finish()
    }
}
