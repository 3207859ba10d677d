use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::credentials::{Credentials, API_PREFIX};
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};
use crate::{ApiError, ConnectorError};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Authenticated CigoTracker API adapter.
///
/// Attaches the environment base URL, `/api/v1` prefix, JSON headers and
/// Basic credentials to every call. Non-2xx responses and transport
/// failures surface as [`ApiError`]; nothing is retried.
#[derive(Clone)]
pub struct CigoClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Credentials,
    base_url: String,
    timeout_ms: u64,
}

impl CigoClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_http_client(credentials, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(credentials: Credentials, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: credentials.environment().base_url().to_owned(),
            credentials,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Points the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Builds the wire request. GET/DELETE and empty bodies go out bare.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Map<String, Value>>,
    ) -> Result<HttpRequest, ConnectorError> {
        let mut request = HttpRequest::new(method, self.url_for(path))
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json")
            .with_auth(&self.credentials.basic_auth())
            .with_timeout_ms(self.timeout_ms);

        if let Some(body) = body.filter(|body| method.allows_body() && !body.is_empty()) {
            request = request.with_body(serde_json::to_string(body)?);
        }

        Ok(request)
    }

    /// Sends one call and decodes the response body.
    ///
    /// An empty body decodes to `null`; a body that is not JSON is returned
    /// as a JSON string.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Map<String, Value>>,
    ) -> Result<Value, ConnectorError> {
        let request = self.build_request(method, path, body)?;
        debug!(method = %method, url = %request.url, has_body = request.body.is_some(), "sending request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(method = %method, path, error = %error, "transport failure");
            ApiError::from_transport(&error)
        })?;
        debug!(status = response.status, "received response");

        if !response.is_success() {
            warn!(method = %method, path, status = response.status, "non-success status");
            return Err(ApiError::from_response(&response).into());
        }

        let raw = response.body.trim();
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())))
    }
}

impl std::fmt::Debug for CigoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CigoClient")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
