use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// HTTP methods used by the CigoTracker endpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// GET and DELETE requests are always sent without a body.
    pub const fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication strategy applied to outgoing HTTP requests.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    None,
    Basic { username: String, password: String },
}

impl HttpAuth {
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Self::None => {}
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                headers.insert(String::from("authorization"), format!("Basic {encoded}"));
            }
        }
    }
}

impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// HTTP request envelope handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: 30_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
        auth.apply(&mut self.headers);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract: the one primitive the connector needs from its host.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("cigotrack/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
                HttpMethod::Put => self.client.put(&request.url),
                HttpMethod::Delete => self.client.delete(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn basic_auth_populates_authorization_header() {
        let request = HttpRequest::get("https://example.test/api/v1/ping").with_auth(
            &HttpAuth::Basic {
                username: String::from("user"),
                password: String::from("secret"),
            },
        );

        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Basic dXNlcjpzZWNyZXQ=")
        );
    }

    #[test]
    fn basic_auth_debug_output_hides_password() {
        let auth = HttpAuth::Basic {
            username: String::from("user"),
            password: String::from("secret"),
        };

        let rendered = format!("{auth:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn only_post_and_put_carry_bodies() {
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
    }

    #[tokio::test]
    async fn reqwest_client_sends_method_headers_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/jobs/id/J-7")
                    .header("authorization", "Basic dXNlcjpzZWNyZXQ=")
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({ "city": "Ottawa" }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({ "id": "J-7" }));
            })
            .await;

        let request = HttpRequest::new(HttpMethod::Put, server.url("/api/v1/jobs/id/J-7"))
            .with_header("Content-Type", "application/json")
            .with_auth(&HttpAuth::Basic {
                username: String::from("user"),
                password: String::from("secret"),
            })
            .with_body(r#"{"city":"Ottawa"}"#);

        let response = ReqwestHttpClient::new()
            .execute(request)
            .await
            .expect("request should succeed");

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"id":"J-7"}"#);
    }

    #[tokio::test]
    async fn reqwest_client_reports_non_success_status_without_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/jobs/id/missing");
                then.status(404).body(r#"{"message":"not found"}"#);
            })
            .await;

        let response = ReqwestHttpClient::new()
            .execute(HttpRequest::new(
                HttpMethod::Delete,
                server.url("/api/v1/jobs/id/missing"),
            ))
            .await
            .expect("transport should succeed");

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }
}
