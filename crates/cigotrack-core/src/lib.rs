//! # CigoTrack Core
//!
//! Connector for the CigoTracker delivery-tracking REST API.
//!
//! A node call names a resource and an operation plus the fields legal for
//! that pair. For every input item the connector builds a request body,
//! sends exactly one authenticated HTTP call and turns the response into
//! output items paired with the item that produced them.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`body`] | Request body shaping and lenient/strict field drops |
//! | [`client`] | Authenticated API adapter (base URL, headers, Basic auth) |
//! | [`credentials`] | Account credentials and environment selection |
//! | [`dispatch`] | Node call to method, path and body |
//! | [`error`] | Validation, API and connector errors |
//! | [`executor`] | Per-item execution loop |
//! | [`fields`] | Typed node calls per `(resource, operation)` |
//! | [`http_client`] | HTTP transport abstraction and reqwest client |
//! | [`normalize`] | Response to output items |
//! | [`params`] | Per-item parameter resolution and node config |
//! | [`routes`] | Resource tags and the endpoint table |
//! | [`transform`] | Date, time window, coordinate, list and JSON transforms |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cigotrack_core::{
//!     BodyBuilder, CigoClient, Credentials, Dispatcher, ExecutionOptions, Executor, NodeCall,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CigoClient::new(Credentials::from_env()?);
//!     let executor = Executor::new(
//!         Dispatcher::new(client, BodyBuilder::lenient()),
//!         ExecutionOptions::default(),
//!     );
//!
//!     let ping = NodeCall::from_value(serde_json::json!({
//!         "resource": "job",
//!         "operation": "ping",
//!     }))?;
//!     let output = executor.run(Vec::new(), &ping).await?;
//!     println!("{:?}", output.items);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! InputItem ──▶ ParameterSource ──▶ NodeCall
//!                                     │
//!                                     ▼
//!                         Dispatcher (route + BodyBuilder)
//!                                     │
//!                                     ▼
//!                         CigoClient ──▶ HttpClient
//!                                     │
//!                                     ▼
//!                         normalize ──▶ OutputItem*
//! ```

pub mod body;
pub mod client;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod fields;
pub mod http_client;
pub mod normalize;
pub mod params;
pub mod routes;
pub mod transform;

pub use body::{BodyBuilder, BuiltBody, FieldWarning};
pub use client::{CigoClient, DEFAULT_TIMEOUT_MS};
pub use credentials::{Credentials, Environment, API_PREFIX};
pub use dispatch::{Dispatched, Dispatcher, RequestPlan};
pub use error::{ApiError, ConnectorError, ValidationError};
pub use executor::{ExecutionError, ExecutionOptions, Executor, ItemState, ItemWarning, RunOutput};
pub use fields::NodeCall;
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use normalize::{normalize, OutputItem};
pub use params::{InputItem, ItemTemplate, NodeConfig, ParameterSource};
pub use routes::{Resource, Route, ROUTES};
pub use transform::{Coordinates, TimeFrame};
