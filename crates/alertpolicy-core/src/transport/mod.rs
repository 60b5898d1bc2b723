//! Transport collaborators
//!
//! The policy backends talk to the platform only through [`Transport`] and
//! [`Pager`]. [`HttpTransport`] and [`LinkHeaderPager`] are the production
//! implementations.

mod http;
mod pager;

#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpTransport;
pub use pager::{LinkHeaderPager, Pager, Paging};

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// REST query parameters as ordered key/value pairs
pub type QueryParams = [(String, String)];

/// Status line and headers of a REST response
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
}

/// A decoded REST response
#[derive(Debug, Clone)]
pub struct RestResponse {
    /// Status and headers, used for pagination
    pub metadata: ResponseMetadata,
    /// JSON body, `Null` when the server sent none
    pub body: Value,
}

/// Minimal contract the policy backends require from the platform client
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// GET a REST path or absolute URL
    async fn get(&self, path: &str, query: &QueryParams) -> Result<RestResponse, TransportError>;

    /// POST a JSON body
    async fn post(
        &self,
        path: &str,
        query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError>;

    /// PUT a JSON body
    async fn put(
        &self,
        path: &str,
        query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError>;

    /// DELETE a REST path
    async fn delete(&self, path: &str, query: &QueryParams)
        -> Result<RestResponse, TransportError>;

    /// Run a GraphQL query or mutation, returning its `data` member
    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError>;
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message
    pub message: String,
    /// Vendor extensions, e.g. `{"errorClass": "NOT_FOUND"}`
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// Whether the server classified this error as a missing resource
    pub fn is_not_found(&self) -> bool {
        let classified = self
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("errorClass"))
            .and_then(Value::as_str)
            .is_some_and(|class| class == "NOT_FOUND");

        classified || self.message.to_ascii_lowercase().contains("not found")
    }
}

/// Errors raised by a transport collaborator
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or its body not read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// A body did not match the expected JSON shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The GraphQL response carried a non-empty `errors` array
    #[error("GraphQL request returned errors: {}", format_graphql_errors(.0))]
    GraphQl(Vec<GraphQlError>),

    /// A base URL or path could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The client could not be built from its settings
    #[error("invalid transport configuration: {0}")]
    Configuration(String),
}

impl TransportError {
    /// Whether the remote side reported the target as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 404,
            Self::GraphQl(errors) => errors.iter().any(GraphQlError::is_not_found),
            _ => false,
        }
    }
}

fn format_graphql_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode a JSON body into a wire shape
pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, TransportError> {
    Ok(serde_json::from_value(body)?)
}
