//! reqwest-backed transport for the REST and NerdGraph endpoints

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{GraphQlError, QueryParams, ResponseMetadata, RestResponse, Transport, TransportError};
use crate::config::ApiConfig;

const API_KEY_HEADER: &str = "Api-Key";

/// HTTP client for the platform's REST and NerdGraph APIs
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    rest_url: Url,
    nerdgraph_url: Url,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

impl HttpTransport {
    /// Create a transport from API settings
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| TransportError::Configuration(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: parse_base_url(&config.rest_url)?,
            nerdgraph_url: parse_url(&config.nerdgraph_url)?,
        })
    }

    /// Resolve a REST path against the base URL; absolute URLs (pagination
    /// links) pass through untouched.
    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        self.rest_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send(&self, request: RequestBuilder) -> Result<RestResponse, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(RestResponse {
            metadata: ResponseMetadata {
                status: status.as_u16(),
                headers,
            },
            body,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &QueryParams) -> Result<RestResponse, TransportError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "GET");
        self.send(self.client.get(url).query(query)).await
    }

    async fn post(
        &self,
        path: &str,
        query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "POST");
        self.send(self.client.post(url).query(query).json(body))
            .await
    }

    async fn put(
        &self,
        path: &str,
        query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "PUT");
        self.send(self.client.put(url).query(query).json(body)).await
    }

    async fn delete(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<RestResponse, TransportError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "DELETE");
        self.send(self.client.delete(url).query(query)).await
    }

    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        let payload = json!({ "query": document, "variables": variables });

        debug!(url = %self.nerdgraph_url, "NerdGraph request");
        let response = self
            .send(self.client.post(self.nerdgraph_url.clone()).json(&payload))
            .await?;

        let envelope: GraphQlResponse = serde_json::from_value(response.body)?;
        if !envelope.errors.is_empty() {
            return Err(TransportError::GraphQl(envelope.errors));
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

fn parse_url(raw: &str) -> Result<Url, TransportError> {
    Url::parse(raw).map_err(|e| TransportError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a base URL so that relative joins append to its path
fn parse_base_url(raw: &str) -> Result<Url, TransportError> {
    if raw.ends_with('/') {
        parse_url(raw)
    } else {
        parse_url(&format!("{raw}/"))
    }
}
