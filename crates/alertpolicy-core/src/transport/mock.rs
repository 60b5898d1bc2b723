//! Scripted transport and pager for backend tests

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::{
    Pager, Paging, QueryParams, ResponseMetadata, RestResponse, Transport, TransportError,
};

/// A request observed by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Get {
        path: String,
        query: Vec<(String, String)>,
    },
    Post {
        path: String,
        body: Value,
    },
    Put {
        path: String,
        body: Value,
    },
    Delete {
        path: String,
    },
    Query {
        document: String,
        variables: Value,
    },
}

/// Transport that replays queued responses and records every call
#[derive(Default)]
pub(crate) struct MockTransport {
    rest: Mutex<VecDeque<Result<RestResponse, TransportError>>>,
    graphql: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_rest(&self, body: Value) {
        self.push_rest_result(Ok(RestResponse {
            metadata: ResponseMetadata {
                status: 200,
                ..ResponseMetadata::default()
            },
            body,
        }));
    }

    pub(crate) fn push_rest_result(&self, result: Result<RestResponse, TransportError>) {
        self.rest.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_graphql(&self, data: Value) {
        self.push_graphql_result(Ok(data));
    }

    pub(crate) fn push_graphql_result(&self, result: Result<Value, TransportError>) {
        self.graphql.lock().unwrap().push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_rest(&self, call: Call) -> Result<RestResponse, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.rest
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Configuration("no scripted REST response".into())))
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: &QueryParams) -> Result<RestResponse, TransportError> {
        self.next_rest(Call::Get {
            path: path.to_string(),
            query: query.to_vec(),
        })
    }

    async fn post(
        &self,
        path: &str,
        _query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError> {
        self.next_rest(Call::Post {
            path: path.to_string(),
            body: body.clone(),
        })
    }

    async fn put(
        &self,
        path: &str,
        _query: &QueryParams,
        body: &Value,
    ) -> Result<RestResponse, TransportError> {
        self.next_rest(Call::Put {
            path: path.to_string(),
            body: body.clone(),
        })
    }

    async fn delete(
        &self,
        path: &str,
        _query: &QueryParams,
    ) -> Result<RestResponse, TransportError> {
        self.next_rest(Call::Delete {
            path: path.to_string(),
        })
    }

    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call::Query {
            document: document.to_string(),
            variables,
        });
        self.graphql
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Configuration("no scripted GraphQL response".into())))
    }
}

/// Pager that hands out a fixed sequence of next links, then none
#[derive(Default)]
pub(crate) struct ScriptedPager {
    links: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedPager {
    pub(crate) fn new<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let links = links.into_iter().map(|link| Some(link.into())).collect();
        Self {
            links: Mutex::new(links),
        }
    }
}

impl Pager for ScriptedPager {
    fn parse(&self, _metadata: &ResponseMetadata) -> Paging {
        Paging {
            next: self.links.lock().unwrap().pop_front().flatten(),
        }
    }
}
