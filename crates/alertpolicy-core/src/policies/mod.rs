//! Alert policy operations
//!
//! [`Policies`] is the entry point. Each of its operations is bound to one
//! [`PolicyBackend`] when it is built, according to a [`BackendRouting`]; the
//! binding never changes afterwards and a failing backend is never retried
//! through the other one.

mod nerdgraph;
mod rest;

pub use nerdgraph::NerdGraphPolicies;
pub use rest::RestPolicies;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AccountId, DeletedPolicy, ListPoliciesParams, Policy, PolicyId};
use crate::transport::{HttpTransport, LinkHeaderPager, Pager, Transport};

/// Which transport an operation goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Paginated REST/JSON API
    #[default]
    Rest,
    /// NerdGraph GraphQL API
    NerdGraph,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => f.write_str("rest"),
            Self::NerdGraph => f.write_str("nerdgraph"),
        }
    }
}

/// Backend chosen for each operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackendRouting {
    /// Backend for `list`
    pub list: BackendKind,
    /// Backend for `get`
    pub get: BackendKind,
    /// Backend for `create`
    pub create: BackendKind,
    /// Backend for `update`
    pub update: BackendKind,
    /// Backend for `delete`
    pub delete: BackendKind,
}

impl BackendRouting {
    /// Route every operation to the same backend
    pub fn uniform(kind: BackendKind) -> Self {
        Self {
            list: kind,
            get: kind,
            create: kind,
            update: kind,
            delete: kind,
        }
    }
}

/// One transport-specific implementation of the policy operations
#[async_trait::async_trait]
pub trait PolicyBackend: Send + Sync {
    /// Which transport this backend uses
    fn kind(&self) -> BackendKind;

    /// List the account's policies matching `params`
    async fn list(&self, account_id: AccountId, params: &ListPoliciesParams) -> Result<Vec<Policy>>;

    /// Fetch one policy
    async fn get(&self, account_id: AccountId, id: PolicyId) -> Result<Policy>;

    /// Create a policy; the result carries the server-assigned id
    async fn create(&self, account_id: AccountId, policy: &Policy) -> Result<Policy>;

    /// Replace the mutable fields of policy `id`
    async fn update(&self, account_id: AccountId, id: PolicyId, policy: &Policy) -> Result<Policy>;

    /// Delete policy `id`
    async fn delete(&self, account_id: AccountId, id: PolicyId) -> Result<DeletedPolicy>;
}

/// Alert policy operations facade
#[derive(Clone)]
pub struct Policies {
    routing: BackendRouting,
    list: Arc<dyn PolicyBackend>,
    get: Arc<dyn PolicyBackend>,
    create: Arc<dyn PolicyBackend>,
    update: Arc<dyn PolicyBackend>,
    delete: Arc<dyn PolicyBackend>,
}

impl Policies {
    /// Bind each operation to a backend according to `routing`
    pub fn new(
        routing: BackendRouting,
        rest: Arc<dyn PolicyBackend>,
        nerdgraph: Arc<dyn PolicyBackend>,
    ) -> Self {
        let pick = |kind: BackendKind| -> Arc<dyn PolicyBackend> {
            match kind {
                BackendKind::Rest => Arc::clone(&rest),
                BackendKind::NerdGraph => Arc::clone(&nerdgraph),
            }
        };

        Self {
            routing,
            list: pick(routing.list),
            get: pick(routing.get),
            create: pick(routing.create),
            update: pick(routing.update),
            delete: pick(routing.delete),
        }
    }

    /// Build both backends over a shared transport
    pub fn with_transport(
        routing: BackendRouting,
        transport: Arc<dyn Transport>,
        pager: Arc<dyn Pager>,
    ) -> Self {
        let rest = Arc::new(RestPolicies::new(Arc::clone(&transport), pager));
        let nerdgraph = Arc::new(NerdGraphPolicies::new(transport));
        Self::new(routing, rest, nerdgraph)
    }

    /// Build an HTTP-backed facade from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.api)
            .map_err(|e| Error::config(format!("could not build HTTP transport: {e}")))?;

        info!(
            rest_url = %config.api.rest_url,
            nerdgraph_url = %config.api.nerdgraph_url,
            "Alert policy client ready"
        );
        Ok(Self::with_transport(
            config.routing,
            Arc::new(transport),
            Arc::new(LinkHeaderPager),
        ))
    }

    /// The routing this facade was built with
    pub fn routing(&self) -> BackendRouting {
        self.routing
    }

    /// List all policies matching `params`
    pub async fn list(&self, account_id: AccountId, params: &ListPoliciesParams) -> Result<Vec<Policy>> {
        debug!(account_id, backend = %self.list.kind(), filter = ?params.name, "Listing alert policies");
        let policies = self.list.list(account_id, params).await?;
        debug!(account_id, count = policies.len(), "Listed alert policies");
        Ok(policies)
    }

    /// Fetch one policy, failing with [`Error::NotFound`] if it does not exist
    pub async fn get(&self, account_id: AccountId, id: PolicyId) -> Result<Policy> {
        debug!(account_id, policy_id = id, backend = %self.get.kind(), "Fetching alert policy");
        self.get.get(account_id, id).await
    }

    /// Create a policy. Its id must be unset and its name non-blank.
    pub async fn create(&self, account_id: AccountId, policy: Policy) -> Result<Policy> {
        policy.validate_for_create()?;
        debug!(account_id, name = %policy.name, backend = %self.create.kind(), "Creating alert policy");
        self.create.create(account_id, &policy).await
    }

    /// Replace the name and incident preference of an existing policy
    pub async fn update(&self, account_id: AccountId, policy: Policy) -> Result<Policy> {
        let id = policy.validate_for_update()?;
        debug!(account_id, policy_id = id, backend = %self.update.kind(), "Updating alert policy");
        self.update.update(account_id, id, &policy).await
    }

    /// Delete a policy. Deleting the same id twice fails with [`Error::NotFound`].
    pub async fn delete(&self, account_id: AccountId, id: PolicyId) -> Result<DeletedPolicy> {
        debug!(account_id, policy_id = id, backend = %self.delete.kind(), "Deleting alert policy");
        self.delete.delete(account_id, id).await
    }
}
