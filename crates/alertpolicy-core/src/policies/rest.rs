//! REST backend for alert policies

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::{BackendKind, PolicyBackend};
use crate::error::{Error, Result};
use crate::models::{
    AccountId, DeletedPolicy, ListPoliciesParams, Policy, PolicyId, RestPoliciesEnvelope,
    RestPolicyEnvelope,
};
use crate::transport::{decode, Pager, Transport, TransportError};

const POLICIES_PATH: &str = "/alerts_policies.json";

fn policy_path(id: PolicyId) -> String {
    format!("/alerts_policies/{id}.json")
}

/// Alert policies over the paginated REST API.
///
/// The REST API key already scopes requests to one account, so `account_id`
/// only feeds logs and error context here.
pub struct RestPolicies {
    transport: Arc<dyn Transport>,
    pager: Arc<dyn Pager>,
}

impl RestPolicies {
    /// Create a REST backend
    pub fn new(transport: Arc<dyn Transport>, pager: Arc<dyn Pager>) -> Self {
        Self { transport, pager }
    }
}

fn encode(policy: &Policy) -> std::result::Result<Value, TransportError> {
    Ok(serde_json::to_value(RestPolicyEnvelope::from(policy))?)
}

#[async_trait::async_trait]
impl PolicyBackend for RestPolicies {
    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn list(&self, account_id: AccountId, params: &ListPoliciesParams) -> Result<Vec<Policy>> {
        let wrap = |e| Error::transport("list", account_id, None, e);

        let mut policies = Vec::new();
        let mut next = Some(POLICIES_PATH.to_string());
        // Next links already carry the filter
        let mut query = params.to_query();
        let mut page = 0usize;

        while let Some(url) = next.take() {
            page += 1;
            let response = self.transport.get(&url, &query).await.map_err(wrap)?;
            next = self
                .pager
                .parse(&response.metadata)
                .next
                .filter(|link| !link.is_empty());

            let envelope: RestPoliciesEnvelope = decode(response.body).map_err(wrap)?;
            debug!(account_id, page, count = envelope.policies.len(), "Fetched alert policy page");

            policies.extend(envelope.policies.into_iter().map(Policy::from));
            query.clear();
        }

        Ok(policies)
    }

    /// There is no single-policy REST endpoint, so this scans the full list.
    async fn get(&self, account_id: AccountId, id: PolicyId) -> Result<Policy> {
        let policies = self.list(account_id, &ListPoliciesParams::default()).await?;

        policies
            .into_iter()
            .find(|policy| policy.id == Some(id))
            .ok_or_else(|| Error::not_found("alert policy", id.to_string()))
    }

    async fn create(&self, account_id: AccountId, policy: &Policy) -> Result<Policy> {
        let wrap = |e| Error::transport("create", account_id, None, e);

        let body = encode(policy).map_err(wrap)?;
        let response = self
            .transport
            .post(POLICIES_PATH, &[], &body)
            .await
            .map_err(wrap)?;
        let envelope: RestPolicyEnvelope = decode(response.body).map_err(wrap)?;

        let created = Policy::from(envelope.policy);
        info!(account_id, policy_id = ?created.id, "Created alert policy");
        Ok(created)
    }

    async fn update(&self, account_id: AccountId, id: PolicyId, policy: &Policy) -> Result<Policy> {
        let wrap = |e| Error::transport("update", account_id, Some(id), e);

        let body = encode(policy).map_err(wrap)?;
        let response = self
            .transport
            .put(&policy_path(id), &[], &body)
            .await
            .map_err(wrap)?;
        let envelope: RestPolicyEnvelope = decode(response.body).map_err(wrap)?;

        info!(account_id, policy_id = id, "Updated alert policy");
        Ok(envelope.policy.into())
    }

    async fn delete(&self, account_id: AccountId, id: PolicyId) -> Result<DeletedPolicy> {
        let wrap = |e| Error::transport("delete", account_id, Some(id), e);

        let response = self
            .transport
            .delete(&policy_path(id), &[])
            .await
            .map_err(wrap)?;
        let envelope: Option<RestPolicyEnvelope> = decode(response.body).map_err(wrap)?;

        info!(account_id, policy_id = id, "Deleted alert policy");
        Ok(DeletedPolicy {
            id,
            policy: envelope.map(|e| e.policy.into()),
        })
    }
}
