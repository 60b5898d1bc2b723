//! NerdGraph (GraphQL) backend for alert policies

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use serde_with::{serde_as, DisplayFromStr};
use tracing::info;

use super::{BackendKind, PolicyBackend};
use crate::error::{Error, Result};
use crate::models::{
    graphql_id, AccountId, DeletedPolicy, ListPoliciesParams, NerdGraphPolicy,
    NerdGraphPolicyInput, Policy, PolicyId,
};
use crate::transport::{decode, Transport};

const POLICY_FIELDS: &str = "
        id
        name
        incidentPreference";

fn policy_query() -> String {
    format!(
        "query($accountID: Int!, $policyID: ID!) {{
  actor {{
    account(id: $accountID) {{
      alerts {{
        policy(id: $policyID) {{{POLICY_FIELDS}
        }}
      }}
    }}
  }}
}}"
    )
}

fn create_mutation() -> String {
    format!(
        "mutation CreatePolicy($accountID: Int!, $policy: AlertsPolicyInput!) {{
  alertsPolicyCreate(accountId: $accountID, policy: $policy) {{{POLICY_FIELDS}
  }}
}}"
    )
}

fn update_mutation() -> String {
    format!(
        "mutation UpdatePolicy($accountID: Int!, $policyID: ID!, $policy: AlertsPolicyUpdateInput!) {{
  alertsPolicyUpdate(accountId: $accountID, id: $policyID, policy: $policy) {{{POLICY_FIELDS}
  }}
}}"
    )
}

const DELETE_MUTATION: &str = "mutation DeletePolicy($accountID: Int!, $policyID: ID!) {
  alertsPolicyDelete(accountId: $accountID, id: $policyID) {
    id
  }
}";

#[derive(Deserialize)]
struct PolicyQueryResponse {
    actor: ActorNode,
}

#[derive(Deserialize)]
struct ActorNode {
    account: Option<AccountNode>,
}

#[derive(Deserialize)]
struct AccountNode {
    alerts: Option<AlertsNode>,
}

#[derive(Deserialize)]
struct AlertsNode {
    policy: Option<NerdGraphPolicy>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    alerts_policy_create: Option<NerdGraphPolicy>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    alerts_policy_update: Option<NerdGraphPolicy>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    alerts_policy_delete: Option<DeleteConfirmation>,
}

#[serde_as]
#[derive(Deserialize)]
struct DeleteConfirmation {
    #[serde_as(as = "DisplayFromStr")]
    id: PolicyId,
}

/// Alert policies over NerdGraph.
///
/// NerdGraph has no policy listing in this client, and its delete mutation
/// only confirms the id, so [`DeletedPolicy::policy`] is always `None` here.
pub struct NerdGraphPolicies {
    transport: Arc<dyn Transport>,
}

impl NerdGraphPolicies {
    /// Create a NerdGraph backend
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait::async_trait]
impl PolicyBackend for NerdGraphPolicies {
    fn kind(&self) -> BackendKind {
        BackendKind::NerdGraph
    }

    async fn list(&self, _account_id: AccountId, _params: &ListPoliciesParams) -> Result<Vec<Policy>> {
        Err(Error::unsupported("nerdgraph", "list"))
    }

    async fn get(&self, account_id: AccountId, id: PolicyId) -> Result<Policy> {
        let wrap = |e| Error::transport("get", account_id, Some(id), e);
        let variables = json!({
            "accountID": account_id,
            "policyID": graphql_id(id),
        });

        let data = self
            .transport
            .query(&policy_query(), variables)
            .await
            .map_err(wrap)?;
        let response: PolicyQueryResponse = decode(data).map_err(wrap)?;

        response
            .actor
            .account
            .and_then(|account| account.alerts)
            .and_then(|alerts| alerts.policy)
            .map(Policy::from)
            .ok_or_else(|| Error::not_found("alert policy", id.to_string()))
    }

    async fn create(&self, account_id: AccountId, policy: &Policy) -> Result<Policy> {
        let wrap = |e| Error::transport("create", account_id, None, e);
        let variables = json!({
            "accountID": account_id,
            "policy": NerdGraphPolicyInput::from(policy),
        });

        let data = self
            .transport
            .query(&create_mutation(), variables)
            .await
            .map_err(wrap)?;
        let response: CreateResponse = decode(data).map_err(wrap)?;

        let created = response
            .alerts_policy_create
            .map(Policy::from)
            .ok_or_else(|| Error::validation("alertsPolicyCreate returned no policy"))?;
        info!(account_id, policy_id = ?created.id, "Created alert policy via NerdGraph");
        Ok(created)
    }

    async fn update(&self, account_id: AccountId, id: PolicyId, policy: &Policy) -> Result<Policy> {
        let wrap = |e| Error::transport("update", account_id, Some(id), e);
        let variables = json!({
            "accountID": account_id,
            "policyID": graphql_id(id),
            "policy": NerdGraphPolicyInput::from(policy),
        });

        let data = self
            .transport
            .query(&update_mutation(), variables)
            .await
            .map_err(wrap)?;
        let response: UpdateResponse = decode(data).map_err(wrap)?;

        let updated = response
            .alerts_policy_update
            .map(Policy::from)
            .ok_or_else(|| Error::not_found("alert policy", id.to_string()))?;
        info!(account_id, policy_id = id, "Updated alert policy via NerdGraph");
        Ok(updated)
    }

    async fn delete(&self, account_id: AccountId, id: PolicyId) -> Result<DeletedPolicy> {
        let wrap = |e| Error::transport("delete", account_id, Some(id), e);
        let variables = json!({
            "accountID": account_id,
            "policyID": graphql_id(id),
        });

        let data = self
            .transport
            .query(DELETE_MUTATION, variables)
            .await
            .map_err(wrap)?;
        let response: DeleteResponse = decode(data).map_err(wrap)?;

        let confirmation = response
            .alerts_policy_delete
            .ok_or_else(|| Error::not_found("alert policy", id.to_string()))?;
        info!(account_id, policy_id = confirmation.id, "Deleted alert policy via NerdGraph");
        Ok(DeletedPolicy {
            id: confirmation.id,
            policy: None,
        })
    }
}
