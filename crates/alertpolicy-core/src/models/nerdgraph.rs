//! NerdGraph wire shapes for alert policies
//!
//! NerdGraph encodes ids as GraphQL `ID` values (numeric strings), uses
//! camelCase field names and carries no timestamps.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::policy::{IncidentPreference, Policy, PolicyId};

/// A policy as NerdGraph returns it
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NerdGraphPolicy {
    /// Policy id, a numeric string on the wire
    #[serde_as(as = "DisplayFromStr")]
    pub id: PolicyId,

    /// Policy name
    pub name: String,

    /// Incident rollup setting
    pub incident_preference: IncidentPreference,
}

/// Create and update input: only the client-mutable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NerdGraphPolicyInput {
    /// Policy name
    pub name: String,

    /// Incident rollup setting
    pub incident_preference: IncidentPreference,
}

/// Render a policy id as a GraphQL `ID`
pub fn graphql_id(id: PolicyId) -> String {
    id.to_string()
}

impl From<&Policy> for NerdGraphPolicy {
    fn from(policy: &Policy) -> Self {
        Self {
            id: policy.persisted_id().unwrap_or_default(),
            name: policy.name.clone(),
            incident_preference: policy.incident_preference,
        }
    }
}

impl From<NerdGraphPolicy> for Policy {
    fn from(wire: NerdGraphPolicy) -> Self {
        Self {
            id: (wire.id != 0).then_some(wire.id),
            name: wire.name,
            incident_preference: wire.incident_preference,
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<&Policy> for NerdGraphPolicyInput {
    fn from(policy: &Policy) -> Self {
        Self {
            name: policy.name.clone(),
            incident_preference: policy.incident_preference,
        }
    }
}
