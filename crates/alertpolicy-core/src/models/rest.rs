//! REST wire shapes for alert policies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::{to_millis, IncidentPreference, Policy, PolicyId};

/// A policy as the REST API serializes it: numeric id, snake_case fields,
/// timestamps in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPolicy {
    /// Numeric id, omitted on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PolicyId>,

    /// Policy name
    #[serde(default)]
    pub name: String,

    /// Incident rollup setting
    #[serde(default)]
    pub incident_preference: IncidentPreference,

    /// Creation time, epoch milliseconds on the wire
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update time, epoch milliseconds on the wire
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `{"policy": ...}` request and response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPolicyEnvelope {
    /// The wrapped policy
    pub policy: RestPolicy,
}

/// `{"policies": [...]}` list response envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPoliciesEnvelope {
    /// One page of policies
    #[serde(default)]
    pub policies: Vec<RestPolicy>,
}

impl From<&Policy> for RestPolicy {
    fn from(policy: &Policy) -> Self {
        Self {
            id: policy.persisted_id(),
            name: policy.name.clone(),
            incident_preference: policy.incident_preference,
            created_at: policy.created_at.map(to_millis),
            updated_at: policy.updated_at.map(to_millis),
        }
    }
}

impl From<RestPolicy> for Policy {
    fn from(wire: RestPolicy) -> Self {
        Self {
            id: wire.id.filter(|id| *id != 0),
            name: wire.name,
            incident_preference: wire.incident_preference,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl From<&Policy> for RestPolicyEnvelope {
    fn from(policy: &Policy) -> Self {
        Self {
            policy: policy.into(),
        }
    }
}
