//! Canonical alert policy model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tenant-scoping account identifier
pub type AccountId = i64;

/// Server-assigned policy identifier
pub type PolicyId = i64;

/// Truncate a timestamp to the millisecond precision the REST API stores
pub(crate) fn to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Incident rollup setting for an alert policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentPreference {
    /// One open incident per policy
    #[default]
    PerPolicy,
    /// One open incident per condition
    PerCondition,
    /// One open incident per condition and target
    PerConditionAndTarget,
}

impl IncidentPreference {
    /// All preferences, in the order the platform documents them
    pub const ALL: [Self; 3] = [
        Self::PerPolicy,
        Self::PerCondition,
        Self::PerConditionAndTarget,
    ];

    /// Wire name shared by both transports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerPolicy => "PER_POLICY",
            Self::PerCondition => "PER_CONDITION",
            Self::PerConditionAndTarget => "PER_CONDITION_AND_TARGET",
        }
    }
}

impl fmt::Display for IncidentPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for IncidentPreference {
    type Err = Error;

    /// Accepts the wire name in any case, with `-` or `_` separators
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|pref| pref.as_str() == normalized)
            .ok_or_else(|| Error::validation(format!("unknown incident preference: {s}")))
    }
}

/// An alert policy, independent of the transport it travels over.
///
/// Timestamps have millisecond precision; [`Policy::with_timestamps`] and
/// the REST mapping truncate anything finer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Policy {
    /// Server-assigned identifier, absent until the policy is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PolicyId>,

    /// Human-readable name
    pub name: String,

    /// Incident rollup setting
    #[serde(default)]
    pub incident_preference: IncidentPreference,

    /// When the policy was created (REST only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the policy was last updated (REST only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Policy {
    /// Create an unsaved policy
    pub fn new(name: impl Into<String>, incident_preference: IncidentPreference) -> Self {
        Self {
            name: name.into(),
            incident_preference,
            ..Self::default()
        }
    }

    /// Attach an identifier
    #[must_use]
    pub fn with_id(mut self, id: PolicyId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach creation and update times, truncated to milliseconds
    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at.map(to_millis);
        self.updated_at = updated_at.map(to_millis);
        self
    }

    /// The identifier, treating `0` as unassigned
    pub fn persisted_id(&self) -> Option<PolicyId> {
        self.id.filter(|id| *id != 0)
    }

    /// Check that this policy can be sent as a create request
    pub fn validate_for_create(&self) -> Result<()> {
        if let Some(id) = self.persisted_id() {
            return Err(Error::validation(format!(
                "policy id must be absent on create, got {id}"
            )));
        }
        self.validate_name()
    }

    /// Check that this policy can be sent as an update request, returning its id
    pub fn validate_for_update(&self) -> Result<PolicyId> {
        let id = self
            .persisted_id()
            .ok_or_else(|| Error::validation("policy id is required on update"))?;
        self.validate_name()?;
        Ok(id)
    }

    fn validate_name(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("policy name is required"));
        }
        Ok(())
    }
}

/// Server-side filters for listing policies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPoliciesParams {
    /// Restrict results to policies matching this name
    pub name: Option<String>,
}

impl ListPoliciesParams {
    /// Filter by policy name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Render as REST query parameters
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.name
            .iter()
            .map(|name| ("filter[name]".to_string(), name.clone()))
            .collect()
    }
}

/// Outcome of a delete.
///
/// The REST transport echoes the policy as it stood before removal; NerdGraph
/// only confirms the deleted id, so `policy` is `None` there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedPolicy {
    /// Identifier the server confirmed as deleted
    pub id: PolicyId,

    /// Last known shape of the policy, when the transport reports it
    pub policy: Option<Policy>,
}
