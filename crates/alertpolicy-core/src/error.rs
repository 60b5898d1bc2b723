//! Error types for AlertPolicy

use thiserror::Error;

use crate::models::{AccountId, PolicyId};
use crate::transport::TransportError;

/// Result type alias using AlertPolicy's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alert policy operations
#[derive(Error, Debug)]
pub enum Error {
    /// Not found error
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of resource
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not offered by the selected backend
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        /// Backend name
        backend: &'static str,
        /// Operation name
        operation: &'static str,
    },

    /// Failure reported by the transport collaborator
    #[error(
        "{operation} failed for account {account_id} (policy {})",
        .resource_id.map_or_else(|| "-".to_string(), |id| id.to_string())
    )]
    Transport {
        /// Operation that was running
        operation: &'static str,
        /// Account the call was scoped to
        account_id: AccountId,
        /// Policy the call targeted, if any
        resource_id: Option<PolicyId>,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported-operation error
    pub fn unsupported(backend: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }

    /// Wrap a transport failure with the context of the call that produced it.
    ///
    /// A not-found answer for a known policy id becomes [`Error::NotFound`];
    /// everything else stays a [`Error::Transport`].
    pub fn transport(
        operation: &'static str,
        account_id: AccountId,
        resource_id: Option<PolicyId>,
        source: TransportError,
    ) -> Self {
        match resource_id {
            Some(id) if source.is_not_found() => Self::not_found("alert policy", id.to_string()),
            _ => Self::Transport {
                operation,
                account_id,
                resource_id,
                source,
            },
        }
    }

    /// Whether this error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
