//! # AlertPolicy
//!
//! Client for alert policies exposed through two transports.
//!
//! The platform serves the same alert policy resource over a paginated
//! REST/JSON API and over NerdGraph, its GraphQL API. This crate presents
//! one typed interface over both and lets each operation pick its
//! transport once, at construction.
//!
//! ## Architecture
//!
//! - **Models**: the canonical [`Policy`] and its REST and NerdGraph wire shapes
//! - **Policies**: the [`Policies`] facade and its two backends
//! - **Transport**: the HTTP client and pagination collaborators
//!
//! ## Quick Start
//!
//! ```no_run
//! use alertpolicy::prelude::*;
//!
//! # async fn run() -> alertpolicy::Result<()> {
//! let config = Config::load(None)?;
//! let policies = Policies::from_config(&config)?;
//!
//! let created = policies
//!     .create(2_520_528, Policy::new("cpu-high", IncidentPreference::PerCondition))
//!     .await?;
//! println!("created policy {:?}", created.id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod models;
pub mod policies;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{DeletedPolicy, IncidentPreference, ListPoliciesParams, Policy};
pub use policies::{BackendKind, BackendRouting, Policies, PolicyBackend};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::policies::{BackendKind, BackendRouting, Policies, PolicyBackend};
    pub use crate::transport::{HttpTransport, LinkHeaderPager, Pager, Transport};
}
