//! Data models for AlertPolicy
//!
//! The canonical [`Policy`] plus the REST and NerdGraph wire shapes, with
//! total conversions between them.

mod nerdgraph;
mod policy;
mod rest;

pub use nerdgraph::*;
pub use policy::*;
pub use rest::*;
