//! Backend abstraction for looking up deployed resources.
//!
//! The [`Backend`] trait defines how deployed state is resolved, allowing for
//! different implementations (live cluster, in-memory fixtures for testing).

pub mod cluster;
pub mod memory;

use crate::error::Result;
use crate::types::{DeployedResource, ResourceKind};

/// Backend trait for deployed-state lookups.
pub trait Backend: Send + Sync {
    /// Fetch a deployed resource.
    ///
    /// Returns `Ok(None)` when the resource does not exist. Any other failure
    /// (connectivity, permissions, unexpected API status) is an `Err`.
    fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DeployedResource>>;
}
