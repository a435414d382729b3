//! In-memory backend, used for tests and offline fixtures.

use super::Backend;
use crate::error::{Error, Result};
use crate::types::{DataMap, DeployedResource, ResourceKind};
use std::collections::HashMap;

type Key = (ResourceKind, String, String);

/// Backend serving deployed resources from memory.
///
/// Lookups for resources that were never inserted report "absent". Failures
/// can be injected per resource to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    resources: HashMap<Key, DataMap>,
    failures: HashMap<Key, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deployed resource.
    pub fn with_resource(
        mut self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        data: DataMap,
    ) -> Self {
        self.resources
            .insert((kind, namespace.to_string(), name.to_string()), data);
        self
    }

    /// Make lookups of a resource fail with a network error.
    pub fn with_failure(
        mut self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        message: &str,
    ) -> Self {
        self.failures.insert(
            (kind, namespace.to_string(), name.to_string()),
            message.to_string(),
        );
        self
    }
}

impl Backend for MemoryBackend {
    fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DeployedResource>> {
        let key = (kind, namespace.to_string(), name.to_string());

        if let Some(message) = self.failures.get(&key) {
            return Err(Error::Network {
                message: message.clone(),
            });
        }

        Ok(self
            .resources
            .get(&key)
            .map(|data| DeployedResource::new(kind, name, namespace, data.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_resource() {
        let backend = MemoryBackend::new();
        let result = backend.fetch(ResourceKind::Secret, "ns", "db").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        let backend =
            MemoryBackend::new().with_resource(ResourceKind::ConfigMap, "ns", "app", DataMap::new());

        assert!(
            backend
                .fetch(ResourceKind::ConfigMap, "ns", "app")
                .unwrap()
                .is_some()
        );
        assert!(
            backend
                .fetch(ResourceKind::Secret, "ns", "app")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_empty_data_is_not_absent() {
        let backend =
            MemoryBackend::new().with_resource(ResourceKind::Secret, "ns", "db", DataMap::new());
        let deployed = backend.fetch(ResourceKind::Secret, "ns", "db").unwrap().unwrap();
        assert!(deployed.resolved_data.is_empty());
        assert_eq!(deployed.name, "db");
        assert_eq!(deployed.namespace, "ns");
    }

    #[test]
    fn test_injected_failure() {
        let backend = MemoryBackend::new().with_failure(
            ResourceKind::Secret,
            "ns",
            "db",
            "connection refused",
        );
        let err = backend.fetch(ResourceKind::Secret, "ns", "db").unwrap_err();
        assert!(err.is_fetch_failure());
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}
