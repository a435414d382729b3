//! # driftkit
//!
//! Detect drift between local Kubernetes `Secret`/`ConfigMap` manifests and
//! the objects deployed in a cluster.
//!
//! This crate provides functionality for:
//! - Loading multi-document manifest files with a strict admission policy
//! - Looking up deployed resources through a pluggable [`Backend`]
//! - Comparing declared and deployed data key by key
//! - Rendering a report with copy-pasteable merge snippets
//!
//! ## Example
//!
//! ```no_run
//! use driftkit::{CheckOutcome, Client, ConnectOptions, KubeBackend, Verdict};
//! use std::path::Path;
//!
//! let backend = KubeBackend::connect(&ConnectOptions::default()).expect("no cluster");
//! let client = Client::with_backend(Box::new(backend));
//! let loaded = driftkit::loader::load_file(Path::new("app-secret.yaml")).expect("bad file");
//!
//! let mut verdict = Verdict::default();
//! for resource in &loaded.resources {
//!     if let CheckOutcome::Compared(differences) = client.check(resource) {
//!         let report = driftkit::report::render(resource, &differences);
//!         print!("{}", report.text);
//!         verdict = verdict.fold(report.verdict);
//!     }
//! }
//! println!("{}", driftkit::report::summary_line(verdict));
//! ```

pub mod backend;
pub mod diff;
pub mod error;
pub mod loader;
pub mod report;
pub mod types;

pub use backend::Backend;
pub use backend::cluster::{ConnectOptions, KubeBackend};
pub use backend::memory::MemoryBackend;
pub use error::{Error, ErrorCategory, Result};
pub use loader::{LoadOutcome, Rejection};
pub use report::ResourceReport;
pub use types::{
    Classification, DataMap, DeployedResource, DifferenceEntry, LocalResource, ResourceKind,
    Verdict,
};

/// Outcome of checking one local resource against the cluster.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Deployed counterpart found and compared; empty means everything matched
    Compared(Vec<DifferenceEntry>),
    /// No deployed counterpart exists
    NotFound,
    /// The lookup failed; the resource was not compared
    FetchFailed(Error),
}

impl CheckOutcome {
    /// Verdict contributed by this outcome. Only comparisons can flip it.
    pub fn verdict(&self) -> Verdict {
        match self {
            CheckOutcome::Compared(differences) => Verdict::from_differences(differences),
            CheckOutcome::NotFound | CheckOutcome::FetchFailed(_) => Verdict::Match,
        }
    }
}

/// High-level client tying a backend to the diff engine.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a client over a backend: [`KubeBackend`] for a live cluster,
    /// [`MemoryBackend`] for fixtures.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch the deployed counterpart of `resource` and compare it.
    ///
    /// The diff engine only runs when the resource exists in the cluster.
    pub fn check(&self, resource: &LocalResource) -> CheckOutcome {
        match self
            .backend
            .fetch(resource.kind(), resource.namespace(), resource.name())
        {
            Ok(Some(deployed)) => CheckOutcome::Compared(diff::compare(
                resource.declared_data(),
                &deployed.resolved_data,
            )),
            Ok(None) => CheckOutcome::NotFound,
            Err(err) => CheckOutcome::FetchFailed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn secret(name: &str, pairs: &[(&str, &str)]) -> LocalResource {
        LocalResource::new(ResourceKind::Secret, name, "prod", data(pairs)).unwrap()
    }

    #[test]
    fn test_check_match() {
        let backend = MemoryBackend::new().with_resource(
            ResourceKind::Secret,
            "prod",
            "db",
            data(&[("A", "1")]),
        );
        let client = Client::with_backend(Box::new(backend));

        let outcome = client.check(&secret("db", &[("A", "1")]));
        assert!(matches!(outcome, CheckOutcome::Compared(ref d) if d.is_empty()));
        assert_eq!(outcome.verdict(), Verdict::Match);
    }

    #[test]
    fn test_check_difference() {
        let backend = MemoryBackend::new().with_resource(
            ResourceKind::Secret,
            "prod",
            "db",
            data(&[("A", "2")]),
        );
        let client = Client::with_backend(Box::new(backend));

        let outcome = client.check(&secret("db", &[("A", "1")]));
        assert_eq!(outcome.verdict(), Verdict::Differences);
    }

    #[test]
    fn test_check_not_found_is_distinct_from_empty() {
        let backend =
            MemoryBackend::new().with_resource(ResourceKind::Secret, "prod", "empty", DataMap::new());
        let client = Client::with_backend(Box::new(backend));

        let outcome = client.check(&secret("missing", &[("B", "x")]));
        assert!(matches!(outcome, CheckOutcome::NotFound));
        assert_eq!(outcome.verdict(), Verdict::Match);

        let outcome = client.check(&secret("empty", &[("B", "x")]));
        assert!(matches!(outcome, CheckOutcome::Compared(ref d) if d.len() == 1));
        assert_eq!(outcome.verdict(), Verdict::Differences);
    }

    #[test]
    fn test_check_fetch_failure_does_not_flip_verdict() {
        let backend =
            MemoryBackend::new().with_failure(ResourceKind::Secret, "prod", "db", "forbidden");
        let client = Client::with_backend(Box::new(backend));

        let outcome = client.check(&secret("db", &[("A", "1")]));
        assert!(matches!(outcome, CheckOutcome::FetchFailed(_)));
        assert_eq!(outcome.verdict(), Verdict::Match);
    }
}
