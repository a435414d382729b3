//! Core types for drift detection.

use crate::loader::Rejection;
use std::collections::BTreeMap;

/// Key/value payload of a Secret or ConfigMap.
pub type DataMap = BTreeMap<String, String>;

/// Kind of resource that can be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Kubernetes `Secret`
    Secret,
    /// Kubernetes `ConfigMap`
    ConfigMap,
}

impl ResourceKind {
    /// The `kind` string used in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "Secret",
            ResourceKind::ConfigMap => "ConfigMap",
        }
    }

    /// Parse a manifest `kind` string. Matching is exact.
    pub fn from_kind(s: &str) -> Option<Self> {
        match s {
            "Secret" => Some(ResourceKind::Secret),
            "ConfigMap" => Some(ResourceKind::ConfigMap),
            _ => None,
        }
    }

    /// Manifest section holding the declared data, also used as the
    /// top-level key of rendered merge snippets.
    pub fn merge_field(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "stringData",
            ResourceKind::ConfigMap => "data",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity and declared data shared by every local resource variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared {
    name: String,
    namespace: String,
    data: DataMap,
}

/// A resource declared in a local manifest.
///
/// Only constructed through [`LocalResource::new`] (or the loader, which calls it),
/// so name, namespace and declared data are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalResource {
    /// A `Secret` declaring `stringData`
    Secret(Declared),
    /// A `ConfigMap` declaring `data`
    ConfigMap(Declared),
}

impl LocalResource {
    /// Validate and build a local resource.
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        data: DataMap,
    ) -> Result<Self, Rejection> {
        let name = name.into();
        let namespace = namespace.into();

        if name.is_empty() {
            return Err(Rejection::MissingName { kind });
        }
        if namespace.is_empty() {
            return Err(Rejection::MissingNamespace { kind });
        }
        if data.is_empty() {
            return Err(Rejection::EmptyData {
                kind,
                name,
                namespace,
            });
        }

        let declared = Declared {
            name,
            namespace,
            data,
        };
        Ok(match kind {
            ResourceKind::Secret => LocalResource::Secret(declared),
            ResourceKind::ConfigMap => LocalResource::ConfigMap(declared),
        })
    }

    fn declared(&self) -> &Declared {
        match self {
            LocalResource::Secret(d) | LocalResource::ConfigMap(d) => d,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            LocalResource::Secret(_) => ResourceKind::Secret,
            LocalResource::ConfigMap(_) => ResourceKind::ConfigMap,
        }
    }

    pub fn name(&self) -> &str {
        &self.declared().name
    }

    pub fn namespace(&self) -> &str {
        &self.declared().namespace
    }

    pub fn declared_data(&self) -> &DataMap {
        &self.declared().data
    }

    pub fn merge_field(&self) -> &'static str {
        self.kind().merge_field()
    }
}

/// A resource as currently deployed in the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedResource {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    /// Resolved key/value data (Secret bytes already decoded)
    pub resolved_data: DataMap,
}

impl DeployedResource {
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        resolved_data: DataMap,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            resolved_data,
        }
    }
}

/// How a single differing key was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Present on both sides with different values
    Different,
    /// Present only in the local manifest
    OnlyInLocal,
    /// Present only in the cluster
    OnlyInDeployed,
}

impl Classification {
    /// Tag used in the textual report.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Different => "DIFFERENT",
            Classification::OnlyInLocal => "ONLY IN LOCAL",
            Classification::OnlyInDeployed => "ONLY IN DEPLOYED",
        }
    }
}

/// A key whose value differs between the local manifest and the cluster.
///
/// At least one side is always present, and when both are they differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceEntry {
    pub key: String,
    pub local: Option<String>,
    pub deployed: Option<String>,
}

impl DifferenceEntry {
    pub fn classification(&self) -> Classification {
        match (&self.local, &self.deployed) {
            (Some(_), Some(_)) => Classification::Different,
            (Some(_), None) => Classification::OnlyInLocal,
            (None, _) => Classification::OnlyInDeployed,
        }
    }
}

/// Run-wide outcome of all comparisons.
///
/// Starts as [`Verdict::Match`] and only ever moves to [`Verdict::Differences`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Match,
    Differences,
}

impl Verdict {
    /// Verdict contributed by a single comparison.
    pub fn from_differences(differences: &[DifferenceEntry]) -> Self {
        if differences.is_empty() {
            Verdict::Match
        } else {
            Verdict::Differences
        }
    }

    /// Combine two verdicts; differences are sticky.
    pub fn fold(self, other: Verdict) -> Self {
        match (self, other) {
            (Verdict::Match, Verdict::Match) => Verdict::Match,
            _ => Verdict::Differences,
        }
    }

    pub fn has_differences(&self) -> bool {
        *self == Verdict::Differences
    }
}
