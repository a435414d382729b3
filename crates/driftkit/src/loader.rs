//! Loader for multi-document Secret/ConfigMap manifests.
//!
//! A manifest file may hold any number of `---` separated documents:
//! ```text
//! apiVersion: v1
//! kind: Secret
//! metadata:
//!   name: db-credentials
//!   namespace: prod
//! stringData:
//!   PASSWORD: hunter2
//! ---
//! apiVersion: v1
//! kind: ConfigMap
//! metadata:
//!   name: app-config
//!   namespace: prod
//! data:
//!   LOG_LEVEL: info
//! ```
//!
//! Each document is admitted or rejected on its own. Rejections are returned
//! alongside the admitted resources; only invalid YAML fails the whole file.

use crate::error::{Error, Result};
use crate::types::{DataMap, LocalResource, ResourceKind};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Why a document was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Document is not a manifest mapping, or a field has the wrong shape
    #[error("Skipping malformed document: {reason}")]
    Malformed { reason: String },

    /// `kind` is neither `Secret` nor `ConfigMap`
    #[error("Skipping unsupported kind: {kind}")]
    UnsupportedKind { kind: String },

    #[error("Skipping {kind} with missing name")]
    MissingName { kind: ResourceKind },

    #[error("Skipping {kind} with missing namespace")]
    MissingNamespace { kind: ResourceKind },

    /// Declared-data section missing or empty
    #[error("Skipping {kind} '{name}' in namespace '{namespace}' with no '{}'", .kind.merge_field())]
    EmptyData {
        kind: ResourceKind,
        name: String,
        namespace: String,
    },
}

/// Result of loading one manifest file.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Admitted resources, in document order
    pub resources: Vec<LocalResource>,
    /// Rejected documents, in document order
    pub rejections: Vec<Rejection>,
    /// Number of empty documents that were skipped
    pub empty_documents: usize,
}

/// Load manifests from a file path.
pub fn load_file(path: &Path) -> Result<LoadOutcome> {
    let content = std::fs::read_to_string(path)?;
    let display = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_str(&content, &display)
}

/// Load manifests from a string. `file` is only used in error messages.
pub fn load_str(content: &str, file: &str) -> Result<LoadOutcome> {
    check_syntax(content, file)?;

    let mut outcome = LoadOutcome::default();

    // Two readers over the same stream: one for the document structure, one
    // for the scalar text of the fields that end up in the resource.
    let structure = serde_yaml::Deserializer::from_str(content);
    let literal = serde_yaml::Deserializer::from_str(content);

    for (document, literal) in structure.zip(literal) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                outcome.rejections.push(malformed(&e.to_string()));
                continue;
            }
        };

        if value.is_null() {
            outcome.empty_documents += 1;
            continue;
        }

        match admit(&value, literal) {
            Ok(resource) => outcome.resources.push(resource),
            Err(rejection) => outcome.rejections.push(rejection),
        }
    }

    Ok(outcome)
}

/// Fail on the first document that is not valid YAML.
///
/// Errors past this point (duplicate keys, wrong shapes) only affect the
/// document they occur in.
fn check_syntax(content: &str, file: &str) -> Result<()> {
    for document in serde_yaml::Deserializer::from_str(content) {
        IgnoredAny::deserialize(document).map_err(|source| Error::Yaml {
            file: file.to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Apply the admission policy to a single parsed document.
fn admit(
    doc: &Value,
    literal: serde_yaml::Deserializer<'_>,
) -> std::result::Result<LocalResource, Rejection> {
    if !doc.is_mapping() {
        return Err(malformed("document is not a mapping"));
    }

    let kind = match doc.get("kind") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(malformed("'kind' is not a string")),
    };
    let kind = ResourceKind::from_kind(&kind).ok_or(Rejection::UnsupportedKind { kind })?;

    match doc.get("metadata") {
        None | Some(Value::Null) => {}
        Some(meta) if meta.is_mapping() => {
            check_scalar(meta.get("name"), "metadata.name")?;
            check_scalar(meta.get("namespace"), "metadata.namespace")?;
        }
        Some(_) => return Err(malformed("'metadata' is not a mapping")),
    }
    check_section(doc, kind.merge_field())?;

    let (metadata, data) =
        read_literal(kind, literal).map_err(|e| malformed(&e.to_string()))?;

    LocalResource::new(
        kind,
        metadata.name.unwrap_or_default(),
        metadata.namespace.unwrap_or_default(),
        data,
    )
}

fn check_scalar(value: Option<&Value>, path: &str) -> std::result::Result<(), Rejection> {
    match value {
        Some(value) if !is_scalar(value) => Err(malformed(&format!("'{path}' is not a scalar"))),
        _ => Ok(()),
    }
}

/// The declared-data section must map scalar keys to scalar values.
fn check_section(doc: &Value, field: &str) -> std::result::Result<(), Rejection> {
    let mapping = match doc.get(field) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Mapping(m)) => m,
        Some(_) => return Err(malformed(&format!("'{field}' is not a mapping"))),
    };

    for (key, value) in mapping {
        if !is_scalar(key) {
            return Err(malformed(&format!("'{field}' has a non-scalar key")));
        }
        if !is_scalar(value) {
            let key = key.as_str().unwrap_or("?");
            return Err(malformed(&format!("'{field}.{key}' is not a scalar")));
        }
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Sequence(_) | Value::Mapping(_) => false,
        Value::Tagged(tagged) => is_scalar(&tagged.value),
        _ => true,
    }
}

/// Scalars as written in the manifest: `1.10` stays `1.10`, `0x1F` stays
/// `0x1F`. Null values read as `None`.
type LiteralMap = BTreeMap<String, Option<String>>;

#[derive(Debug, Default, Deserialize)]
struct LiteralMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct SecretFields {
    metadata: Option<LiteralMetadata>,
    #[serde(rename = "stringData")]
    string_data: Option<LiteralMap>,
}

#[derive(Deserialize)]
struct ConfigMapFields {
    metadata: Option<LiteralMetadata>,
    data: Option<LiteralMap>,
}

/// Read identity and declared data with string-typed targets, which keep the
/// source text of every scalar.
fn read_literal(
    kind: ResourceKind,
    document: serde_yaml::Deserializer<'_>,
) -> std::result::Result<(LiteralMetadata, DataMap), serde_yaml::Error> {
    let (metadata, section) = match kind {
        ResourceKind::Secret => {
            let fields = SecretFields::deserialize(document)?;
            (fields.metadata, fields.string_data)
        }
        ResourceKind::ConfigMap => {
            let fields = ConfigMapFields::deserialize(document)?;
            (fields.metadata, fields.data)
        }
    };

    let data = section
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect();
    Ok((metadata.unwrap_or_default(), data))
}

fn malformed(reason: &str) -> Rejection {
    Rejection::Malformed {
        reason: reason.to_string(),
    }
}
