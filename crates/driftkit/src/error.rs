//! Error types for drift detection.
//!
//! Errors are categorized so the caller can tell a broken setup (bad kubeconfig,
//! unparseable manifest file) apart from a single failed lookup against the
//! cluster, which only skips one resource.

use thiserror::Error;

/// Categories of errors, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level failure talking to the API server
    Network,
    /// Credentials rejected or RBAC denied the lookup
    Permission,
    /// API server answered with an unexpected status
    Api,
    /// Kubeconfig or client setup problem
    Config,
    /// Manifest file could not be parsed
    Parse,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this category only affects a single resource lookup.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Network | Self::Permission | Self::Api)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Cluster connectivity issue",
            Self::Permission => "Permission denied",
            Self::Api => "Unexpected API response",
            Self::Config => "Cluster configuration error",
            Self::Parse => "Manifest parse error",
            Self::Other => "Unexpected error",
        }
    }
}

/// Errors that can occur while loading manifests or talking to the cluster.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level error (connection refused, TLS, timeout)
    #[error("network error: {message}")]
    Network {
        /// Message from the underlying client
        message: String,
    },

    /// Authentication or authorization failure
    #[error("permission denied: {message}")]
    Permission {
        /// Message from the API server
        message: String,
    },

    /// The API server returned a non-success status other than 404
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Message from the API server
        message: String,
    },

    /// Kubeconfig could not be read or did not contain the requested context
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// No usable cluster configuration could be inferred
    #[error("could not infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /// Building the Kubernetes client failed
    #[error("failed to create Kubernetes client: {0}")]
    Client(#[source] kube::Error),

    /// The async runtime backing the cluster client could not be started
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Invalid YAML in a manifest file
    #[error("error decoding YAML in '{file}': {source}")]
    Yaml {
        /// Display name of the file
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::Api { .. } => ErrorCategory::Api,
            Error::Kubeconfig(_) | Error::InferConfig(_) | Error::Client(_) => {
                ErrorCategory::Config
            }
            Error::Runtime(_) => ErrorCategory::Config,
            Error::Yaml { .. } => ErrorCategory::Parse,
            Error::Io(_) | Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error only affects a single resource lookup.
    pub fn is_fetch_failure(&self) -> bool {
        self.category().is_fetch_failure()
    }

    /// Classify an error returned by a cluster lookup.
    ///
    /// 404 is never passed here; lookups map it to "absent" before erroring.
    pub fn from_kube(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(resp) if resp.code == 401 || resp.code == 403 => Error::Permission {
                message: err.to_string(),
            },
            kube::Error::Api(resp) => Error::Api {
                code: resp.code,
                message: err.to_string(),
            },
            _ => Error::Network {
                message: err.to_string(),
            },
        }
    }
}

/// Result type for drift detection operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_categories() {
        assert!(ErrorCategory::Network.is_fetch_failure());
        assert!(ErrorCategory::Permission.is_fetch_failure());
        assert!(ErrorCategory::Api.is_fetch_failure());
        assert!(!ErrorCategory::Config.is_fetch_failure());
        assert!(!ErrorCategory::Parse.is_fetch_failure());
    }

    #[test]
    fn test_error_category_mapping() {
        let err = Error::Permission {
            message: "secrets is forbidden".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert!(err.is_fetch_failure());

        let err = Error::Other("boom".to_string());
        assert_eq!(err.category(), ErrorCategory::Other);
        assert!(!err.is_fetch_failure());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            code: 500,
            message: "etcdserver: request timed out".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): etcdserver: request timed out");
    }
}
