//! Live cluster backend using the Kubernetes API.

use super::Backend;
use crate::error::{Error, Result};
use crate::types::{DataMap, DeployedResource, ResourceKind};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Default timeout for Kubernetes API requests.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach the cluster.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Kubeconfig file; `$KUBECONFIG` or `~/.kube/config` when unset
    pub kubeconfig: Option<PathBuf>,
    /// Context to use instead of the kubeconfig's current context
    pub context: Option<String>,
    /// Per-request read timeout
    pub timeout: Option<Duration>,
}

/// Backend that looks resources up in a live cluster.
///
/// The client is async; the backend owns a multi-threaded runtime and blocks
/// on each lookup, so it can be shared across worker threads.
pub struct KubeBackend {
    runtime: Runtime,
    client: Client,
    cluster_identifier: String,
}

impl std::fmt::Debug for KubeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeBackend")
            .field("cluster_identifier", &self.cluster_identifier)
            .finish_non_exhaustive()
    }
}

impl KubeBackend {
    /// Build a client from kubeconfig (or in-cluster configuration).
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let config = runtime.block_on(load_config(options))?;
        let cluster_identifier =
            describe_cluster(&config.cluster_url.to_string(), options.context.as_deref());
        let client = Client::try_from(config).map_err(Error::Client)?;

        Ok(Self {
            runtime,
            client,
            cluster_identifier,
        })
    }

    /// API server URL, plus the context name when one was requested.
    pub fn cluster_identifier(&self) -> &str {
        &self.cluster_identifier
    }
}

fn describe_cluster(url: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{url} (context: {context})"),
        None => url.to_string(),
    }
}

async fn load_config(options: &ConnectOptions) -> Result<Config> {
    let mut config = if options.kubeconfig.is_none() && options.context.is_none() {
        Config::infer().await?
    } else {
        let kubeconfig = match &options.kubeconfig {
            Some(path) => Kubeconfig::read_from(path)?,
            None => Kubeconfig::read()?,
        };
        Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: options.context.clone(),
                ..Default::default()
            },
        )
        .await?
    };

    config.read_timeout = Some(options.timeout.unwrap_or(DEFAULT_API_TIMEOUT));
    Ok(config)
}

impl Backend for KubeBackend {
    fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DeployedResource>> {
        self.runtime.block_on(async {
            let data = match kind {
                ResourceKind::Secret => {
                    let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
                    api.get_opt(name)
                        .await
                        .map_err(Error::from_kube)?
                        .map(secret_data)
                }
                ResourceKind::ConfigMap => {
                    let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
                    api.get_opt(name)
                        .await
                        .map_err(Error::from_kube)?
                        .map(config_map_data)
                }
            };
            Ok(data.map(|data| DeployedResource::new(kind, name, namespace, data)))
        })
    }
}

/// Resolve a Secret's data: decoded `data` bytes, overlaid by `stringData`.
fn secret_data(secret: Secret) -> DataMap {
    let mut data: DataMap = secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, bytes)| (key, String::from_utf8_lossy(&bytes.0).into_owned()))
        .collect();
    data.extend(secret.string_data.unwrap_or_default());
    data
}

/// Resolve a ConfigMap's data. `binaryData` is not compared.
fn config_map_data(config_map: ConfigMap) -> DataMap {
    config_map.data.unwrap_or_default().into_iter().collect()
}
