use crate::k8s::types::NamespaceScope;
use crate::{IgniteError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, PersistentVolumeClaim, Pod};
use kube::api::{DeleteParams, ListParams, LogParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::ErrorResponse;
use kube::{Api, Client, Config, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Read and mutation calls this crate issues against the orchestration API.
///
/// Implementations must be cheap to share; components hold an
/// `Arc<dyn ClusterApi>` handed to them at construction.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_pods(&self, scope: &NamespaceScope) -> Result<Vec<Pod>>;

    async fn list_deployments(&self, scope: &NamespaceScope) -> Result<Vec<Deployment>>;

    async fn list_stateful_sets(&self, scope: &NamespaceScope) -> Result<Vec<StatefulSet>>;

    async fn list_storage_claims(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment>;

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()>;

    /// Raw log output of the pod's default container, at most `tail_lines` lines.
    async fn pod_logs(&self, namespace: &str, name: &str, tail_lines: i64) -> Result<Bytes>;
}

pub struct K8sClient {
    client: Client,
    timeout: Duration,
}

impl K8sClient {
    pub async fn try_default(timeout: Duration) -> Result<Self> {
        debug!("Initializing Kubernetes client from inferred config");

        let client = Client::try_default().await.map_err(|e| {
            IgniteError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client, timeout })
    }

    /// Build a client from an explicit kubeconfig file, using its current context.
    pub async fn from_kubeconfig(path: &Path, timeout: Duration) -> Result<Self> {
        debug!("Initializing Kubernetes client from {}", path.display());

        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            IgniteError::ConfigError(format!(
                "Failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                IgniteError::KubernetesError(format!("Invalid kubeconfig {}: {}", path.display(), e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            IgniteError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Connected to Kubernetes cluster using {}", path.display());

        Ok(Self { client, timeout })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Prefer an explicit kubeconfig, fall back to in-cluster / default discovery.
    pub async fn connect(kubeconfig: Option<&Path>, timeout: Duration) -> Result<Self> {
        match kubeconfig {
            Some(path) => Self::from_kubeconfig(path, timeout).await,
            None => Self::try_default(timeout).await,
        }
    }

    fn scoped<K>(&self, scope: &NamespaceScope) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match scope.as_namespace() {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    async fn list_scoped<K>(&self, scope: &NamespaceScope, kind: &str) -> Result<Vec<K>>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.scoped(scope);
        let operation = format!("list {} in {}", kind, scope);

        let list = self
            .deadline(&operation, api.list(&ListParams::default()))
            .await?
            .map_err(|e| IgniteError::KubernetesError(format!("Failed to {}: {}", operation, e)))?;

        debug!("{} returned {} items", operation, list.items.len());
        Ok(list.items)
    }

    async fn deadline<F, T>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| IgniteError::Timeout {
                operation: operation.to_string(),
                seconds: self.timeout.as_secs(),
            })
    }
}

fn is_not_found(e: &kube::Error) -> bool {
    matches!(e, kube::Error::Api(resp) if resp.code == 404)
}

/// The API server's own message for a rejected call, without kube's prefix.
fn api_message(e: &kube::Error) -> String {
    match e {
        kube::Error::Api(resp) => resp.message.clone(),
        other => other.to_string(),
    }
}

fn pod_error(e: kube::Error, namespace: &str, name: &str) -> IgniteError {
    if is_not_found(&e) {
        IgniteError::PodNotFound {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    } else {
        IgniteError::KubernetesError(api_message(&e))
    }
}

#[async_trait]
impl ClusterApi for K8sClient {
    async fn list_pods(&self, scope: &NamespaceScope) -> Result<Vec<Pod>> {
        self.list_scoped(scope, "pods").await
    }

    async fn list_deployments(&self, scope: &NamespaceScope) -> Result<Vec<Deployment>> {
        self.list_scoped(scope, "deployments").await
    }

    async fn list_stateful_sets(&self, scope: &NamespaceScope) -> Result<Vec<StatefulSet>> {
        self.list_scoped(scope, "statefulsets").await
    }

    async fn list_storage_claims(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.list_scoped(scope, "persistentvolumeclaims").await
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());

        let list = self
            .deadline("list namespaces", api.list(&ListParams::default()))
            .await?
            .map_err(|e| {
                IgniteError::KubernetesError(format!("Failed to list namespaces: {}", e))
            })?;

        Ok(list.items)
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let operation = format!("create deployment in {}", namespace);

        self.deadline(&operation, api.create(&PostParams::default(), deployment))
            .await?
            .map_err(|e| IgniteError::KubernetesError(api_message(&e)))
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let operation = format!("delete pod {}/{}", namespace, name);

        self.deadline(&operation, api.delete(name, &DeleteParams::default()))
            .await?
            .map(|_| ())
            .map_err(|e| pod_error(e, namespace, name))
    }

    /// Reads the raw body so bytes that are not valid UTF-8 survive untouched.
    async fn pod_logs(&self, namespace: &str, name: &str, tail_lines: i64) -> Result<Bytes> {
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..Default::default()
        };
        let request = kube::core::Request::new(Pod::url_path(&(), Some(namespace)))
            .logs(name, &params)
            .map_err(|e| IgniteError::KubernetesError(e.to_string()))?;
        let operation = format!("fetch logs for {}/{}", namespace, name);

        let fetch = async {
            let response = self
                .client
                .send(request.map(Into::into))
                .await
                .map_err(|e| IgniteError::KubernetesError(api_message(&e)))?;
            let status = response.status();
            let raw = response
                .into_body()
                .try_fold(Vec::new(), |mut raw, chunk| async move {
                    raw.extend_from_slice(&chunk);
                    Ok(raw)
                })
                .await
                .map_err(|e| IgniteError::KubernetesError(e.to_string()))?;

            if status.is_success() {
                return Ok(Bytes::from(raw));
            }
            if status.as_u16() == 404 {
                return Err(IgniteError::PodNotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                });
            }
            let message = serde_json::from_slice::<ErrorResponse>(&raw)
                .map(|resp| resp.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&raw).into_owned());
            Err(IgniteError::KubernetesError(message))
        };

        self.deadline(&operation, fetch).await?
    }
}
