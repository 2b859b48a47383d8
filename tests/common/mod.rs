#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use ignite::k8s::{ClusterApi, K8sClient, NamespaceScope, ResourceKind};
use ignite::{IgniteError, Result};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{
    ContainerState, ContainerStateWaiting, ContainerStatus, Namespace, PersistentVolumeClaim, Pod,
    PodStatus,
};
use kube::api::ObjectMeta;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory cluster that records every call made against it.
///
/// Log bodies are returned whole, ignoring `tail_lines`, like a server that
/// does not honour the parameter.
#[derive(Default)]
pub struct FakeCluster {
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub storage_claims: Vec<PersistentVolumeClaim>,
    pub namespaces: Vec<String>,
    pub failing: HashSet<ResourceKind>,
    pub reject_create: Option<String>,
    pub logs: HashMap<(String, String), Bytes>,
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, Deployment)>>,
}

impl FakeCluster {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, Deployment)> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, kind: ResourceKind) -> Result<()> {
        if self.failing.contains(&kind) {
            return Err(IgniteError::KubernetesError(format!(
                "{} is forbidden",
                kind
            )));
        }
        Ok(())
    }
}

fn in_scope<T>(items: &[T], scope: &NamespaceScope, ns: impl Fn(&T) -> Option<&str>) -> Vec<T>
where
    T: Clone,
{
    items
        .iter()
        .filter(|item| match scope.as_namespace() {
            None => true,
            Some(wanted) => ns(item) == Some(wanted),
        })
        .cloned()
        .collect()
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_pods(&self, scope: &NamespaceScope) -> Result<Vec<Pod>> {
        self.record(format!("list_pods:{}", scope.as_query_value()));
        self.check(ResourceKind::Pods)?;
        Ok(in_scope(&self.pods, scope, |p| p.metadata.namespace.as_deref()))
    }

    async fn list_deployments(&self, scope: &NamespaceScope) -> Result<Vec<Deployment>> {
        self.record(format!("list_deployments:{}", scope.as_query_value()));
        self.check(ResourceKind::Deployments)?;
        Ok(in_scope(&self.deployments, scope, |d| {
            d.metadata.namespace.as_deref()
        }))
    }

    async fn list_stateful_sets(&self, scope: &NamespaceScope) -> Result<Vec<StatefulSet>> {
        self.record(format!("list_stateful_sets:{}", scope.as_query_value()));
        self.check(ResourceKind::StatefulSets)?;
        Ok(in_scope(&self.stateful_sets, scope, |s| {
            s.metadata.namespace.as_deref()
        }))
    }

    async fn list_storage_claims(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.record(format!("list_storage_claims:{}", scope.as_query_value()));
        self.check(ResourceKind::StorageClaims)?;
        Ok(in_scope(&self.storage_claims, scope, |c| {
            c.metadata.namespace.as_deref()
        }))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        self.record("list_namespaces".to_string());
        self.check(ResourceKind::Namespaces)?;
        Ok(self
            .namespaces
            .iter()
            .map(|name| Namespace {
                metadata: ObjectMeta {
                    name: Some(name.clone()),
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect())
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        self.record(format!("create_deployment:{}", namespace));
        if let Some(message) = &self.reject_create {
            return Err(IgniteError::KubernetesError(message.clone()));
        }
        self.created
            .lock()
            .unwrap()
            .push((namespace.to_string(), deployment.clone()));

        let mut created = deployment.clone();
        created.metadata.namespace = Some(namespace.to_string());
        Ok(created)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        self.record(format!("delete_pod:{}/{}", namespace, name));
        let exists = self.pods.iter().any(|p| {
            p.metadata.name.as_deref() == Some(name)
                && p.metadata.namespace.as_deref() == Some(namespace)
        });
        if exists {
            Ok(())
        } else {
            Err(IgniteError::PodNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
        }
    }

    async fn pod_logs(&self, namespace: &str, name: &str, tail_lines: i64) -> Result<Bytes> {
        self.record(format!("pod_logs:{}/{}:{}", namespace, name, tail_lines));
        self.logs
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| IgniteError::PodNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }
}

pub fn pod(name: &str, namespace: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: None,
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
    }
}

pub fn waiting_pod(name: &str, namespace: &str, reasons: &[&str]) -> Pod {
    let mut pod = pod(name, namespace, "Pending");
    let statuses = reasons
        .iter()
        .enumerate()
        .map(|(i, reason)| ContainerStatus {
            name: format!("c{}", i),
            state: Some(ContainerState {
                waiting: Some(ContainerStateWaiting {
                    reason: Some(reason.to_string()),
                    message: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();
    if let Some(status) = pod.status.as_mut() {
        status.container_statuses = Some(statuses);
    }
    pod
}

fn meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

pub fn deployment(name: &str, namespace: &str) -> Deployment {
    Deployment {
        metadata: meta(name, namespace),
        ..Default::default()
    }
}

pub fn stateful_set(name: &str, namespace: &str) -> StatefulSet {
    StatefulSet {
        metadata: meta(name, namespace),
        ..Default::default()
    }
}

pub fn storage_claim(name: &str, namespace: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: meta(name, namespace),
        ..Default::default()
    }
}

/// Two namespaces with a little of everything in each.
pub fn sample_cluster() -> FakeCluster {
    FakeCluster {
        pods: vec![
            pod("web-1", "apps", "Running"),
            waiting_pod("worker-1", "apps", &["CrashLoopBackOff"]),
            pod("coredns-1", "kube-system", "Running"),
        ],
        deployments: vec![deployment("web", "apps"), deployment("coredns", "kube-system")],
        stateful_sets: vec![stateful_set("db", "apps")],
        storage_claims: vec![storage_claim("data-db-0", "apps")],
        namespaces: vec![
            "apps".to_string(),
            "default".to_string(),
            "kube-system".to_string(),
        ],
        ..Default::default()
    }
}

pub fn numbered_lines(count: usize) -> Bytes {
    Bytes::from(
        (1..=count)
            .map(|i| format!("line {}\n", i))
            .collect::<String>(),
    )
}

/// A real `K8sClient` talking to an in-process API server.
pub fn api_client<F, Fut>(timeout: Duration, handler: F) -> K8sClient
where
    F: Fn(http::Request<hyper::Body>) -> Fut + Send + 'static,
    Fut: Future<Output = http::Response<hyper::Body>> + Send + 'static,
{
    let service = tower::service_fn(move |req| {
        let response = handler(req);
        async move { Ok::<_, Infallible>(response.await) }
    });
    K8sClient::from_client(kube::Client::new(service, "default"), timeout)
}

pub fn json_response(body: serde_json::Value) -> http::Response<hyper::Body> {
    http::Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(hyper::Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_list(api_version: &str, kind: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {},
        "items": [],
    })
}
