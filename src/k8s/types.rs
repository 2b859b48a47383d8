use crate::k8s::status::{resolve_status, ContainerCondition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace filter for list queries. The empty string on the wire means "all".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "String", from = "String")]
pub enum NamespaceScope {
    #[default]
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn from_query(ns: Option<&str>) -> Self {
        match ns.map(str::trim) {
            None | Some("") => NamespaceScope::All,
            Some(ns) => NamespaceScope::Named(ns.to_string()),
        }
    }

    pub fn as_namespace(&self) -> Option<&str> {
        match self {
            NamespaceScope::All => None,
            NamespaceScope::Named(ns) => Some(ns),
        }
    }

    /// Value used in query strings and form fields.
    pub fn as_query_value(&self) -> &str {
        self.as_namespace().unwrap_or("")
    }
}

impl From<String> for NamespaceScope {
    fn from(ns: String) -> Self {
        NamespaceScope::from_query(Some(&ns))
    }
}

impl From<NamespaceScope> for String {
    fn from(scope: NamespaceScope) -> Self {
        scope.as_query_value().to_string()
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => write!(f, "all namespaces"),
            NamespaceScope::Named(ns) => write!(f, "namespace {}", ns),
        }
    }
}

/// Resource collections gathered for one dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pods,
    Deployments,
    StatefulSets,
    StorageClaims,
    Namespaces,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pods => "pods",
            ResourceKind::Deployments => "deployments",
            ResourceKind::StatefulSets => "statefulsets",
            ResourceKind::StorageClaims => "persistentvolumeclaims",
            ResourceKind::Namespaces => "namespaces",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaced pod identity used as a command or log target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
}

impl PodRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub status: String,
    pub node_name: Option<String>,
    pub pod_ip: Option<String>,
}

impl PodInfo {
    pub fn from_k8s_pod(pod: &k8s_openapi::api::core::v1::Pod) -> Self {
        let metadata = &pod.metadata;
        let spec = pod.spec.as_ref();
        let status = pod.status.as_ref();

        let phase = status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let conditions: Vec<ContainerCondition> = status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| statuses.iter().map(ContainerCondition::from_status).collect())
            .unwrap_or_default();

        Self {
            name: metadata.name.clone().unwrap_or_default(),
            namespace: metadata.namespace.clone().unwrap_or_default(),
            status: resolve_status(&phase, &conditions),
            phase,
            node_name: spec.and_then(|s| s.node_name.clone()),
            pod_ip: status.and_then(|s| s.pod_ip.clone()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == "Running"
    }

    pub fn pod_ref(&self) -> PodRef {
        PodRef::new(self.name.clone(), self.namespace.clone())
    }
}
