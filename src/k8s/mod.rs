pub mod client;
pub mod status;
pub mod types;

pub use client::{ClusterApi, K8sClient};
pub use status::{resolve_status, ContainerCondition};
pub use types::{NamespaceScope, PodInfo, PodRef, ResourceKind};
