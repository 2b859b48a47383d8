//! Mutation commands: create a single-replica workload, delete a pod
//!
//! Input is validated before any API call. API failures are reported
//! verbatim as `MutationFailed` and never retried here.
//!
//! New workloads always land in the configured deploy namespace, not in the
//! namespace the operator happens to be viewing.

use crate::k8s::{ClusterApi, PodRef};
use crate::metrics::Metrics;
use crate::{IgniteError, Result};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Name of the single container in every workload created here.
pub const WORKLOAD_CONTAINER_NAME: &str = "app";

/// Label tying a created workload's selector to its pod template.
pub const WORKLOAD_LABEL: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySpec {
    pub name: String,
    pub image: String,
    pub port: i32,
}

impl DeploySpec {
    /// Build from raw form input. An unparsable or missing port becomes 0.
    pub fn from_raw(name: &str, image: &str, port: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            image: image.trim().to_string(),
            port: port.map(parse_port).unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(IgniteError::Validation(
                "workload name must not be empty".to_string(),
            ));
        }
        if self.image.trim().is_empty() {
            return Err(IgniteError::Validation(
                "container image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lenient port parse: anything that is not a decimal `i32` yields 0.
pub fn parse_port(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadIdentity {
    pub name: String,
    pub namespace: String,
}

/// Single-replica Deployment whose selector matches its own pod template.
pub fn build_deployment(spec: &DeploySpec) -> Deployment {
    let labels = BTreeMap::from([(WORKLOAD_LABEL.to_string(), spec.name.clone())]);

    Deployment {
        metadata: ObjectMeta {
            name: Some(spec.name.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: WORKLOAD_CONTAINER_NAME.to_string(),
                        image: Some(spec.image.clone()),
                        ports: Some(vec![ContainerPort {
                            container_port: spec.port,
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

#[derive(Clone)]
pub struct CommandSurface {
    cluster: Arc<dyn ClusterApi>,
    metrics: Metrics,
    deploy_namespace: String,
}

impl CommandSurface {
    pub fn new(cluster: Arc<dyn ClusterApi>, metrics: Metrics, deploy_namespace: String) -> Self {
        Self {
            cluster,
            metrics,
            deploy_namespace,
        }
    }

    pub fn deploy_namespace(&self) -> &str {
        &self.deploy_namespace
    }

    pub async fn create_workload(&self, spec: &DeploySpec) -> Result<WorkloadIdentity> {
        spec.validate()?;

        let deployment = build_deployment(spec);
        debug!(
            "Creating deployment {} ({}:{}) in {}",
            spec.name, spec.image, spec.port, self.deploy_namespace
        );

        let result = self
            .cluster
            .create_deployment(&self.deploy_namespace, &deployment)
            .await;
        self.metrics.record_command("create_workload", result.is_ok());

        match result {
            Ok(created) => {
                let identity = WorkloadIdentity {
                    name: created.metadata.name.unwrap_or_else(|| spec.name.clone()),
                    namespace: created
                        .metadata
                        .namespace
                        .unwrap_or_else(|| self.deploy_namespace.clone()),
                };
                info!(
                    "Created deployment {}/{}",
                    identity.namespace, identity.name
                );
                Ok(identity)
            }
            Err(e) => {
                error!(
                    "Failed to create deployment {} in {}: {}",
                    spec.name, self.deploy_namespace, e
                );
                Err(IgniteError::MutationFailed {
                    operation: format!("create deployment {}", spec.name),
                    message: e.message(),
                })
            }
        }
    }

    pub async fn delete_pod(&self, pod: &PodRef) -> Result<()> {
        if pod.name.trim().is_empty() || pod.namespace.trim().is_empty() {
            return Err(IgniteError::Validation(
                "pod name and namespace are both required".to_string(),
            ));
        }

        debug!("Deleting pod {}", pod);

        let result = self.cluster.delete_pod(&pod.namespace, &pod.name).await;
        self.metrics.record_command("delete_pod", result.is_ok());

        match result {
            Ok(()) => {
                info!("Deleted pod {}", pod);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete pod {}: {}", pod, e);
                Err(IgniteError::MutationFailed {
                    operation: format!("delete pod {}", pod),
                    message: e.message(),
                })
            }
        }
    }
}
