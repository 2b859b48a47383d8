//! Cluster state aggregation for the dashboard view
//!
//! One view request fans out to five independent list queries: pods,
//! deployments, stateful sets and storage claims in the requested scope, plus
//! namespaces cluster-wide for the filter menu. A failing query is logged,
//! counted and rendered as an empty collection; it never fails the snapshot.
//! The queries are not atomic with respect to each other.

use crate::k8s::{ClusterApi, NamespaceScope, PodInfo, ResourceKind};
use crate::metrics::Metrics;
use crate::{IgniteError, Result};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub kind: ResourceKind,
    pub message: String,
}

/// Result of one list query, kept tagged until the snapshot is assembled.
#[derive(Debug)]
pub enum QueryOutcome<T> {
    Ok(Vec<T>),
    Failed(QueryFailure),
}

impl<T> QueryOutcome<T> {
    pub fn from_result(kind: ResourceKind, result: Result<Vec<T>>) -> Self {
        match result {
            Ok(items) => QueryOutcome::Ok(items),
            Err(e) => QueryOutcome::Failed(QueryFailure {
                kind,
                message: e.message(),
            }),
        }
    }

    /// Split into the items to display and the failure to report, if any.
    pub fn into_parts(self) -> (Vec<T>, Option<QueryFailure>) {
        match self {
            QueryOutcome::Ok(items) => (items, None),
            QueryOutcome::Failed(failure) => (Vec::new(), Some(failure)),
        }
    }
}

/// Everything one dashboard render needs. Built per request, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSnapshot {
    pub scope: NamespaceScope,
    pub pods: Vec<PodInfo>,
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub storage_claims: Vec<PersistentVolumeClaim>,
    pub namespaces: Vec<String>,
    pub failures: Vec<QueryFailure>,
}

impl ClusterSnapshot {
    /// True when at least one collection is empty because its query failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed(&self, kind: ResourceKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }
}

/// Pod counts for the JSON status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatusSummary {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub pods: Vec<PodInfo>,
}

impl PodStatusSummary {
    pub fn from_pods(pods: Vec<PodInfo>) -> Self {
        let mut by_status = BTreeMap::new();
        for pod in &pods {
            *by_status.entry(pod.status.clone()).or_insert(0) += 1;
        }
        Self {
            total: pods.len(),
            by_status,
            pods,
        }
    }
}

#[derive(Clone)]
pub struct StateAggregator {
    cluster: Arc<dyn ClusterApi>,
    metrics: Metrics,
}

impl StateAggregator {
    pub fn new(cluster: Arc<dyn ClusterApi>, metrics: Metrics) -> Self {
        Self { cluster, metrics }
    }

    pub async fn aggregate(&self, scope: &NamespaceScope) -> ClusterSnapshot {
        debug!("Aggregating cluster state for {}", scope);

        let cluster = &self.cluster;
        let (pods, deployments, stateful_sets, storage_claims, namespaces) = futures::join!(
            async {
                QueryOutcome::from_result(ResourceKind::Pods, cluster.list_pods(scope).await)
            },
            async {
                QueryOutcome::from_result(
                    ResourceKind::Deployments,
                    cluster.list_deployments(scope).await,
                )
            },
            async {
                QueryOutcome::from_result(
                    ResourceKind::StatefulSets,
                    cluster.list_stateful_sets(scope).await,
                )
            },
            async {
                QueryOutcome::from_result(
                    ResourceKind::StorageClaims,
                    cluster.list_storage_claims(scope).await,
                )
            },
            async {
                QueryOutcome::from_result(ResourceKind::Namespaces, cluster.list_namespaces().await)
            },
        );

        let mut failures = Vec::new();
        let pods = self.absorb(pods, &mut failures);
        let deployments = self.absorb(deployments, &mut failures);
        let stateful_sets = self.absorb(stateful_sets, &mut failures);
        let storage_claims = self.absorb(storage_claims, &mut failures);
        let namespaces = self.absorb(namespaces, &mut failures);

        ClusterSnapshot {
            scope: scope.clone(),
            pods: pods.iter().map(PodInfo::from_k8s_pod).collect(),
            deployments,
            stateful_sets,
            storage_claims,
            namespaces: namespaces
                .into_iter()
                .filter_map(|ns| ns.metadata.name)
                .collect(),
            failures,
        }
    }

    /// Pod summary across all namespaces. Unlike `aggregate`, a failed
    /// query here is an error: there is nothing else to show.
    pub async fn pod_summary(&self) -> Result<PodStatusSummary> {
        let pods = self
            .cluster
            .list_pods(&NamespaceScope::All)
            .await
            .map_err(|e| {
                self.metrics.record_query_failure(ResourceKind::Pods);
                IgniteError::KubernetesError(format!("Failed to summarize pods: {}", e))
            })?;

        Ok(PodStatusSummary::from_pods(
            pods.iter().map(PodInfo::from_k8s_pod).collect(),
        ))
    }

    fn absorb<T>(&self, outcome: QueryOutcome<T>, failures: &mut Vec<QueryFailure>) -> Vec<T> {
        let (items, failure) = outcome.into_parts();
        if let Some(failure) = failure {
            warn!(
                "Query for {} failed, showing none: {}",
                failure.kind, failure.message
            );
            self.metrics.record_query_failure(failure.kind);
            failures.push(failure);
        }
        items
    }
}
