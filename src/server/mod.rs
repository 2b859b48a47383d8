//! HTTP surface: dashboard view, command endpoints, logs, status and metrics
//!
//! Handlers share read-only state only. Every request builds its own
//! snapshot or issues its own single mutation.

pub mod handlers;
pub mod render;

use crate::aggregator::StateAggregator;
use crate::commands::CommandSurface;
use crate::config::Config;
use crate::k8s::ClusterApi;
use crate::logs::LogRetriever;
use crate::metrics::{Metrics, PrometheusExporter};
use crate::{IgniteError, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: StateAggregator,
    pub commands: CommandSurface,
    pub logs: LogRetriever,
    pub exporter: Arc<PrometheusExporter>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(cluster: Arc<dyn ClusterApi>, config: Config, metrics: Metrics) -> Self {
        Self {
            aggregator: StateAggregator::new(cluster.clone(), metrics.clone()),
            commands: CommandSurface::new(
                cluster.clone(),
                metrics.clone(),
                config.deploy_namespace.clone(),
            ),
            logs: LogRetriever::new(cluster, metrics.clone()),
            exporter: Arc::new(PrometheusExporter::new(metrics)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::view))
        .route("/deploy", post(handlers::deploy))
        .route("/delete", post(handlers::delete_pod))
        .route("/api/logs", get(handlers::logs))
        .route("/api/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

impl IgniteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IgniteError::Validation(_) => StatusCode::BAD_REQUEST,
            IgniteError::PodNotFound { .. } => StatusCode::NOT_FOUND,
            IgniteError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            IgniteError::KubernetesError(_)
            | IgniteError::MutationFailed { .. }
            | IgniteError::LogFetchFailed { .. } => StatusCode::BAD_GATEWAY,
            IgniteError::MetricsError(_)
            | IgniteError::ConfigError(_)
            | IgniteError::IoError(_)
            | IgniteError::Yaml(_)
            | IgniteError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IgniteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Dashboard listening on http://{} (new workloads go to namespace {})",
        addr,
        state.commands.deploy_namespace()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
