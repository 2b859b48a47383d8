use crate::aggregator::PodStatusSummary;
use crate::commands::DeploySpec;
use crate::k8s::{NamespaceScope, PodRef};
use crate::server::render::{self, encode_query_value, DashboardOptions};
use crate::server::AppState;
use crate::Result;
use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub ns: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeployForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub port: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ns: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ns: String,
    pub tail: Option<i64>,
}

pub async fn view(State(state): State<AppState>, Query(query): Query<ViewQuery>) -> Html<String> {
    let scope = NamespaceScope::from_query(query.ns.as_deref());
    let snapshot = state.aggregator.aggregate(&scope).await;

    let options = DashboardOptions {
        deploy_namespace: state.config.deploy_namespace.clone(),
        refresh_secs: state.config.refresh_secs,
    };
    Html(render::dashboard(&snapshot, &options))
}

pub async fn deploy(
    State(state): State<AppState>,
    Form(form): Form<DeployForm>,
) -> Result<Redirect> {
    let spec = DeploySpec::from_raw(&form.name, &form.image, form.port.as_deref());
    state.commands.create_workload(&spec).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_pod(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect> {
    let pod = PodRef::new(form.name.trim(), form.ns.trim());
    state.commands.delete_pod(&pod).await?;
    Ok(Redirect::to(&format!(
        "/?ns={}",
        encode_query_value(&pod.namespace)
    )))
}

pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Response> {
    let pod = PodRef::new(query.name.trim(), query.ns.trim());
    let limit = query.tail.unwrap_or(state.config.log_tail_lines);
    debug!("Log request for {} (tail {})", pod, limit);

    let body = state.logs.tail_logs(&pod, limit).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], body).into_response())
}

pub async fn status(State(state): State<AppState>) -> Result<Json<PodStatusSummary>> {
    Ok(Json(state.aggregator.pod_summary().await?))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response> {
    let body = state.exporter.format_current_metrics()?;
    Ok(([(header::CONTENT_TYPE, state.exporter.content_type())], body).into_response())
}

pub async fn healthz() -> &'static str {
    "ok"
}

