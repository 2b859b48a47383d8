//! HTML rendering of a `ClusterSnapshot`
//!
//! Pure functions only. Empty collections render as "none found" rows; a
//! collection emptied by a failed query also gets a notice at the top.

use crate::aggregator::ClusterSnapshot;
use crate::k8s::{PodInfo, ResourceKind};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PersistentVolumeClaim;

const STYLE: &str = "\
body { font-family: sans-serif; background: #121212; color: white; padding: 20px; }
table { width: 100%; border-collapse: collapse; margin-top: 12px; }
th, td { padding: 10px; text-align: left; border-bottom: 1px solid #333; }
th { background-color: #1f1f1f; }
a, button.link { color: #44aaff; }
button.link { background: none; border: none; cursor: pointer; padding: 0; font: inherit; }
.status-running { color: #00ff00; font-weight: bold; }
.status-error { color: #ff4444; font-weight: bold; }
.notice { background: #3a2a00; border: 1px solid #aa7700; padding: 8px; margin-top: 12px; }
.header { display: flex; justify-content: space-between; align-items: center; }
input, select { background: #333; color: white; padding: 5px; border: 1px solid #555; }";

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub deploy_namespace: String,
    pub refresh_secs: u64,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a value for use inside a query string.
pub fn encode_query_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn status_class(pod: &PodInfo) -> &'static str {
    if pod.is_running() {
        "status-running"
    } else {
        "status-error"
    }
}

pub fn dashboard(snapshot: &ClusterSnapshot, options: &DashboardOptions) -> String {
    let mut page = String::with_capacity(8 * 1024);
    let current = snapshot.scope.as_query_value();

    page.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Ignite Dashboard</title>\n<style>\n{}\n</style>\n",
        STYLE
    ));
    if options.refresh_secs > 0 {
        page.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"{}\">\n",
            options.refresh_secs
        ));
    }
    page.push_str("</head>\n<body>\n<div class=\"header\">\n<h1>Ignite</h1>\n");

    page.push_str("<form method=\"get\" action=\"/\">\n<label>Filter Namespace: </label>\n");
    page.push_str("<select name=\"ns\" onchange=\"this.form.submit()\">\n");
    page.push_str(&format!(
        "<option value=\"\"{}>All Namespaces</option>\n",
        if current.is_empty() { " selected" } else { "" }
    ));
    for ns in &snapshot.namespaces {
        page.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>\n",
            escape_html(ns),
            if ns == current { " selected" } else { "" }
        ));
    }
    page.push_str("</select>\n<noscript><button type=\"submit\">Filter</button></noscript>\n</form>\n</div>\n");

    for failure in &snapshot.failures {
        page.push_str(&format!(
            "<div class=\"notice\">Could not load {}: {}</div>\n",
            escape_html(failure.kind.as_str()),
            escape_html(&failure.message)
        ));
    }

    render_pods(&mut page, snapshot);
    render_deployments(&mut page, &snapshot.deployments, snapshot.failed(ResourceKind::Deployments));
    render_stateful_sets(
        &mut page,
        &snapshot.stateful_sets,
        snapshot.failed(ResourceKind::StatefulSets),
    );
    render_storage_claims(
        &mut page,
        &snapshot.storage_claims,
        snapshot.failed(ResourceKind::StorageClaims),
    );
    render_deploy_form(&mut page, options);

    page.push_str("</body>\n</html>\n");
    page
}

fn empty_row(page: &mut String, columns: usize, failed: bool) {
    let label = if failed { "unavailable" } else { "none found" };
    page.push_str(&format!("<tr><td colspan=\"{}\">{}</td></tr>\n", columns, label));
}

fn render_pods(page: &mut String, snapshot: &ClusterSnapshot) {
    page.push_str("<h2>Pods</h2>\n<table>\n");
    page.push_str("<tr><th>Pod Name</th><th>Namespace</th><th>Status</th><th>Actions</th></tr>\n");

    if snapshot.pods.is_empty() {
        empty_row(page, 4, snapshot.failed(ResourceKind::Pods));
    }
    for pod in &snapshot.pods {
        let name = escape_html(&pod.name);
        let namespace = escape_html(&pod.namespace);
        page.push_str(&format!(
            "<tr><td>{name}</td><td>{namespace}</td><td class=\"{class}\">{status}</td><td>\
             <a href=\"/api/logs?name={qname}&amp;ns={qns}\" target=\"_blank\">[ View Logs ]</a> \
             <form method=\"post\" action=\"/delete\" style=\"display:inline\">\
             <input type=\"hidden\" name=\"name\" value=\"{name}\">\
             <input type=\"hidden\" name=\"ns\" value=\"{namespace}\">\
             <button class=\"link\" type=\"submit\">[ Delete ]</button></form></td></tr>\n",
            class = status_class(pod),
            status = escape_html(&pod.status),
            qname = encode_query_value(&pod.name),
            qns = encode_query_value(&pod.namespace),
        ));
    }
    page.push_str("</table>\n");
}

fn replicas(ready: Option<i32>, desired: Option<i32>) -> String {
    format!("{}/{}", ready.unwrap_or(0), desired.unwrap_or(0))
}

fn render_deployments(page: &mut String, deployments: &[Deployment], failed: bool) {
    page.push_str("<h2>Deployments</h2>\n<table>\n");
    page.push_str("<tr><th>Name</th><th>Namespace</th><th>Ready</th><th>Image</th></tr>\n");

    if deployments.is_empty() {
        empty_row(page, 4, failed);
    }
    for deployment in deployments {
        let spec = deployment.spec.as_ref();
        let image = spec
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|s| s.containers.first())
            .and_then(|c| c.image.as_deref())
            .unwrap_or("");
        let ready = replicas(
            deployment.status.as_ref().and_then(|s| s.ready_replicas),
            spec.and_then(|s| s.replicas),
        );
        page.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(deployment.metadata.name.as_deref().unwrap_or("")),
            escape_html(deployment.metadata.namespace.as_deref().unwrap_or("")),
            ready,
            escape_html(image)
        ));
    }
    page.push_str("</table>\n");
}

fn render_stateful_sets(page: &mut String, stateful_sets: &[StatefulSet], failed: bool) {
    page.push_str("<h2>StatefulSets</h2>\n<table>\n");
    page.push_str("<tr><th>Name</th><th>Namespace</th><th>Ready</th><th>Image</th></tr>\n");

    if stateful_sets.is_empty() {
        empty_row(page, 4, failed);
    }
    for set in stateful_sets {
        let spec = set.spec.as_ref();
        let image = spec
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|s| s.containers.first())
            .and_then(|c| c.image.as_deref())
            .unwrap_or("");
        let ready = replicas(
            set.status.as_ref().and_then(|s| s.ready_replicas),
            spec.and_then(|s| s.replicas),
        );
        page.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(set.metadata.name.as_deref().unwrap_or("")),
            escape_html(set.metadata.namespace.as_deref().unwrap_or("")),
            ready,
            escape_html(image)
        ));
    }
    page.push_str("</table>\n");
}

fn render_storage_claims(page: &mut String, claims: &[PersistentVolumeClaim], failed: bool) {
    page.push_str("<h2>Storage Claims</h2>\n<table>\n");
    page.push_str(
        "<tr><th>Name</th><th>Namespace</th><th>Phase</th><th>Capacity</th><th>Storage Class</th></tr>\n",
    );

    if claims.is_empty() {
        empty_row(page, 5, failed);
    }
    for claim in claims {
        let status = claim.status.as_ref();
        let capacity = status
            .and_then(|s| s.capacity.as_ref())
            .and_then(|c| c.get("storage"))
            .map(|q| q.0.as_str())
            .unwrap_or("");
        let storage_class = claim
            .spec
            .as_ref()
            .and_then(|s| s.storage_class_name.as_deref())
            .unwrap_or("");
        page.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(claim.metadata.name.as_deref().unwrap_or("")),
            escape_html(claim.metadata.namespace.as_deref().unwrap_or("")),
            escape_html(status.and_then(|s| s.phase.as_deref()).unwrap_or("Unknown")),
            escape_html(capacity),
            escape_html(storage_class)
        ));
    }
    page.push_str("</table>\n");
}

fn render_deploy_form(page: &mut String, options: &DashboardOptions) {
    page.push_str(&format!(
        "<h2>Deploy Workload</h2>\n<p>New workloads are created in namespace <b>{}</b>, \
         regardless of the filter above.</p>\n<form method=\"post\" action=\"/deploy\">\n\
         <input name=\"name\" placeholder=\"name\" required>\n\
         <input name=\"image\" placeholder=\"image (e.g. nginx:latest)\" required>\n\
         <input name=\"port\" placeholder=\"port\" inputmode=\"numeric\">\n\
         <button type=\"submit\">Deploy</button>\n</form>\n",
        escape_html(&options.deploy_namespace)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::QueryFailure;
    use crate::k8s::NamespaceScope;

    fn options() -> DashboardOptions {
        DashboardOptions {
            deploy_namespace: "default".to_string(),
            refresh_secs: 5,
        }
    }

    fn snapshot(pods: Vec<PodInfo>) -> ClusterSnapshot {
        ClusterSnapshot {
            scope: NamespaceScope::Named("apps".to_string()),
            pods,
            deployments: Vec::new(),
            stateful_sets: Vec::new(),
            storage_claims: Vec::new(),
            namespaces: vec!["apps".to_string(), "default".to_string()],
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">&'"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("kube-system"), "kube-system");
        assert_eq!(encode_query_value("a b&c"), "a+b%26c");
        assert_eq!(encode_query_value("ns/x?y"), "ns%2Fx%3Fy");
    }

    #[test]
    fn test_empty_snapshot_renders_none_found() {
        let html = dashboard(&snapshot(Vec::new()), &options());
        assert_eq!(html.matches("none found").count(), 4);
        assert!(!html.contains("notice\""));
        assert!(html.contains("<option value=\"apps\" selected>apps</option>"));
        assert!(html.contains("content=\"5\""));
    }

    #[test]
    fn test_pod_rows_escape_and_classify() {
        let html = dashboard(
            &snapshot(vec![
                PodInfo {
                    name: "web-<1>".to_string(),
                    namespace: "apps".to_string(),
                    phase: "Running".to_string(),
                    status: "Running".to_string(),
                    node_name: None,
                    pod_ip: None,
                },
                PodInfo {
                    name: "worker".to_string(),
                    namespace: "apps".to_string(),
                    phase: "Running".to_string(),
                    status: "CrashLoopBackOff".to_string(),
                    node_name: None,
                    pod_ip: None,
                },
            ]),
            &options(),
        );
        assert!(html.contains("<td>web-&lt;1&gt;</td>"));
        assert!(html.contains("<td class=\"status-running\">Running</td>"));
        assert!(html.contains("<td class=\"status-error\">CrashLoopBackOff</td>"));
        assert!(html.contains("/api/logs?name=worker&amp;ns=apps"));
        assert!(!html.contains("web-<1>"));
    }

    #[test]
    fn test_failed_query_shows_notice() {
        let mut snap = snapshot(Vec::new());
        snap.failures.push(QueryFailure {
            kind: ResourceKind::StorageClaims,
            message: "forbidden".to_string(),
        });
        let html = dashboard(&snap, &options());
        assert!(html.contains("Could not load persistentvolumeclaims: forbidden"));
        assert!(html.contains("unavailable"));
        assert_eq!(html.matches("none found").count(), 3);
    }

    #[test]
    fn test_deploy_form_names_target_namespace() {
        let opts = DashboardOptions {
            deploy_namespace: "sandbox".to_string(),
            refresh_secs: 0,
        };
        let html = dashboard(&snapshot(Vec::new()), &opts);
        assert!(html.contains("namespace <b>sandbox</b>"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }
}
