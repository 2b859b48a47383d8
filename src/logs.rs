//! Pod log tails
//!
//! The line limit is sent to the API and enforced again locally so a server
//! that ignores `tailLines` still yields a bounded response. Bytes are
//! returned as received: no decoding, no ANSI stripping, no reflow.

use crate::k8s::{ClusterApi, PodRef};
use crate::metrics::Metrics;
use crate::{IgniteError, Result};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_TAIL_LINES: i64 = 100;

/// Keep the last `limit` newline-terminated lines of `raw`.
///
/// A trailing newline does not start a new line, so `"a\nb\n"` is two lines.
/// Input with `limit` or fewer lines is returned unchanged.
pub fn tail_lines(raw: Bytes, limit: usize) -> Bytes {
    if limit == 0 {
        return Bytes::new();
    }

    let body_end = match raw.last() {
        Some(b'\n') => raw.len() - 1,
        _ => raw.len(),
    };

    let mut seen = 0;
    for (idx, byte) in raw[..body_end].iter().enumerate().rev() {
        if *byte == b'\n' {
            seen += 1;
            if seen == limit {
                return raw.slice(idx + 1..);
            }
        }
    }
    raw
}

#[derive(Clone)]
pub struct LogRetriever {
    cluster: Arc<dyn ClusterApi>,
    metrics: Metrics,
}

impl LogRetriever {
    pub fn new(cluster: Arc<dyn ClusterApi>, metrics: Metrics) -> Self {
        Self { cluster, metrics }
    }

    pub async fn tail_logs(&self, pod: &PodRef, line_limit: i64) -> Result<Bytes> {
        if pod.name.trim().is_empty() || pod.namespace.trim().is_empty() {
            return Err(IgniteError::Validation(
                "pod name and namespace are both required".to_string(),
            ));
        }
        let line_limit = if line_limit > 0 {
            line_limit
        } else {
            DEFAULT_TAIL_LINES
        };

        debug!("Fetching last {} log lines for {}", line_limit, pod);

        match self
            .cluster
            .pod_logs(&pod.namespace, &pod.name, line_limit)
            .await
        {
            Ok(raw) => Ok(tail_lines(raw, line_limit as usize)),
            Err(e) => {
                warn!("Log fetch for {} failed: {}", pod, e);
                self.metrics.record_log_fetch_failure();
                Err(IgniteError::LogFetchFailed {
                    pod: pod.name.clone(),
                    namespace: pod.namespace.clone(),
                    message: e.message(),
                })
            }
        }
    }
}
