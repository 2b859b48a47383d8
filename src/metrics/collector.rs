use crate::k8s::ResourceKind;
use crate::Result;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Counters for everything the dashboard absorbs or reports.
///
/// Each `Metrics` owns its registry, so tests and embedded users never share
/// state through the global default registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    query_failures: IntCounterVec,
    commands: IntCounterVec,
    log_fetch_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new_custom(Some("ignite".to_string()), None)?;

        let query_failures = IntCounterVec::new(
            Opts::new(
                "query_failures_total",
                "List queries that failed and were rendered as empty collections",
            ),
            &["kind"],
        )?;
        let commands = IntCounterVec::new(
            Opts::new("commands_total", "Mutation commands by outcome"),
            &["command", "outcome"],
        )?;
        let log_fetch_failures = IntCounter::new(
            "log_fetch_failures_total",
            "Pod log requests that could not be served",
        )?;

        registry.register(Box::new(query_failures.clone()))?;
        registry.register(Box::new(commands.clone()))?;
        registry.register(Box::new(log_fetch_failures.clone()))?;

        Ok(Self {
            registry,
            query_failures,
            commands,
            log_fetch_failures,
        })
    }

    pub fn record_query_failure(&self, kind: ResourceKind) {
        self.query_failures.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_command(&self, command: &str, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.commands.with_label_values(&[command, outcome]).inc();
    }

    pub fn record_log_fetch_failure(&self) {
        self.log_fetch_failures.inc();
    }

    pub fn query_failures(&self, kind: ResourceKind) -> u64 {
        self.query_failures.with_label_values(&[kind.as_str()]).get()
    }

    pub fn commands(&self, command: &str, succeeded: bool) -> u64 {
        let outcome = if succeeded { "success" } else { "failure" };
        self.commands.with_label_values(&[command, outcome]).get()
    }

    pub fn log_fetch_failures(&self) -> u64 {
        self.log_fetch_failures.get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
