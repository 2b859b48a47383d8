use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgniteError {
    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Pod not found: {name} in namespace {namespace}")]
    PodNotFound { name: String, namespace: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{operation} failed: {message}")]
    MutationFailed { operation: String, message: String },

    #[error("Failed to fetch logs for {namespace}/{pod}: {message}")]
    LogFetchFailed {
        pod: String,
        namespace: String,
        message: String,
    },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IgniteError {
    /// True for failures caused by the caller's input rather than the cluster.
    pub fn is_validation(&self) -> bool {
        matches!(self, IgniteError::Validation(_))
    }

    /// Message without this crate's prefix, for wrapping inside another error.
    /// API failures carry the server's text as is.
    pub fn message(&self) -> String {
        match self {
            IgniteError::KubernetesError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<prometheus::Error> for IgniteError {
    fn from(e: prometheus::Error) -> Self {
        IgniteError::MetricsError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IgniteError>;
