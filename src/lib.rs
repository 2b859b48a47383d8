pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod k8s;
pub mod logs;
pub mod metrics;
pub mod server;

pub use aggregator::{ClusterSnapshot, StateAggregator};
pub use commands::{CommandSurface, DeploySpec};
pub use error::{IgniteError, Result};
pub use logs::LogRetriever;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
