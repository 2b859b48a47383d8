pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ignite")]
#[command(author = "bakarr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator dashboard and command surface for small Kubernetes clusters", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to a YAML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Kubeconfig to use instead of in-cluster or default credentials"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Serve the dashboard and command endpoints over HTTP")]
    Serve {
        #[arg(short, long, help = "Listen address (default 0.0.0.0:8080)")]
        listen: Option<String>,

        #[arg(
            long,
            help = "Namespace that receives created workloads, regardless of the viewed namespace"
        )]
        deploy_namespace: Option<String>,
    },
    #[command(about = "Print an aggregated cluster snapshot")]
    Snapshot {
        #[arg(short, long, help = "Kubernetes namespace (omit for all namespaces)")]
        namespace: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
        format: OutputFormat,
    },
    #[command(about = "Create a single-replica deployment in the deploy namespace")]
    Deploy {
        #[arg(long, help = "Deployment name")]
        name: String,

        #[arg(long, help = "Container image")]
        image: String,

        #[arg(short, long, help = "Container port (unparsable values become 0)")]
        port: Option<String>,

        #[arg(long, help = "Override the configured deploy namespace")]
        deploy_namespace: Option<String>,
    },
    #[command(about = "Delete a pod")]
    DeletePod {
        #[arg(long, help = "Pod name")]
        name: String,

        #[arg(short, long, help = "Kubernetes namespace")]
        namespace: String,
    },
    #[command(about = "Print the tail of a pod's logs")]
    Logs {
        #[arg(long, help = "Pod name")]
        name: String,

        #[arg(short, long, help = "Kubernetes namespace")]
        namespace: String,

        #[arg(short, long, help = "Number of lines (default from config, 100)")]
        tail: Option<i64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}
