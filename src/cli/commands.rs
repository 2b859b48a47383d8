use crate::aggregator::StateAggregator;
use crate::cli::{Cli, Commands, OutputFormat};
use crate::commands::{CommandSurface, DeploySpec};
use crate::config::Config;
use crate::k8s::{ClusterApi, K8sClient, NamespaceScope, PodRef};
use crate::logs::LogRetriever;
use crate::metrics::Metrics;
use crate::server::{self, AppState};
use crate::{IgniteError, Result};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub async fn handle_command(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        return Err(IgniteError::ConfigError(
            "No command specified. Use --help for usage information.".to_string(),
        ));
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.kubeconfig {
        config.kubeconfig = Some(path);
    }

    match command {
        Commands::Serve {
            listen,
            deploy_namespace,
        } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(ns) = deploy_namespace {
                config.deploy_namespace = ns;
            }
            handle_serve(config).await
        }
        Commands::Snapshot { namespace, format } => {
            handle_snapshot(config, NamespaceScope::from_query(namespace.as_deref()), format).await
        }
        Commands::Deploy {
            name,
            image,
            port,
            deploy_namespace,
        } => {
            if let Some(ns) = deploy_namespace {
                config.deploy_namespace = ns;
            }
            let spec = DeploySpec::from_raw(&name, &image, port.as_deref());
            handle_deploy(config, spec).await
        }
        Commands::DeletePod { name, namespace } => {
            handle_delete_pod(config, PodRef::new(name, namespace)).await
        }
        Commands::Logs {
            name,
            namespace,
            tail,
        } => handle_logs(config, PodRef::new(name, namespace), tail).await,
    }
}

async fn connect(config: &Config) -> Result<Arc<dyn ClusterApi>> {
    let client =
        K8sClient::connect(config.kubeconfig.as_deref(), config.request_timeout()).await?;
    Ok(Arc::new(client))
}

async fn handle_serve(config: Config) -> Result<()> {
    config.validate()?;
    let addr = config.listen_socket()?;
    let cluster = connect(&config).await?;
    let metrics = Metrics::new()?;

    server::serve(AppState::new(cluster, config, metrics), addr).await
}

async fn handle_snapshot(
    config: Config,
    scope: NamespaceScope,
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;
    let cluster = connect(&config).await?;
    let aggregator = StateAggregator::new(cluster, Metrics::new()?);

    let snapshot = aggregator.aggregate(&scope).await;
    info!(
        "Snapshot of {}: {} pods, {} deployments, {} statefulsets, {} claims",
        scope,
        snapshot.pods.len(),
        snapshot.deployments.len(),
        snapshot.stateful_sets.len(),
        snapshot.storage_claims.len()
    );

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&snapshot)?,
        OutputFormat::Yaml => serde_yaml::to_string(&snapshot)?,
    };
    println!("{}", rendered);
    Ok(())
}

async fn handle_deploy(config: Config, spec: DeploySpec) -> Result<()> {
    config.validate()?;
    // Validate before connecting.
    spec.validate()?;
    let cluster = connect(&config).await?;
    let commands = CommandSurface::new(cluster, Metrics::new()?, config.deploy_namespace.clone());

    let identity = commands.create_workload(&spec).await?;
    println!(
        "Created deployment {}/{} (image {}, port {})",
        identity.namespace, identity.name, spec.image, spec.port
    );
    Ok(())
}

async fn handle_delete_pod(config: Config, pod: PodRef) -> Result<()> {
    config.validate()?;
    let cluster = connect(&config).await?;
    let commands = CommandSurface::new(cluster, Metrics::new()?, config.deploy_namespace.clone());

    commands.delete_pod(&pod).await?;
    println!("Deleted pod {}", pod);
    Ok(())
}

async fn handle_logs(config: Config, pod: PodRef, tail: Option<i64>) -> Result<()> {
    config.validate()?;
    let cluster = connect(&config).await?;
    let logs = LogRetriever::new(cluster, Metrics::new()?);

    let body = logs
        .tail_logs(&pod, tail.unwrap_or(config.log_tail_lines))
        .await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.flush()?;
    Ok(())
}
