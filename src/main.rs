// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use orgsync::config::Config;
use orgsync::grafana::{GrafanaClient, HttpTransport};
use orgsync::kubernetes::{create_client, ClusterSource, KubeCluster};
use orgsync::reconcilers::{BackendPodHandler, BackendPodMatcher, EventReconciler, NamespaceHandler};
use orgsync::tenant::{ensure_controller_account, CatalogLoader, TenantProvisioner, TenantSettings};

#[derive(Parser, Debug)]
#[command(version, about = "Keeps one monitoring organization per Kubernetes namespace")]
struct Args {
    /// Path to a kubeconfig file, overrides CONFIG_PATH
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Starting orgsync controller");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: grafana={}, prometheus={}, monitoring_namespace={}",
        config.grafana_address, config.prometheus_address, config.monitoring_namespace
    );

    // Create Kubernetes client
    let kubeconfig = args.kubeconfig.or_else(|| config.kubeconfig_file());
    let client = create_client(kubeconfig.as_deref()).await?;
    info!("Connected to Kubernetes cluster");

    // Admin API identity, optionally replaced by a dedicated controller account
    let admin_transport = HttpTransport::new(&config.grafana_address, config.admin.clone())?;
    info!("Using monitoring backend at {}", admin_transport.base_url());
    let admin = GrafanaClient::new(Arc::new(admin_transport));
    let grafana = match &config.controller_account {
        Some(account) => {
            ensure_controller_account(&admin, account).await?;
            let transport = HttpTransport::new(&config.grafana_address, account.clone())?;
            Arc::new(GrafanaClient::new(Arc::new(transport)))
        }
        None => Arc::new(admin),
    };

    let provisioner = Arc::new(TenantProvisioner::new(
        grafana.clone(),
        TenantSettings::from_config(&config),
    ));
    let loader = CatalogLoader::new(grafana);
    let cluster: Arc<dyn ClusterSource> = Arc::new(KubeCluster::new(client));
    let matcher = BackendPodMatcher::new(&config.grafana_pod_prefix)
        .context("Invalid monitoring backend pod prefix")?;

    let namespace_events = cluster.watch_namespaces().await?;
    let pod_events = cluster.watch_pods(&config.monitoring_namespace).await?;

    let namespace_reconciler = EventReconciler::new(
        "namespace",
        NamespaceHandler::new(provisioner.clone(), loader.clone()),
    );
    let backend_reconciler = EventReconciler::new(
        "backend pod",
        BackendPodHandler::new(provisioner, loader, cluster, matcher),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => warn!("Cannot listen for shutdown signal: {}", e),
            }
        }
    });

    info!("Starting reconcilers...");

    tokio::try_join!(
        namespace_reconciler.run(namespace_events, shutdown.clone()),
        backend_reconciler.run(pod_events, shutdown.clone())
    )?;

    warn!("Reconcilers stopped");
    Ok(())
}
