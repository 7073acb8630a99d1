// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use crate::error::{ControllerError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{info, instrument};

/// Create a cluster client from an explicit kubeconfig file, or infer one
/// (in-cluster service account, `KUBECONFIG`, `~/.kube/config`) when no path
/// is given.
#[instrument]
pub async fn create_client(kubeconfig_path: Option<&Path>) -> Result<Client> {
    let Some(path) = kubeconfig_path else {
        info!("Inferring cluster configuration");
        return Ok(Client::try_default().await?);
    };

    info!("Loading cluster configuration from {}", path.display());
    let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
        ControllerError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    create_client_from_kubeconfig(&kubeconfig).await
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| ControllerError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                ControllerError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| ControllerError::KubeconfigError(format!("Failed to create client: {}", e)))
}
