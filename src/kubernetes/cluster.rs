// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cluster as seen by the reconcilers

use crate::error::{ControllerError, Result};
use crate::kubernetes::events::{lifecycle_events, EventStream};
use crate::kubernetes::namespaces::list_active_namespaces;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::info;

#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Lifecycle events of every namespace
    async fn watch_namespaces(&self) -> Result<EventStream>;

    /// Lifecycle events of the pods in `namespace`
    async fn watch_pods(&self, namespace: &str) -> Result<EventStream>;

    /// Names of the namespaces that currently exist
    async fn list_namespaces(&self) -> Result<Vec<String>>;
}

pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterSource for KubeCluster {
    async fn watch_namespaces(&self) -> Result<EventStream> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        probe(&api, "namespaces").await?;
        info!("Watching namespaces");
        Ok(lifecycle_events(api))
    }

    async fn watch_pods(&self, namespace: &str) -> Result<EventStream> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        probe(&api, &format!("pods in {}", namespace)).await?;
        info!("Watching pods in namespace {}", namespace);
        Ok(lifecycle_events(api))
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        list_active_namespaces(&self.client).await
    }
}

/// Check that `api` can be listed before handing out a watch on it.
/// The runtime watcher retries forever, so access problems surface here.
async fn probe<K>(api: &Api<K>, what: &str) -> Result<()>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    api.list(&ListParams::default().limit(1))
        .await
        .map(|_| ())
        .map_err(|e| ControllerError::WatchError(format!("Cannot watch {}: {}", what, e)))
}
