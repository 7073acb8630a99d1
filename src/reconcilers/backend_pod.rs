// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backend pod reconciler - replays every tenant when the monitoring backend restarts.

use crate::kubernetes::{ClusterSource, EventKind, PodEvent};
use crate::reconcilers::runner::EventHandler;
use crate::tenant::{CatalogLoader, DashboardCatalog, TenantProvisioner};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Recognizes the monitoring backend's own pods by name
#[derive(Debug, Clone)]
pub struct BackendPodMatcher {
    pattern: Regex,
}

impl BackendPodMatcher {
    /// Match names made of `prefix` followed by lowercase alphanumerics or hyphens
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^{}[0-9a-z-]+", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, pod_name: &str) -> bool {
        self.pattern.is_match(pod_name)
    }
}

pub struct BackendPodHandler {
    provisioner: Arc<TenantProvisioner>,
    loader: CatalogLoader,
    cluster: Arc<dyn ClusterSource>,
    matcher: BackendPodMatcher,
    catalog: DashboardCatalog,
}

impl BackendPodHandler {
    pub fn new(
        provisioner: Arc<TenantProvisioner>,
        loader: CatalogLoader,
        cluster: Arc<dyn ClusterSource>,
        matcher: BackendPodMatcher,
    ) -> Self {
        Self {
            provisioner,
            loader,
            cluster,
            matcher,
            catalog: DashboardCatalog::default(),
        }
    }

    /// Reload the catalog and provision every existing namespace again
    #[instrument(skip(self))]
    async fn replay(&mut self) {
        match self.loader.load().await {
            Some(catalog) => self.catalog = catalog,
            None => warn!(
                "Dashboard catalog reload failed, replaying with the previous {} dashboards",
                self.catalog.len()
            ),
        }

        let namespaces = match self.cluster.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                error!("Failed to list namespaces for replay: {}", e);
                return;
            }
        };

        if namespaces.is_empty() {
            warn!("No namespaces found");
            return;
        }

        info!("Replaying {} tenants", namespaces.len());
        for namespace in &namespaces {
            match self.provisioner.provision(namespace, &self.catalog).await {
                Ok(()) => info!("Namespace {} replayed", namespace),
                Err(e) => error!("Failed to replay tenant for namespace {}: {}", namespace, e),
            }
        }
    }
}

#[async_trait]
impl EventHandler for BackendPodHandler {
    /// The startup catalog is the fallback when a reload during replay fails
    async fn start(&mut self) {
        self.catalog = self.loader.load().await.unwrap_or_else(|| {
            warn!("No dashboard catalog, replays will depend on a successful reload");
            DashboardCatalog::default()
        });
    }

    async fn handle(&mut self, event: PodEvent) {
        match event.kind {
            EventKind::Deleted if self.matcher.matches(&event.name) => {
                info!("Monitoring backend pod {} deleted", event.name);
                self.replay().await;
            }
            EventKind::Deleted => info!("Pod {} deleted", event.name),
            EventKind::Added => info!("Pod {} added", event.name),
            EventKind::Error => warn!("Pod watch reported an error"),
            EventKind::Modified => debug!("Ignoring modification of pod {}", event.name),
        }
    }
}
