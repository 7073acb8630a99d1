// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - provisions a tenant per added namespace and removes it on deletion.

use crate::kubernetes::{EventKind, NamespaceEvent};
use crate::reconcilers::runner::EventHandler;
use crate::tenant::{CatalogLoader, DashboardCatalog, TenantProvisioner};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct NamespaceHandler {
    provisioner: Arc<TenantProvisioner>,
    loader: CatalogLoader,
    /// Loaded once at startup and kept for the lifetime of the reconciler
    catalog: DashboardCatalog,
}

impl NamespaceHandler {
    pub fn new(provisioner: Arc<TenantProvisioner>, loader: CatalogLoader) -> Self {
        Self {
            provisioner,
            loader,
            catalog: DashboardCatalog::default(),
        }
    }
}

#[async_trait]
impl EventHandler for NamespaceHandler {
    async fn start(&mut self) {
        self.catalog = self.loader.load().await.unwrap_or_else(|| {
            warn!("No dashboard catalog, tenants will be provisioned without dashboards");
            DashboardCatalog::default()
        });
    }

    async fn handle(&mut self, event: NamespaceEvent) {
        match event.kind {
            EventKind::Added => match self.provisioner.provision(&event.name, &self.catalog).await {
                Ok(()) => info!("Namespace {} added", event.name),
                Err(e) => error!("Failed to provision tenant for namespace {}: {}", event.name, e),
            },
            EventKind::Deleted => {
                self.provisioner.deprovision(&event.name).await;
                info!("Namespace {} deleted", event.name);
            }
            EventKind::Error => warn!("Namespace watch reported an error"),
            EventKind::Modified => debug!("Ignoring modification of namespace {}", event.name),
        }
    }
}
