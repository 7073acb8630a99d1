// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dashboard catalog loading from the default organization

use crate::constants::{DEFAULT_ORG_ID, TENANT_DASHBOARD_TITLES};
use crate::grafana::{Dashboard, GrafanaClient};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Dashboard templates owned by the default organization.
/// Immutable once loaded; a reload produces a new catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardCatalog {
    dashboards: Vec<Dashboard>,
}

impl DashboardCatalog {
    pub fn new(dashboards: Vec<Dashboard>) -> Self {
        Self { dashboards }
    }

    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }

    /// Allow-listed dashboards rewritten for `namespace`, in catalog order
    pub fn tenant_dashboards(&self, namespace: &str) -> Vec<Dashboard> {
        self.dashboards
            .iter()
            .filter(|d| d.has_title_in(TENANT_DASHBOARD_TITLES))
            .map(|d| d.for_namespace(namespace))
            .collect()
    }
}

#[derive(Clone)]
pub struct CatalogLoader {
    grafana: Arc<GrafanaClient>,
}

impl CatalogLoader {
    pub fn new(grafana: Arc<GrafanaClient>) -> Self {
        Self { grafana }
    }

    /// Fetch every dashboard of the default organization.
    ///
    /// Returns `None` when the dashboard index cannot be fetched. Dashboards
    /// that fail to resolve individually are skipped.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Option<DashboardCatalog> {
        let _session = self.grafana.lock_session().await;

        self.grafana.switch_org(DEFAULT_ORG_ID).await;
        let Some(summaries) = self.grafana.list_dashboards().await else {
            warn!("Failed to fetch the dashboard index of the default organization");
            return None;
        };

        let mut dashboards = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            match self.grafana.dashboard_by_uid(&summary.uid).await {
                Some(dashboard) => {
                    debug!(
                        id = ?dashboard.id(),
                        uid = ?dashboard.uid(),
                        version = ?dashboard.version(),
                        "Fetched dashboard '{}'",
                        summary.title
                    );
                    dashboards.push(dashboard);
                }
                None => warn!("Skipping dashboard '{}' ({}), it could not be fetched", summary.title, summary.uid),
            }
        }

        info!(
            "Loaded {} of {} dashboards from the default organization",
            dashboards.len(),
            summaries.len()
        );
        Some(DashboardCatalog::new(dashboards))
    }
}
