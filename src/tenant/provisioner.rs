// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Creation and removal of one tenant's organization, data source,
//! dashboards and restricted user.
//!
//! Every step re-resolves ids by name, so a run can be repeated at any time.
//! Steps that fail remotely are logged by the client and the sequence moves
//! on; only an unresolvable organization stops it.

use crate::config::Config;
use crate::constants::{datasource, roles, DEFAULT_ORG_ID};
use crate::error::{ControllerError, Result};
use crate::grafana::GrafanaClient;
use crate::tenant::catalog::DashboardCatalog;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Per-tenant values shared by every provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSettings {
    /// Identity granted Admin in every tenant organization
    pub operator_login: String,
    /// URL of the metrics data source
    pub datasource_url: String,
    /// Initial password of tenant users
    pub tenant_password: String,
}

impl TenantSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            operator_login: config.admin.login.clone(),
            datasource_url: datasource_url(&config.prometheus_address),
            tenant_password: config.tenant_password.clone(),
        }
    }
}

/// Build the data source URL, adding scheme and default port when missing
pub fn datasource_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        return address.to_string();
    }
    if address.contains(':') {
        format!("http://{}", address)
    } else {
        format!("http://{}:{}", address, datasource::DEFAULT_PORT)
    }
}

pub struct TenantProvisioner {
    grafana: Arc<GrafanaClient>,
    settings: TenantSettings,
}

impl TenantProvisioner {
    pub fn new(grafana: Arc<GrafanaClient>, settings: TenantSettings) -> Self {
        Self { grafana, settings }
    }

    /// Create or repair the tenant for `namespace`
    #[instrument(skip(self, catalog))]
    pub async fn provision(&self, namespace: &str, catalog: &DashboardCatalog) -> Result<()> {
        let grafana = &self.grafana;
        let _session = grafana.lock_session().await;

        info!("Provisioning tenant");

        // An existing organization is fine, the lookup below finds it
        grafana.create_org(namespace).await;
        let Some(org_id) = grafana.org_id(namespace).await else {
            return Err(ControllerError::OrgUnresolved(namespace.to_string()));
        };

        grafana.switch_org(org_id).await;
        grafana.create_datasource(&self.settings.datasource_url).await;

        let dashboards = catalog.tenant_dashboards(namespace);
        for dashboard in &dashboards {
            if !grafana.create_dashboard(dashboard, false).await {
                debug!("Dashboard '{}' not uploaded", dashboard.title().unwrap_or_default());
            }
        }

        grafana.create_user(namespace, &self.settings.tenant_password).await;
        grafana.add_user_to_org(org_id, namespace, roles::VIEWER).await;
        grafana
            .add_user_to_org(org_id, &self.settings.operator_login, roles::ADMIN)
            .await;

        match grafana.user_id(namespace).await {
            Some(user_id) => {
                grafana.switch_user_org(user_id, org_id).await;
                grafana.remove_user_from_org(DEFAULT_ORG_ID, user_id).await;
            }
            None => warn!("Tenant user could not be resolved, its organization context is unchanged"),
        }

        info!(org_id, dashboards = dashboards.len(), "Tenant provisioned");
        Ok(())
    }

    /// Remove the tenant for `namespace`. Parts that no longer exist are skipped.
    #[instrument(skip(self))]
    pub async fn deprovision(&self, namespace: &str) {
        let grafana = &self.grafana;
        let _session = grafana.lock_session().await;

        let org_id = grafana.org_id(namespace).await;
        let user_id = grafana.user_id(namespace).await;

        match org_id {
            Some(id) => {
                grafana.delete_org(id).await;
            }
            None => debug!("Organization already gone"),
        }
        match user_id {
            Some(id) => {
                grafana.delete_user(id).await;
            }
            None => debug!("Tenant user already gone"),
        }

        info!("Tenant removed");
    }
}
