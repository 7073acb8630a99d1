// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Admin API endpoints of the monitoring backend
pub mod api {
    pub const ORGS: &str = "/api/orgs";
    pub const ORG_BY_NAME: &str = "/api/orgs/name";
    pub const ADMIN_USERS: &str = "/api/admin/users";
    pub const USER_LOOKUP: &str = "/api/users/lookup";
    pub const USERS: &str = "/api/users";
    pub const SWITCH_ORG: &str = "/api/user/using";
    pub const DATASOURCES: &str = "/api/datasources";
    pub const DASHBOARDS_DB: &str = "/api/dashboards/db";
    pub const DASHBOARD_BY_UID: &str = "/api/dashboards/uid";
    pub const DASHBOARD_SEARCH: &str = "/api/search?type=dash-db&query=&starred=false";
}

/// Organization roles
pub mod roles {
    pub const VIEWER: &str = "Viewer";
    pub const ADMIN: &str = "Admin";
}

/// The default organization that owns the dashboard templates
pub const DEFAULT_ORG_ID: u64 = 1;

/// Dashboards cloned into every tenant organization
pub const TENANT_DASHBOARD_TITLES: &[&str] = &["Deployment", "Pods", "StatefulSet"];

/// Label of the template variable pinned to the tenant namespace
pub const NAMESPACE_VARIABLE_LABEL: &str = "Namespace";

/// `hide` value that removes a template variable from the dashboard header
pub const HIDE_VARIABLE: u64 = 2;

/// Data source registered in every tenant organization
pub mod datasource {
    pub const NAME: &str = "prometheus";
    pub const TYPE: &str = "prometheus";
    pub const ACCESS: &str = "proxy";
    pub const DEFAULT_PORT: u16 = 9090;
}

/// Remote call retry budget
pub mod retry {
    /// Total attempts per remote call, including the first one
    pub const MAX_ATTEMPTS: u32 = 3;
}

/// Defaults for optional configuration
pub mod defaults {
    pub const MONITORING_NAMESPACE: &str = "monitoring";
    pub const GRAFANA_POD_PREFIX: &str = "kube-prometheus-grafana";
    pub const TENANT_PASSWORD: &str = "password";
    pub const KUBECONFIG_FILE: &str = "config";
}
