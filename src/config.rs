// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Login and password for one monitoring backend identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the monitoring backend admin API
    pub grafana_address: String,
    /// Administrative identity, also granted Admin in every tenant organization
    pub admin: Credentials,
    /// Address of the metrics source registered as data source
    pub prometheus_address: String,
    /// Directory holding the cluster credential file
    pub config_path: Option<PathBuf>,
    /// Namespace the monitoring backend pod runs in
    pub monitoring_namespace: String,
    /// Literal name prefix of the monitoring backend pod
    pub grafana_pod_prefix: String,
    /// Initial password of restricted tenant users
    pub tenant_password: String,
    /// Dedicated controller account, bootstrapped at startup when set
    pub controller_account: Option<Credentials>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            let value = lookup(key).with_context(|| format!("{} environment variable not set", key))?;
            if value.is_empty() {
                bail!("{} environment variable is empty", key);
            }
            Ok(value)
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let controller_account = match (optional("CONTROLLER_USER"), optional("CONTROLLER_PASSWORD")) {
            (Some(login), Some(password)) => Some(Credentials { login, password }),
            (None, None) => None,
            _ => bail!("CONTROLLER_USER and CONTROLLER_PASSWORD must be set together"),
        };

        Ok(Config {
            grafana_address: required("GRAFANA_IP")?,
            admin: Credentials {
                login: required("ADMIN_NAME")?,
                password: required("ADMIN_PASSWORD")?,
            },
            prometheus_address: required("PROMETHEUS_IP")?,
            config_path: optional("CONFIG_PATH").map(PathBuf::from),
            monitoring_namespace: optional("MONITORING_NAMESPACE")
                .unwrap_or_else(|| defaults::MONITORING_NAMESPACE.to_string()),
            grafana_pod_prefix: optional("GRAFANA_POD_PREFIX")
                .unwrap_or_else(|| defaults::GRAFANA_POD_PREFIX.to_string()),
            tenant_password: optional("TENANT_PASSWORD")
                .unwrap_or_else(|| defaults::TENANT_PASSWORD.to_string()),
            controller_account,
        })
    }

    /// Path of the cluster credential file, if one was configured
    pub fn kubeconfig_file(&self) -> Option<PathBuf> {
        self.config_path
            .as_ref()
            .map(|dir| dir.join(defaults::KUBECONFIG_FILE))
    }
}
