// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Watch stream failed: {0}")]
    WatchError(String),

    #[error("Monitoring service transport error: {0}")]
    TransportError(String),

    #[error("Invalid monitoring service address: {0}")]
    InvalidAddress(String),

    #[error("Organization for namespace {0} could not be resolved")]
    OrgUnresolved(String),

    #[error("Controller account bootstrap failed: {0}")]
    BootstrapError(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
