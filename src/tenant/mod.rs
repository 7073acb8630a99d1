// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant lifecycle: dashboard catalog, provisioning and controller account setup.

pub mod bootstrap;
pub mod catalog;
pub mod provisioner;

pub use bootstrap::ensure_controller_account;
pub use catalog::{CatalogLoader, DashboardCatalog};
pub use provisioner::{TenantProvisioner, TenantSettings};
