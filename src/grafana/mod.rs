// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Monitoring backend admin API: transport, retry policy, client and dashboard documents.

pub mod client;
pub mod dashboard;
pub mod retry;
pub mod transport;

pub use client::{EntityId, GrafanaClient};
pub use dashboard::{Dashboard, DashboardSummary};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RemoteResponse, Transport};
