// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, namespace listing and lifecycle watches.

pub mod client;
pub mod cluster;
pub mod events;
pub mod namespaces;

pub use client::create_client;
pub use cluster::{ClusterSource, KubeCluster};
pub use events::{EventKind, EventStream, NamespaceEvent, PodEvent, ResourceEvent};
pub use namespaces::list_active_namespaces;
