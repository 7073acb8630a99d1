// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcilers that turn watch events into tenant operations.

pub mod backend_pod;
pub mod namespace;
pub mod runner;

pub use backend_pod::{BackendPodHandler, BackendPodMatcher};
pub use namespace::NamespaceHandler;
pub use runner::{EventHandler, EventReconciler};
