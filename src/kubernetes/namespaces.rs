// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace listing

use crate::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, instrument};

/// Names of every namespace that is not being torn down, in listing order
#[instrument(skip(client))]
pub async fn list_active_namespaces(client: &Client) -> Result<Vec<String>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespace_list = namespaces.list(&ListParams::default()).await?;

    Ok(namespace_list
        .items
        .into_iter()
        .filter(|ns| {
            let terminating = is_terminating(ns);
            if terminating {
                debug!("Skipping terminating namespace {}", ns.name_any());
            }
            !terminating
        })
        .map(|ns| ns.name_any())
        .collect())
}

fn is_terminating(namespace: &Namespace) -> bool {
    namespace
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .is_some_and(|phase| phase == "Terminating")
}
