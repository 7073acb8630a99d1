// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dashboard documents.
//!
//! A dashboard is kept as an open JSON object so fields this crate never
//! touches survive a fetch/upload cycle unchanged. Named accessors cover the
//! handful of fields the provisioner rewrites.

use crate::constants::{HIDE_VARIABLE, NAMESPACE_VARIABLE_LABEL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Summary record returned by the dashboard search endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    #[serde(default)]
    pub id: u64,
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// Envelope returned when fetching a single dashboard
#[derive(Deserialize, Debug)]
pub(crate) struct DashboardEnvelope {
    pub dashboard: Dashboard,
}

/// Full dashboard document
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Dashboard(Map<String, Value>);

impl Dashboard {
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64)
    }

    pub fn uid(&self) -> Option<&str> {
        self.0.get("uid").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<u64> {
        self.0.get("version").and_then(Value::as_u64)
    }

    /// Whether the title is one of `titles`, compared exactly
    pub fn has_title_in(&self, titles: &[&str]) -> bool {
        self.title().is_some_and(|t| titles.contains(&t))
    }

    /// Drop id, uid and version so the receiver assigns fresh ones
    pub fn reset_identity(&mut self) {
        self.0.insert("id".to_string(), Value::Null);
        self.0.insert("uid".to_string(), Value::Null);
        self.0.insert("version".to_string(), Value::from(0));
    }

    /// Template variables, in document order.
    /// Entries that are not JSON objects are skipped.
    pub fn template_variables(&self) -> Vec<&Map<String, Value>> {
        self.template_list()
            .map(|list| list.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default()
    }

    pub fn template_variables_mut(&mut self) -> Vec<TemplateVariable<'_>> {
        self.0
            .get_mut("templating")
            .and_then(Value::as_object_mut)
            .and_then(|t| t.get_mut("list"))
            .and_then(Value::as_array_mut)
            .map(|list| {
                list.iter_mut()
                    .filter_map(Value::as_object_mut)
                    .map(TemplateVariable)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn template_list(&self) -> Option<&Vec<Value>> {
        self.0
            .get("templating")
            .and_then(Value::as_object)
            .and_then(|t| t.get("list"))
            .and_then(Value::as_array)
    }

    /// Clone this dashboard for a tenant namespace.
    ///
    /// The clone has no identity, and every template variable has its
    /// wildcard value cleared. The `Namespace` variable is pinned to
    /// `namespace` and hidden.
    pub fn for_namespace(&self, namespace: &str) -> Dashboard {
        let mut clone = self.clone();
        clone.reset_identity();
        for mut variable in clone.template_variables_mut() {
            variable.clear_all_value();
            if variable.label() == Some(NAMESPACE_VARIABLE_LABEL) {
                variable.pin_regex(namespace);
                variable.hide();
            }
        }
        clone
    }

    /// Request body for the dashboard upload endpoint
    pub fn upload_body(&self, overwrite: bool) -> Value {
        serde_json::json!({
            "dashboard": self,
            "overwrite": overwrite,
        })
    }
}

/// Mutable view of one entry of `templating.list`
pub struct TemplateVariable<'a>(&'a mut Map<String, Value>);

impl TemplateVariable<'_> {
    pub fn label(&self) -> Option<&str> {
        self.0.get("label").and_then(Value::as_str)
    }

    /// Null out a non-null `allValue`; absent or null values are left alone
    pub fn clear_all_value(&mut self) {
        if let Some(value) = self.0.get_mut("allValue") {
            if !value.is_null() {
                *value = Value::Null;
            }
        }
    }

    pub fn pin_regex(&mut self, regex: &str) {
        self.0.insert("regex".to_string(), Value::from(regex));
    }

    pub fn hide(&mut self) {
        self.0.insert("hide".to_string(), Value::from(HIDE_VARIABLE));
    }
}
