// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Admin API client.
//!
//! Every primitive is a thin wrapper around [`GrafanaClient::call`]. A call
//! that fails at the transport level is retried according to the
//! [`RetryPolicy`]. A non-200 status is not retried and not an error: it is
//! logged and the wrapper reports failure through its return value
//! (`false`, `None`). Ids that cannot be resolved come back as `None`.

use crate::constants::{api, datasource};
use crate::error::Result;
use crate::grafana::dashboard::{Dashboard, DashboardEnvelope, DashboardSummary};
use crate::grafana::retry::RetryPolicy;
use crate::grafana::transport::{RemoteResponse, Transport};
use bytes::Bytes;
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Numeric id of an organization or user
pub type EntityId = u64;

#[derive(Deserialize)]
struct IdRecord {
    #[serde(default)]
    id: EntityId,
}

pub struct GrafanaClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    /// Guards the server-side "current organization" of this identity
    session: Mutex<()>,
}

impl GrafanaClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_retry(transport, RetryPolicy::default())
    }

    pub fn with_retry(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            session: Mutex::new(()),
        }
    }

    /// Hold the session while a sequence depends on the active organization
    pub async fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.session.lock().await
    }

    /// Issue one remote call with bounded retry.
    ///
    /// Returns an error only when every attempt failed at the transport level.
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<RemoteResponse> {
        let body = body.map(|b| Bytes::from(b.to_string()));
        let operation = format!("{} {}", method, path);

        let response = self
            .retry
            .run(&operation, || self.transport.send(method.clone(), path, body.clone()))
            .await?;

        if response.is_ok() {
            debug!("{} succeeded", operation);
        } else {
            warn!(
                status = %response.status,
                body = %response.body_text(),
                "{} was not successful",
                operation
            );
        }
        Ok(response)
    }

    /// Call and report whether the remote side answered 200
    async fn call_ok(&self, method: Method, path: &str, body: Option<Value>) -> bool {
        match self.call(method, path, body).await {
            Ok(response) => response.is_ok(),
            Err(_) => false,
        }
    }

    /// Call and decode a 200 response body
    async fn call_json<T>(&self, method: Method, path: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.call(method, path, None).await.ok()?;
        if !response.is_ok() {
            return None;
        }
        match serde_json::from_slice(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Malformed response from {}: {}", path, e);
                None
            }
        }
    }

    async fn lookup_id(&self, path: &str) -> Option<EntityId> {
        self.call_json::<IdRecord>(Method::GET, path)
            .await
            .map(|r| r.id)
            .filter(|id| *id != 0)
    }

    pub async fn create_org(&self, name: &str) -> bool {
        self.call_ok(Method::POST, api::ORGS, Some(json!({ "name": name })))
            .await
    }

    pub async fn delete_org(&self, org_id: EntityId) -> bool {
        self.call_ok(Method::DELETE, &format!("{}/{}", api::ORGS, org_id), None)
            .await
    }

    pub async fn org_id(&self, name: &str) -> Option<EntityId> {
        self.lookup_id(&format!("{}/{}", api::ORG_BY_NAME, name)).await
    }

    /// Switch the active organization of this client's own identity
    pub async fn switch_org(&self, org_id: EntityId) -> bool {
        self.call_ok(Method::POST, &format!("{}/{}", api::SWITCH_ORG, org_id), None)
            .await
    }

    pub async fn create_user(&self, login: &str, password: &str) -> bool {
        let body = json!({ "name": login, "login": login, "password": password });
        self.call_ok(Method::POST, api::ADMIN_USERS, Some(body)).await
    }

    pub async fn delete_user(&self, user_id: EntityId) -> bool {
        self.call_ok(Method::DELETE, &format!("{}/{}", api::ADMIN_USERS, user_id), None)
            .await
    }

    pub async fn user_id(&self, login: &str) -> Option<EntityId> {
        let login: String = url::form_urlencoded::byte_serialize(login.as_bytes()).collect();
        self.lookup_id(&format!("{}?loginOrEmail={}", api::USER_LOOKUP, login))
            .await
    }

    pub async fn add_user_to_org(&self, org_id: EntityId, login: &str, role: &str) -> bool {
        let body = json!({ "loginOrEmail": login, "role": role });
        self.call_ok(Method::POST, &format!("{}/{}/users", api::ORGS, org_id), Some(body))
            .await
    }

    pub async fn remove_user_from_org(&self, org_id: EntityId, user_id: EntityId) -> bool {
        let path = format!("{}/{}/users/{}", api::ORGS, org_id, user_id);
        self.call_ok(Method::DELETE, &path, None).await
    }

    /// Switch the active organization of another user (requires server admin)
    pub async fn switch_user_org(&self, user_id: EntityId, org_id: EntityId) -> bool {
        let path = format!("{}/{}/using/{}", api::USERS, user_id, org_id);
        self.call_ok(Method::POST, &path, None).await
    }

    pub async fn grant_server_admin(&self, user_id: EntityId) -> bool {
        let path = format!("{}/{}/permissions", api::ADMIN_USERS, user_id);
        self.call_ok(Method::PUT, &path, Some(json!({ "isGrafanaAdmin": true })))
            .await
    }

    pub async fn set_user_password(&self, user_id: EntityId, password: &str) -> bool {
        let path = format!("{}/{}/password", api::ADMIN_USERS, user_id);
        self.call_ok(Method::PUT, &path, Some(json!({ "password": password })))
            .await
    }

    /// Register the metrics data source in the active organization
    pub async fn create_datasource(&self, url: &str) -> bool {
        let body = json!({
            "name": datasource::NAME,
            "type": datasource::TYPE,
            "url": url,
            "access": datasource::ACCESS,
        });
        self.call_ok(Method::POST, api::DATASOURCES, Some(body)).await
    }

    /// Upload a dashboard into the active organization
    pub async fn create_dashboard(&self, dashboard: &Dashboard, overwrite: bool) -> bool {
        self.call_ok(Method::POST, api::DASHBOARDS_DB, Some(dashboard.upload_body(overwrite)))
            .await
    }

    /// Dashboard summaries of the active organization
    pub async fn list_dashboards(&self) -> Option<Vec<DashboardSummary>> {
        self.call_json(Method::GET, api::DASHBOARD_SEARCH).await
    }

    pub async fn dashboard_by_uid(&self, uid: &str) -> Option<Dashboard> {
        self.call_json::<DashboardEnvelope>(Method::GET, &format!("{}/{}", api::DASHBOARD_BY_UID, uid))
            .await
            .map(|envelope| envelope.dashboard)
    }
}
