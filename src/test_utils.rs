// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API, an in-memory monitoring backend
//! and a scripted cluster.

use crate::error::{ControllerError, Result};
use crate::kubernetes::{ClusterSource, EventStream, ResourceEvent};
use crate::grafana::{RemoteResponse, Transport};
use crate::tenant::TenantSettings;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use http::{Method, Request, Response, StatusCode};
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Prefix match for paths like /api/v1/namespaces/foo/pods
        responses
            .iter()
            .find(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .map(|(_, resp)| resp.clone())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self.find_response(&method, &path).unwrap_or_else(|| {
            let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
            (404, body.to_string())
        });

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A NamespaceList with the given (name, phase) entries
pub fn namespace_list_json(namespaces: &[(&str, &str)]) -> String {
    let items: Vec<Value> = namespaces
        .iter()
        .map(|(name, phase)| {
            json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": name, "uid": format!("uid-{}", name) },
                "status": { "phase": phase }
            })
        })
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// A PodList with the given pod names
pub fn pod_list_json(names: &[&str]) -> String {
    let items: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": name, "namespace": "monitoring", "uid": format!("uid-{}", name) }
            })
        })
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// A stored dashboard document with a namespace selector and one other variable
pub fn dashboard_json(title: &str) -> Value {
    json!({
        "id": 17,
        "uid": format!("{}-uid", title.to_lowercase().replace(' ', "-")),
        "title": title,
        "version": 4,
        "panels": [],
        "templating": {
            "list": [
                {
                    "name": "namespace",
                    "label": "Namespace",
                    "type": "query",
                    "regex": "",
                    "hide": 0,
                    "allValue": ".*"
                },
                {
                    "name": "pod",
                    "label": "Pod",
                    "type": "query",
                    "regex": "",
                    "hide": 0,
                    "allValue": ".*"
                }
            ]
        }
    })
}

pub const ADMIN_LOGIN: &str = "admin";

pub fn make_settings() -> TenantSettings {
    TenantSettings {
        operator_login: ADMIN_LOGIN.to_string(),
        datasource_url: "http://10.0.0.7:9090".to_string(),
        tenant_password: "password".to_string(),
    }
}

struct FakeUser {
    login: String,
    password: String,
    server_admin: bool,
    current_org: Option<u64>,
}

struct FakeDashboard {
    org: u64,
    uid: String,
    document: Value,
}

struct FakeDatasource {
    org: u64,
    name: String,
    url: String,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    orgs: BTreeMap<u64, String>,
    users: BTreeMap<u64, FakeUser>,
    /// (user, org) -> role
    members: BTreeMap<(u64, u64), String>,
    datasources: Vec<FakeDatasource>,
    dashboards: Vec<FakeDashboard>,
    /// Active organization of the calling identity
    session_org: u64,

    transport_failures: usize,
    attempts: usize,
    requests: Vec<(String, String)>,
    corrupt_search: bool,
    reject_org_creation: bool,
    broken_dashboards: HashSet<String>,
}

type Reply = (StatusCode, String);

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, body.to_string())
}

fn message(status: StatusCode, text: &str) -> Reply {
    reply(status, json!({ "message": text }))
}

impl FakeState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_login(&self, login: &str) -> Option<u64> {
        self.users
            .iter()
            .find(|(_, u)| u.login == login)
            .map(|(id, _)| *id)
    }

    fn insert_user(&mut self, login: &str, password: &str) -> u64 {
        let id = self.allocate_id();
        self.users.insert(
            id,
            FakeUser {
                login: login.to_string(),
                password: password.to_string(),
                server_admin: false,
                current_org: Some(1),
            },
        );
        // new users land in the main organization
        self.members.insert((id, 1), "Viewer".to_string());
        id
    }

    fn route(&mut self, method: &Method, path: &str, body: &Value) -> Reply {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (method.as_str(), segments.as_slice()) {
            ("POST", ["api", "orgs"]) => self.create_org(body),
            ("GET", ["api", "orgs", "name", name]) => match self.orgs.iter().find(|(_, n)| n == name) {
                Some((id, name)) => reply(StatusCode::OK, json!({ "id": id, "name": name })),
                None => message(StatusCode::NOT_FOUND, "Organization not found"),
            },
            ("DELETE", ["api", "orgs", id]) => self.delete_org(id),
            ("POST", ["api", "orgs", org, "users"]) => self.add_member(org, body),
            ("DELETE", ["api", "orgs", org, "users", user]) => {
                match (org.parse::<u64>(), user.parse::<u64>()) {
                    (Ok(org), Ok(user)) if self.members.remove(&(user, org)).is_some() => {
                        message(StatusCode::OK, "User removed from organization")
                    }
                    _ => message(StatusCode::NOT_FOUND, "User not found"),
                }
            }
            ("POST", ["api", "user", "using", org]) => match org.parse::<u64>() {
                Ok(org) if self.orgs.contains_key(&org) => {
                    self.session_org = org;
                    message(StatusCode::OK, "Active organization changed")
                }
                _ => message(StatusCode::UNAUTHORIZED, "Not a valid organization"),
            },
            ("POST", ["api", "admin", "users"]) => {
                let login = body["login"].as_str().unwrap_or_default();
                if self.user_by_login(login).is_some() {
                    return message(StatusCode::PRECONDITION_FAILED, "user already exists");
                }
                let password = body["password"].as_str().unwrap_or_default();
                let id = self.insert_user(login, password);
                reply(StatusCode::OK, json!({ "id": id, "message": "User created" }))
            }
            ("DELETE", ["api", "admin", "users", id]) => match id.parse::<u64>() {
                Ok(id) if self.users.remove(&id).is_some() => {
                    self.members.retain(|(user, _), _| *user != id);
                    message(StatusCode::OK, "User deleted")
                }
                _ => message(StatusCode::NOT_FOUND, "User not found"),
            },
            ("PUT", ["api", "admin", "users", id, "permissions"]) => {
                match id.parse::<u64>().ok().and_then(|id| self.users.get_mut(&id)) {
                    Some(user) => {
                        user.server_admin = body["isGrafanaAdmin"].as_bool().unwrap_or(false);
                        message(StatusCode::OK, "User permissions updated")
                    }
                    None => message(StatusCode::NOT_FOUND, "User not found"),
                }
            }
            ("PUT", ["api", "admin", "users", id, "password"]) => {
                match id.parse::<u64>().ok().and_then(|id| self.users.get_mut(&id)) {
                    Some(user) => {
                        user.password = body["password"].as_str().unwrap_or_default().to_string();
                        message(StatusCode::OK, "User password updated")
                    }
                    None => message(StatusCode::NOT_FOUND, "User not found"),
                }
            }
            ("GET", ["api", "users", "lookup"]) => {
                let login = url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == "loginOrEmail")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default();
                match self.user_by_login(&login) {
                    Some(id) => reply(StatusCode::OK, json!({ "id": id, "login": login })),
                    None => message(StatusCode::NOT_FOUND, "user not found"),
                }
            }
            ("POST", ["api", "users", user, "using", org]) => {
                match (user.parse::<u64>(), org.parse::<u64>()) {
                    (Ok(user), Ok(org)) if self.members.contains_key(&(user, org)) => {
                        if let Some(u) = self.users.get_mut(&user) {
                            u.current_org = Some(org);
                        }
                        message(StatusCode::OK, "Active organization changed")
                    }
                    _ => message(StatusCode::UNAUTHORIZED, "Not a valid organization"),
                }
            }
            ("POST", ["api", "datasources"]) => {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                let org = self.session_org;
                if self.datasources.iter().any(|d| d.org == org && d.name == name) {
                    return message(StatusCode::CONFLICT, "data source with the same name already exists");
                }
                self.datasources.push(FakeDatasource {
                    org,
                    name,
                    url: body["url"].as_str().unwrap_or_default().to_string(),
                });
                message(StatusCode::OK, "Datasource added")
            }
            ("POST", ["api", "dashboards", "db"]) => self.upload_dashboard(body),
            ("GET", ["api", "search"]) => {
                if self.corrupt_search {
                    return (StatusCode::OK, "<html>upstream error</html>".to_string());
                }
                let summaries: Vec<Value> = self
                    .dashboards
                    .iter()
                    .filter(|d| d.org == self.session_org)
                    .map(|d| {
                        json!({
                            "id": d.document["id"],
                            "uid": d.uid,
                            "title": d.document["title"],
                            "type": "dash-db"
                        })
                    })
                    .collect();
                reply(StatusCode::OK, Value::Array(summaries))
            }
            ("GET", ["api", "dashboards", "uid", uid]) => {
                if self.broken_dashboards.contains(*uid) {
                    return message(StatusCode::INTERNAL_SERVER_ERROR, "Dashboard could not be loaded");
                }
                match self
                    .dashboards
                    .iter()
                    .find(|d| d.org == self.session_org && d.uid == *uid)
                {
                    Some(d) => reply(StatusCode::OK, json!({ "dashboard": d.document, "meta": {} })),
                    None => message(StatusCode::NOT_FOUND, "Dashboard not found"),
                }
            }
            _ => message(StatusCode::NOT_FOUND, "Not found"),
        }
    }

    fn create_org(&mut self, body: &Value) -> Reply {
        if self.reject_org_creation {
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create organization");
        }
        let name = body["name"].as_str().unwrap_or_default().to_string();
        if self.orgs.values().any(|n| *n == name) {
            return message(StatusCode::CONFLICT, "Organization name taken");
        }
        let id = self.allocate_id();
        self.orgs.insert(id, name);
        // the creating identity becomes its admin
        if let Some(admin) = self.user_by_login(ADMIN_LOGIN) {
            self.members.insert((admin, id), "Admin".to_string());
        }
        reply(StatusCode::OK, json!({ "orgId": id, "message": "Organization created" }))
    }

    fn delete_org(&mut self, id: &str) -> Reply {
        let Some(id) = id.parse::<u64>().ok().filter(|id| self.orgs.remove(id).is_some()) else {
            return message(StatusCode::NOT_FOUND, "Organization not found");
        };
        self.members.retain(|(_, org), _| *org != id);
        self.datasources.retain(|d| d.org != id);
        self.dashboards.retain(|d| d.org != id);
        for user in self.users.values_mut() {
            if user.current_org == Some(id) {
                user.current_org = None;
            }
        }
        message(StatusCode::OK, "Organization deleted")
    }

    fn add_member(&mut self, org: &str, body: &Value) -> Reply {
        let Some(org) = org.parse::<u64>().ok().filter(|org| self.orgs.contains_key(org)) else {
            return message(StatusCode::NOT_FOUND, "Organization not found");
        };
        let login = body["loginOrEmail"].as_str().unwrap_or_default();
        let Some(user) = self.user_by_login(login) else {
            return message(StatusCode::NOT_FOUND, "User not found");
        };
        if self.members.contains_key(&(user, org)) {
            return message(StatusCode::CONFLICT, "User is already member of this organization");
        }
        let role = body["role"].as_str().unwrap_or("Viewer").to_string();
        self.members.insert((user, org), role);
        message(StatusCode::OK, "User added to organization")
    }

    fn upload_dashboard(&mut self, body: &Value) -> Reply {
        let mut document = body["dashboard"].clone();
        let overwrite = body["overwrite"].as_bool().unwrap_or(false);
        let org = self.session_org;
        let title = document["title"].clone();

        if let Some(existing) = self
            .dashboards
            .iter_mut()
            .find(|d| d.org == org && d.document["title"] == title)
        {
            if !overwrite {
                return reply(
                    StatusCode::PRECONDITION_FAILED,
                    json!({ "status": "name-exists", "message": "A dashboard with the same name already exists" }),
                );
            }
            document["id"] = existing.document["id"].clone();
            document["uid"] = json!(existing.uid);
            existing.document = document;
            return reply(StatusCode::OK, json!({ "status": "success", "uid": existing.uid }));
        }

        let id = self.allocate_id();
        let uid = format!("dash-{}", id);
        document["id"] = json!(id);
        document["uid"] = json!(uid);
        self.dashboards.push(FakeDashboard {
            org,
            uid: uid.clone(),
            document,
        });
        reply(StatusCode::OK, json!({ "status": "success", "id": id, "uid": uid }))
    }
}

/// In-memory monitoring backend speaking the admin API subset the controller uses.
///
/// Starts with organization 1 ("Main Org.") and the admin user, who is the
/// calling identity for every request.
#[derive(Clone)]
pub struct FakeGrafana {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGrafana {
    pub fn new() -> Self {
        let mut state = FakeState {
            session_org: 1,
            ..FakeState::default()
        };
        let main_org = state.allocate_id();
        state.orgs.insert(main_org, "Main Org.".to_string());
        let admin = state.insert_user(ADMIN_LOGIN, "admin");
        state.members.insert((admin, main_org), "Admin".to_string());
        if let Some(user) = state.users.get_mut(&admin) {
            user.server_admin = true;
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    /// Fail the next `n` sends at the transport level
    pub fn fail_next(&self, n: usize) {
        self.with_state(|s| s.transport_failures = n);
    }

    /// Sends seen so far, including failed ones
    pub fn attempts(&self) -> usize {
        self.with_state(|s| s.attempts)
    }

    /// (method, path) of every request that reached the backend
    pub fn requests(&self) -> Vec<(String, String)> {
        self.with_state(|s| s.requests.clone())
    }

    pub fn count_requests(&self, method: &str, path: &str) -> usize {
        self.with_state(|s| {
            s.requests
                .iter()
                .filter(|(m, p)| m == method && p.split('?').next() == Some(path))
                .count()
        })
    }

    pub fn corrupt_search(&self) {
        self.with_state(|s| s.corrupt_search = true);
    }

    pub fn reject_org_creation(&self) {
        self.with_state(|s| s.reject_org_creation = true);
    }

    /// Store a dashboard directly, returning its uid
    pub fn seed_dashboard(&self, org: u64, document: Value) -> String {
        self.with_state(|s| {
            let id = s.allocate_id();
            let uid = format!("seed-{}", id);
            let mut document = document;
            document["id"] = json!(id);
            document["uid"] = json!(uid);
            s.dashboards.push(FakeDashboard {
                org,
                uid: uid.clone(),
                document,
            });
            uid
        })
    }

    /// Make fetching the dashboard with `uid` fail
    pub fn break_dashboard(&self, uid: &str) {
        self.with_state(|s| s.broken_dashboards.insert(uid.to_string()));
    }

    /// Create a user directly, returning its id
    pub fn add_user(&self, login: &str) -> u64 {
        self.with_state(|s| s.insert_user(login, "seeded"))
    }

    pub fn org_id(&self, name: &str) -> Option<u64> {
        self.with_state(|s| s.orgs.iter().find(|(_, n)| *n == name).map(|(id, _)| *id))
    }

    pub fn org_count(&self) -> usize {
        self.with_state(|s| s.orgs.len())
    }

    /// Organization names in creation order
    pub fn org_names(&self) -> Vec<String> {
        self.with_state(|s| s.orgs.values().cloned().collect())
    }

    pub fn user_id(&self, login: &str) -> Option<u64> {
        self.with_state(|s| s.user_by_login(login))
    }

    /// (org, role) memberships of a user, ordered by org id
    pub fn user_orgs(&self, user: u64) -> Vec<(u64, String)> {
        self.with_state(|s| {
            s.members
                .iter()
                .filter(|((u, _), _)| *u == user)
                .map(|((_, org), role)| (*org, role.clone()))
                .collect()
        })
    }

    pub fn user_current_org(&self, user: u64) -> Option<u64> {
        self.with_state(|s| s.users.get(&user).and_then(|u| u.current_org))
    }

    pub fn is_server_admin(&self, user: u64) -> bool {
        self.with_state(|s| s.users.get(&user).is_some_and(|u| u.server_admin))
    }

    pub fn user_password(&self, user: u64) -> Option<String> {
        self.with_state(|s| s.users.get(&user).map(|u| u.password.clone()))
    }

    /// URLs of the data sources in `org`
    pub fn datasources(&self, org: u64) -> Vec<String> {
        self.with_state(|s| {
            s.datasources
                .iter()
                .filter(|d| d.org == org)
                .map(|d| d.url.clone())
                .collect()
        })
    }

    /// Stored dashboard documents of `org`
    pub fn dashboards(&self, org: u64) -> Vec<Value> {
        self.with_state(|s| {
            s.dashboards
                .iter()
                .filter(|d| d.org == org)
                .map(|d| d.document.clone())
                .collect()
        })
    }
}

impl Default for FakeGrafana {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for FakeGrafana {
    async fn send(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<RemoteResponse> {
        self.with_state(|s| {
            s.attempts += 1;
            if s.transport_failures > 0 {
                s.transport_failures -= 1;
                return Err(ControllerError::TransportError("connection refused".to_string()));
            }
            s.requests.push((method.to_string(), path.to_string()));

            let body = body
                .and_then(|b| serde_json::from_slice(&b).ok())
                .unwrap_or(Value::Null);
            let (status, payload) = s.route(&method, path, &body);
            Ok(RemoteResponse::new(status, payload))
        })
    }
}

/// Cluster with a fixed namespace list and scripted watch events
pub struct FakeCluster {
    namespaces: Option<Vec<String>>,
    namespace_events: Mutex<Vec<ResourceEvent>>,
    pod_events: Mutex<Vec<ResourceEvent>>,
}

impl FakeCluster {
    pub fn with_namespaces(namespaces: &[&str]) -> Self {
        Self {
            namespaces: Some(namespaces.iter().map(|n| n.to_string()).collect()),
            namespace_events: Mutex::new(Vec::new()),
            pod_events: Mutex::new(Vec::new()),
        }
    }

    /// A cluster whose API cannot be reached
    pub fn unreachable() -> Self {
        Self {
            namespaces: None,
            ..Self::with_namespaces(&[])
        }
    }

    pub fn namespace_events(self, events: Vec<ResourceEvent>) -> Self {
        *self.namespace_events.lock().unwrap() = events;
        self
    }

    pub fn pod_events(self, events: Vec<ResourceEvent>) -> Self {
        *self.pod_events.lock().unwrap() = events;
        self
    }

    fn unavailable() -> ControllerError {
        ControllerError::WatchError("cluster unreachable".to_string())
    }
}

#[async_trait]
impl ClusterSource for FakeCluster {
    async fn watch_namespaces(&self) -> Result<EventStream> {
        if self.namespaces.is_none() {
            return Err(Self::unavailable());
        }
        let events = std::mem::take(&mut *self.namespace_events.lock().unwrap());
        Ok(stream::iter(events).boxed())
    }

    async fn watch_pods(&self, _namespace: &str) -> Result<EventStream> {
        if self.namespaces.is_none() {
            return Err(Self::unavailable());
        }
        let events = std::mem::take(&mut *self.pod_events.lock().unwrap());
        Ok(stream::iter(events).boxed())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.namespaces.clone().ok_or_else(Self::unavailable)
    }
}
