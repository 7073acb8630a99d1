// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The raw remote call primitive and its HTTP implementation

use crate::config::Credentials;
use crate::error::{ControllerError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use url::Url;

/// Status and body of a completed remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RemoteResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One authenticated call against the admin API.
///
/// Only transport-level failures (connection refused, timeout, broken body)
/// are errors. Any HTTP status, including 4xx and 5xx, is a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<RemoteResponse>;
}

/// Basic-auth HTTP transport bound to a fixed base address
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(address: &str, credentials: Credentials) -> Result<Self> {
        let base_url = parse_base_url(address)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("orgsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ControllerError::TransportError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<RemoteResponse> {
        let url = endpoint_url(&self.base_url, path)?;

        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.credentials.login, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ControllerError::TransportError(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ControllerError::TransportError(format!("Failed to read response body: {}", e)))?;

        Ok(RemoteResponse { status, body })
    }
}

/// Resolve an endpoint path below the base URL, keeping any base path prefix
fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ControllerError::InvalidAddress(format!("{}{}: {}", base, path, e)))
}

/// Turn a configured address into a base URL, defaulting to plain http.
/// The path always ends in `/` so endpoints resolve below it.
fn parse_base_url(address: &str) -> Result<Url> {
    let address = address.trim().trim_end_matches('/');
    if address.is_empty() {
        return Err(ControllerError::InvalidAddress("address is empty".to_string()));
    }

    let candidate = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let mut url = Url::parse(&candidate).map_err(|e| ControllerError::InvalidAddress(format!("{}: {}", address, e)))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ControllerError::InvalidAddress(address.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
