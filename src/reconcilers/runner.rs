// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic event loop shared by the namespace and backend-pod reconcilers.

use crate::kubernetes::{EventStream, ResourceEvent};
use anyhow::bail;
use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Maps lifecycle events of one watch onto tenant operations
#[async_trait]
pub trait EventHandler: Send {
    /// Runs once before the first event is consumed
    async fn start(&mut self) {}

    async fn handle(&mut self, event: ResourceEvent);
}

/// Consumes one event stream, strictly one event at a time, in delivery order
pub struct EventReconciler<H> {
    name: &'static str,
    handler: H,
}

impl<H: EventHandler> EventReconciler<H> {
    pub fn new(name: &'static str, handler: H) -> Self {
        Self { name, handler }
    }

    /// Run until `shutdown` is cancelled. A stream that ends is an error:
    /// the watch is expected to deliver for the lifetime of the process.
    pub async fn run(mut self, mut events: EventStream, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!("Starting {} reconciler", self.name);
        self.handler.start().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("{} reconciler stopped", self.name);
                    return Ok(());
                }
                event = events.next() => match event {
                    Some(event) => {
                        debug!("{} reconciler received {:?}", self.name, event);
                        self.handler.handle(event).await;
                    }
                    None => bail!("{} watch stream ended", self.name),
                },
            }
        }
    }
}
