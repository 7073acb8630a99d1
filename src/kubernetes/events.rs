// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle events derived from cluster watches.
//!
//! The runtime watcher reports objects as "applied" or "deleted" and re-lists
//! after a desync. [`LifecycleTracker`] turns that into Added / Modified /
//! Deleted by remembering which names it has already reported.

use futures::stream::{self, BoxStream, StreamExt};
use kube::{Api, Resource, ResourceExt};
use kube_runtime::watcher::{self, watcher, Event};
use kube_runtime::WatchStreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Debug;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
    Error,
}

/// One lifecycle notification for a named object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEvent {
    pub kind: EventKind,
    /// Object name; empty for `Error`
    pub name: String,
}

impl ResourceEvent {
    pub fn added(name: impl Into<String>) -> Self {
        Self { kind: EventKind::Added, name: name.into() }
    }

    pub fn modified(name: impl Into<String>) -> Self {
        Self { kind: EventKind::Modified, name: name.into() }
    }

    pub fn deleted(name: impl Into<String>) -> Self {
        Self { kind: EventKind::Deleted, name: name.into() }
    }

    pub fn error() -> Self {
        Self { kind: EventKind::Error, name: String::new() }
    }
}

pub type NamespaceEvent = ResourceEvent;
pub type PodEvent = ResourceEvent;

pub type EventStream = BoxStream<'static, ResourceEvent>;

#[derive(Debug, Default)]
pub struct LifecycleTracker {
    known: HashSet<String>,
    /// Names seen during an in-progress re-list
    relisted: Option<HashSet<String>>,
}

impl LifecycleTracker {
    pub fn translate<K: Resource>(&mut self, event: Result<Event<K>, watcher::Error>) -> Vec<ResourceEvent> {
        match event {
            Ok(Event::Init) => {
                self.relisted = Some(HashSet::new());
                Vec::new()
            }
            Ok(Event::InitApply(obj)) => {
                let name = obj.name_any();
                if let Some(seen) = self.relisted.as_mut() {
                    seen.insert(name.clone());
                }
                vec![self.observe(name)]
            }
            Ok(Event::InitDone) => {
                let Some(seen) = self.relisted.take() else {
                    return Vec::new();
                };
                let mut gone: Vec<String> = self.known.difference(&seen).cloned().collect();
                gone.sort();
                for name in &gone {
                    self.known.remove(name);
                }
                gone.into_iter().map(ResourceEvent::deleted).collect()
            }
            Ok(Event::Apply(obj)) => vec![self.observe(obj.name_any())],
            Ok(Event::Delete(obj)) => {
                let name = obj.name_any();
                self.known.remove(&name);
                vec![ResourceEvent::deleted(name)]
            }
            Err(e) => {
                warn!("Watch error: {}", e);
                vec![ResourceEvent::error()]
            }
        }
    }

    fn observe(&mut self, name: String) -> ResourceEvent {
        if self.known.insert(name.clone()) {
            ResourceEvent::added(name)
        } else {
            ResourceEvent::modified(name)
        }
    }
}

/// Watch `api` and emit lifecycle events for its objects
pub fn lifecycle_events<K>(api: Api<K>) -> EventStream
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + 'static,
{
    let mut tracker = LifecycleTracker::default();
    watcher(api, watcher::Config::default())
        .default_backoff()
        .map(move |event| stream::iter(tracker.translate(event)))
        .flatten()
        .boxed()
}
