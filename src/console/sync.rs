//! Keyed, refreshable views of server state
//!
//! Each key owns a snapshot that is only ever replaced wholesale by a
//! successful fetch. A failed fetch records the error and keeps the previous
//! value. Concurrent refreshes of one key are last-write-wins.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiResult, NodeApi};
use crate::core::{ContainerList, NodeHead, NodeId};

/// What a consumer sees for one key
#[derive(Debug)]
pub struct Snapshot<V> {
    /// Last successfully fetched value
    pub value: Option<Arc<V>>,
    /// Set by `invalidate`, cleared by the next successful refresh
    pub stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Error of the most recent refresh, if it failed
    pub last_error: Option<String>,
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self {
            value: None,
            stale: true,
            fetched_at: None,
            last_error: None,
        }
    }
}

impl<V> Clone for Snapshot<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            stale: self.stale,
            fetched_at: self.fetched_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Map of key to watch channel holding that key's snapshot
pub struct KeyedStore<K, V> {
    slots: Arc<Mutex<HashMap<K, Arc<watch::Sender<Snapshot<V>>>>>>,
}

impl<K, V> Clone for KeyedStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &K) -> Arc<watch::Sender<Snapshot<V>>> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(watch::channel(Snapshot::default()).0)),
        )
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self, key: &K) -> Snapshot<V> {
        self.slot(key).borrow().clone()
    }

    /// Last successfully fetched value, if any
    pub fn current(&self, key: &K) -> Option<Arc<V>> {
        self.slot(key).borrow().value.clone()
    }

    /// Receiver notified on every snapshot change for `key`
    pub fn subscribe(&self, key: &K) -> watch::Receiver<Snapshot<V>> {
        self.slot(key).subscribe()
    }

    /// Mark the value as outdated; it stays readable until replaced
    pub fn invalidate(&self, key: &K) {
        debug!("Invalidating {:?}", key);
        self.slot(key).send_modify(|snapshot| snapshot.stale = true);
    }

    pub fn is_stale(&self, key: &K) -> bool {
        self.slot(key).borrow().stale
    }

    /// Run `fetch` and, on success, replace the value for `key`
    pub async fn refresh_with<F, Fut, E>(&self, key: &K, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        let slot = self.slot(key);
        match fetch().await {
            Ok(value) => {
                let value = Arc::new(value);
                slot.send_modify(|snapshot| {
                    snapshot.value = Some(Arc::clone(&value));
                    snapshot.stale = false;
                    snapshot.fetched_at = Some(Utc::now());
                    snapshot.last_error = None;
                });
                Ok(value)
            }
            Err(err) => {
                warn!("Refreshing {:?} failed: {}", key, err);
                let message = err.to_string();
                slot.send_modify(|snapshot| snapshot.last_error = Some(message));
                Err(err)
            }
        }
    }
}

/// Per-node container lists
#[derive(Clone)]
pub struct ContainerListSync {
    api: Arc<dyn NodeApi>,
    store: KeyedStore<NodeId, ContainerList>,
}

impl ContainerListSync {
    pub fn new(api: Arc<dyn NodeApi>) -> Self {
        Self {
            api,
            store: KeyedStore::new(),
        }
    }

    /// Fetch the node's containers and replace the held list
    pub async fn refresh(&self, node_id: &str) -> ApiResult<Arc<ContainerList>> {
        debug!("Refreshing containers of node {}", node_id);
        let api = Arc::clone(&self.api);
        self.store
            .refresh_with(&node_id.to_string(), || async move {
                api.list_containers(node_id).await
            })
            .await
    }

    pub fn current(&self, node_id: &str) -> Option<Arc<ContainerList>> {
        self.store.current(&node_id.to_string())
    }

    pub fn snapshot(&self, node_id: &str) -> Snapshot<ContainerList> {
        self.store.snapshot(&node_id.to_string())
    }

    pub fn subscribe(&self, node_id: &str) -> watch::Receiver<Snapshot<ContainerList>> {
        self.store.subscribe(&node_id.to_string())
    }

    pub fn invalidate(&self, node_id: &str) {
        self.store.invalidate(&node_id.to_string());
    }
}

/// Per-node heads (name and container base URL)
#[derive(Clone)]
pub struct NodeHeadSync {
    api: Arc<dyn NodeApi>,
    store: KeyedStore<NodeId, NodeHead>,
}

impl NodeHeadSync {
    pub fn new(api: Arc<dyn NodeApi>) -> Self {
        Self {
            api,
            store: KeyedStore::new(),
        }
    }

    pub async fn refresh(&self, node_id: &str) -> ApiResult<Arc<NodeHead>> {
        debug!("Refreshing head of node {}", node_id);
        let api = Arc::clone(&self.api);
        self.store
            .refresh_with(&node_id.to_string(), || async move { api.node_head(node_id).await })
            .await
    }

    pub fn current(&self, node_id: &str) -> Option<Arc<NodeHead>> {
        self.store.current(&node_id.to_string())
    }

    pub fn subscribe(&self, node_id: &str) -> watch::Receiver<Snapshot<NodeHead>> {
        self.store.subscribe(&node_id.to_string())
    }

    pub fn invalidate(&self, node_id: &str) {
        self.store.invalidate(&node_id.to_string());
    }

    pub fn api(&self) -> &Arc<dyn NodeApi> {
        &self.api
    }
}
