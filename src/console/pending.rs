//! In-flight operation tracking
//!
//! Holding a [`PendingToken`] for a key means an operation on that entity is
//! in flight; input targeting the same key is ignored until the token drops.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::core::{ContainerId, NodeId, ProjectName};

/// Entities a mutating operation can target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingKey {
    /// A container row (any lifecycle action)
    Container { node: NodeId, container: ContainerId },
    /// The container base URL dialog of a node
    NodeBaseUrl(NodeId),
    /// The server URL dialog
    ServerUrl,
    /// Save or delete of a compose library project
    ComposeProject(ProjectName),
    /// Add-environment dialog
    NewEnvironment,
}

impl PendingKey {
    pub fn container(node: &str, container: &str) -> Self {
        PendingKey::Container {
            node: node.to_string(),
            container: container.to_string(),
        }
    }
}

/// Shared set of keys with an operation in flight
#[derive(Debug)]
pub struct PendingSet<K: Eq + Hash> {
    inner: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Clone for PendingSet<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash> Default for PendingSet<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K: Eq + Hash + Clone + std::fmt::Debug> PendingSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        // The set stays consistent even if a holder panicked mid-insert
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `key`; `None` if an operation on it is already in flight
    pub fn try_acquire(&self, key: K) -> Option<PendingToken<K>> {
        let mut set = self.lock();
        if !set.insert(key.clone()) {
            debug!("Ignoring duplicate request for {:?}", key);
            return None;
        }
        Some(PendingToken {
            key,
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Releases its key when dropped
#[derive(Debug)]
pub struct PendingToken<K: Eq + Hash> {
    key: K,
    inner: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> PendingToken<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash> Drop for PendingToken<K> {
    fn drop(&mut self) {
        let mut set = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.key);
    }
}
