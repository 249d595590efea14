//! Request bookkeeping shared by the stores.
//!
//! - [`LoadState`]: lifecycle of one fetch family
//! - [`EntitySync`] / [`SyncLedger`]: optimistic mutation tracking per entity
//! - [`RequestTracker`]: correlation ids for discarding stale responses

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Lifecycle of an async operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Where a mutable entity stands relative to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySync<T> {
    /// Applied locally, awaiting the server.
    Pending { optimistic: T, last_good: T },
    /// Confirmed by the server.
    Committed(T),
    /// The server rejected the change; `last_good` is what it last confirmed.
    Failed { error: String, last_good: T },
}

impl<T> EntitySync<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, EntitySync::Pending { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntitySync::Failed { .. })
    }

    /// The value the server last agreed to.
    pub fn last_good(&self) -> &T {
        match self {
            EntitySync::Pending { last_good, .. } | EntitySync::Failed { last_good, .. } => {
                last_good
            }
            EntitySync::Committed(value) => value,
        }
    }
}

/// Per-entity [`EntitySync`] states.
#[derive(Debug, Clone)]
pub struct SyncLedger<K, T> {
    entries: HashMap<K, EntitySync<T>>,
}

impl<K, T> Default for SyncLedger<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, T: Clone> SyncLedger<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an optimistic change. `current` is the value before it; if
    /// the entity is already pending or failed, the older last-good value
    /// is kept.
    pub fn begin(&mut self, key: K, optimistic: T, current: T) {
        let last_good = match self.entries.remove(&key) {
            Some(EntitySync::Pending { last_good, .. }) | Some(EntitySync::Failed { last_good, .. }) => {
                last_good
            }
            Some(EntitySync::Committed(_)) | None => current,
        };
        self.entries
            .insert(key, EntitySync::Pending { optimistic, last_good });
    }

    /// The server confirmed `value`.
    pub fn commit(&mut self, key: K, value: T) {
        self.entries.insert(key, EntitySync::Committed(value));
    }

    /// The server rejected the change. Entities that were never pending
    /// fall back to `current` as their last-good value.
    pub fn fail(&mut self, key: K, error: impl Into<String>, current: T) {
        let last_good = match self.entries.remove(&key) {
            Some(EntitySync::Pending { last_good, .. }) | Some(EntitySync::Failed { last_good, .. }) => {
                last_good
            }
            Some(EntitySync::Committed(value)) => value,
            None => current,
        };
        self.entries.insert(
            key,
            EntitySync::Failed {
                error: error.into(),
                last_good,
            },
        );
    }

    /// Resolve a failed entity back to its last-good value, which is
    /// returned. Non-failed entities are left alone.
    pub fn revert(&mut self, key: &K) -> Option<T> {
        match self.entries.get(key) {
            Some(EntitySync::Failed { last_good, .. }) => {
                let value = last_good.clone();
                self.entries
                    .insert(key.clone(), EntitySync::Committed(value.clone()));
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get(&self, key: &K) -> Option<&EntitySync<T>> {
        self.entries.get(key)
    }

    /// Keys whose last change was rejected.
    pub fn failed_keys(&self) -> Vec<K> {
        self.entries
            .iter()
            .filter(|(_, s)| s.is_failed())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|s| s.is_pending()).count()
    }

    /// Forget everything, e.g. after a full refetch.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Correlation id of one in-flight operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub key: String,
    pub seq: u64,
}

/// Issues [`Ticket`]s and remembers, per key, the newest one settled.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next_seq: u64,
    issued: HashMap<String, u64>,
    settled: HashMap<String, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an operation on `key`.
    pub fn issue(&mut self, key: impl Into<String>) -> Ticket {
        self.next_seq += 1;
        let key = key.into();
        self.issued.insert(key.clone(), self.next_seq);
        Ticket {
            key,
            seq: self.next_seq,
        }
    }

    /// Settle a query. Returns false when a newer operation on the same key
    /// has already settled, meaning this response is stale.
    pub fn settle(&mut self, ticket: &Ticket) -> bool {
        match self.settled.get(&ticket.key) {
            Some(&latest) if latest > ticket.seq => false,
            _ => {
                self.settled.insert(ticket.key.clone(), ticket.seq);
                true
            }
        }
    }

    /// Settle a mutation. Mutations always apply; settling one makes any
    /// older in-flight query on the key stale.
    pub fn commit(&mut self, ticket: &Ticket) {
        let latest = self.settled.entry(ticket.key.clone()).or_insert(0);
        *latest = (*latest).max(ticket.seq);
    }

    /// Whether no newer operation on the key has been issued.
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.issued.get(&ticket.key) == Some(&ticket.seq)
    }

    /// Whether the newest operation issued on `key` has settled.
    pub fn is_idle(&self, key: &str) -> bool {
        self.issued.get(key) == self.settled.get(key)
    }
}
