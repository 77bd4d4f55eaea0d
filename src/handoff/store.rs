//! Keyed, expiring storage for state crossing a page navigation

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::dates::{Clock, SystemClock};

/// Opaque key of a handoff record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandoffKey(String);

impl HandoffKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandoffKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HandoffKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for HandoffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a successful read does to a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Records stay readable until they expire
    #[default]
    Reusable,
    /// A record is removed by the first read
    SingleRead,
}

/// Storage for payloads handed from one page to the next
pub trait HandoffStore: Send + Sync {
    /// Store a payload under a fresh key
    fn put(&self, payload: Value) -> HandoffKey;

    /// Read a payload; expired or unknown keys yield `None`
    fn take(&self, key: &HandoffKey) -> Option<Value>;
}

#[derive(Debug)]
struct Entry {
    payload: Value,
    expires_at: NaiveDateTime,
}

/// In-process [`HandoffStore`] with per-record expiry
pub struct MemoryHandoffStore {
    entries: Mutex<HashMap<HandoffKey, Entry>>,
    ttl: Duration,
    policy: ReadPolicy,
    clock: Arc<dyn Clock>,
}

impl MemoryHandoffStore {
    pub fn new(ttl: Duration, policy: ReadPolicy) -> Self {
        Self::with_clock(ttl, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, policy: ReadPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Evict every expired record
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!("handoff: purged {} expired records", purged);
        }
        purged
    }

    /// Number of records that have not expired
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|entry| entry.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn put(&self, payload: Value) -> HandoffKey {
        let key = HandoffKey::generate();
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(NaiveDateTime::MAX);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < before {
            debug!("handoff: purged {} expired records", before - entries.len());
        }
        entries.insert(key.clone(), Entry { payload, expires_at });
        key
    }

    fn take(&self, key: &HandoffKey) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let expired = entries.get(key)?.expires_at <= now;
        if expired {
            debug!("handoff: record {} expired", key);
            entries.remove(key);
            return None;
        }
        match self.policy {
            ReadPolicy::SingleRead => entries.remove(key).map(|entry| entry.payload),
            ReadPolicy::Reusable => entries.get(key).map(|entry| entry.payload.clone()),
        }
    }
}

impl fmt::Debug for MemoryHandoffStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHandoffStore")
            .field("ttl", &self.ttl)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
