//! Process-scoped key/value cache collaborator.
//!
//! Callers populate on first use per key and consult [`Cache::is_valid`]
//! before trusting an entry. Expiry is driven by an injectable [`Clock`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};

pub trait Cache<V>: Send + Sync {
    /// Returns the value for `key` if present and still valid.
    fn get(&self, key: &str) -> Option<V>;

    fn set(&self, key: &str, value: V);

    fn is_valid(&self, key: &str) -> bool;
}

/// In-memory cache with an optional time-to-live.
///
/// `ttl = None` keeps entries for the lifetime of the process.
pub struct MemoryCache<V, C = SystemClock> {
    entries: Mutex<HashMap<String, (V, DateTime<Utc>)>>,
    ttl: Option<Duration>,
    clock: C,
}

impl<V> MemoryCache<V, SystemClock> {
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V> Default for MemoryCache<V, SystemClock> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<V, C: Clock> MemoryCache<V, C> {
    #[must_use]
    pub fn with_clock(ttl: Option<Duration>, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn fresh(&self, stored_at: DateTime<Utc>) -> bool {
        self.ttl
            .is_none_or(|ttl| self.clock.now() < stored_at + ttl)
    }

    /// Drop every entry, forcing repopulation.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V, C> Cache<V> for MemoryCache<V, C>
where
    V: Clone + Send,
    C: Clock,
{
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|(_, stored_at)| self.fresh(*stored_at))
            .map(|(value, _)| value.clone())
    }

    fn set(&self, key: &str, value: V) {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (value, now));
    }

    fn is_valid(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .is_some_and(|(_, stored_at)| self.fresh(*stored_at))
    }
}
