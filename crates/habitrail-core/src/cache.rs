//! In-memory analytics cache with TTL expiry and prefix invalidation.
//!
//! Reports are cached as JSON values under string keys. Each key owns
//! its own slot lock, so concurrent readers of a cold key wait for the
//! single in-flight computation instead of recomputing it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::error::Result;

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL_MS: i64 = 5 * 60 * 1000;

struct CachedValue {
    data: serde_json::Value,
    stored_at_ms: i64,
    ttl_ms: i64,
}

impl CachedValue {
    fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.stored_at_ms <= self.ttl_ms
    }
}

#[derive(Default)]
struct Slot {
    value: Option<CachedValue>,
}

/// Keyed report cache shared by the analytics entry points.
pub struct AnalyticsCache {
    slots: Mutex<HashMap<String, Arc<Mutex<Slot>>>>,
    enabled: bool,
    default_ttl_ms: i64,
}

impl AnalyticsCache {
    pub fn new(enabled: bool, default_ttl_ms: i64) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            enabled,
            default_ttl_ms,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a key, returning the value only while it is fresh.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        if !self.enabled {
            return None;
        }
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(key)?.clone()
        };
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = guard.value.as_ref()?;
        if cached.is_fresh(Utc::now().timestamp_millis()) {
            Some(cached.data.clone())
        } else {
            None
        }
    }

    /// Store a value under the default TTL.
    pub fn set(&self, key: &str, value: serde_json::Value) {
        self.set_with_ttl(key, value, self.default_ttl_ms);
    }

    /// Store a value with an explicit TTL in milliseconds.
    pub fn set_with_ttl(&self, key: &str, value: serde_json::Value, ttl_ms: i64) {
        if !self.enabled {
            return;
        }
        let slot = self.slot_for(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.value = Some(CachedValue {
            data: value,
            stored_at_ms: Utc::now().timestamp_millis(),
            ttl_ms,
        });
    }

    /// Return the fresh cached value for `key`, or run `factory` and
    /// cache its output. The slot lock is held across the factory call,
    /// so at most one factory runs per key at a time; factory errors
    /// propagate without being cached.
    pub fn get_or_set<F>(&self, key: &str, factory: F) -> Result<serde_json::Value>
    where
        F: FnOnce() -> Result<serde_json::Value>,
    {
        if !self.enabled {
            return factory();
        }
        let slot = self.slot_for(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = &guard.value {
            if cached.is_fresh(Utc::now().timestamp_millis()) {
                return Ok(cached.data.clone());
            }
        }
        let data = factory()?;
        guard.value = Some(CachedValue {
            data: data.clone(),
            stored_at_ms: Utc::now().timestamp_millis(),
            ttl_ms: self.default_ttl_ms,
        });
        Ok(data)
    }

    /// Drop every entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        slots.retain(|key, _| !key.starts_with(prefix));
        before - slots.len()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }

    fn slot_for(&self, key: &str) -> Arc<Mutex<Slot>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Slot::default())))
            .clone()
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new(true, DEFAULT_TTL_MS)
    }
}
