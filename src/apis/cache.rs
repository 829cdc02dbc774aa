/// Short-TTL response cache keyed by request identifier
///
/// A hit bypasses the rate limiter, the breaker, and the network entirely.
/// Stale entries are evicted on read; `clear()` runs on provider stop so a
/// restarted instance begins cold.
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedEntry<T> {
    data: T,
    cached_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEntry<T>>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.cached_at) <= self.ttl => {
                Some(entry.data.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, data: T) {
        self.insert_at(key, data, Instant::now());
    }

    pub fn insert_at(&self, key: impl Into<String>, data: T, now: Instant) {
        self.entries.lock().unwrap().insert(
            key.into(),
            CachedEntry {
                data,
                cached_at: now,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
