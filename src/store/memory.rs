use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue {
    value: Value,
    expires_at: Instant,
}

impl CacheValue {
    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-process collection backed by a HashMap behind a mutex
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<String, CacheValue>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn has(&self, key: &str) -> Result<bool> {
        let cache = self.inner.lock().await;
        Ok(cache.get(key).is_some_and(CacheValue::is_live))
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut cache = self.inner.lock().await;
        let Some(entry) = cache.get(key) else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };
        if entry.is_live() {
            debug!("Cache HIT for key: {}", key);
            return Ok(Some(entry.value.clone()));
        }

        debug!("Cache entry expired for key: {}", key);
        cache.remove(key);
        Ok(None)
    }

    async fn add(&self, key: &str, value: Value, ttl: Duration) -> Result<bool> {
        let mut cache = self.inner.lock().await;
        if cache.get(key).is_some_and(CacheValue::is_live) {
            debug!("Cache ADD skipped, live entry for key: {}", key);
            return Ok(false);
        }

        // sweep expired entries, including keys that are never read again
        let before = cache.len();
        cache.retain(|_, entry| entry.is_live());
        if cache.len() < before {
            debug!("Cache SWEEP removed {} expired entries", before - cache.len());
        }

        let expires_at = Instant::now() + ttl;
        cache.insert(key.to_string(), CacheValue { value, expires_at });
        debug!("Cache PUT for key: {}", key);
        Ok(true)
    }
}
