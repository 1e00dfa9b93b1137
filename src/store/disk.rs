use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    expires_at: SystemTime,
}

/// Persistent collection stored in a fjall partition.
///
/// Entries survive restarts until they expire. Expired entries are dropped
/// when read, and swept on open and on every write.
pub struct DiskCollection {
    // Keeps the keyspace open for as long as the partition is in use
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn open(db_path: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(db_path)?;

        let keyspace = Config::new(db_path).open()?;
        let partition = keyspace.open_partition(name, PartitionCreateOptions::default())?;
        let collection = Self {
            _keyspace: keyspace,
            partition,
        };
        collection.purge_expired()?;
        Ok(collection)
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = SystemTime::now();
        let mut expired = Vec::new();
        for item in self.partition.iter() {
            let (key, raw) = item?;
            let entry: CacheEntry = serde_json::from_slice(&raw)?;
            if now >= entry.expires_at {
                expired.push(key);
            }
        }

        for key in &expired {
            self.partition.remove(&key[..])?;
        }
        if !expired.is_empty() {
            debug!("Cache SWEEP removed {} expired entries", expired.len());
        }
        Ok(expired.len())
    }

    fn live_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.partition.get(key)? else {
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_slice(&raw)?;
        if SystemTime::now() >= entry.expires_at {
            debug!("Cache entry expired for key: {}", key);
            self.partition.remove(key)?;
            return Ok(None);
        }
        Ok(Some(entry))
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.live_entry(key)?.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.live_entry(key)? {
            Some(entry) => {
                debug!("Cache HIT for key: {}", key);
                Ok(Some(entry.value))
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn add(&self, key: &str, value: Value, ttl: Duration) -> Result<bool> {
        if self.live_entry(key)?.is_some() {
            debug!("Cache ADD skipped, live entry for key: {}", key);
            return Ok(false);
        }

        self.purge_expired()?;

        let entry = CacheEntry {
            value,
            expires_at: SystemTime::now() + ttl,
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {}", key);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_disk_cache_get_add() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::open(dir.path(), "rates").unwrap();

        // Initially, cache is empty
        assert!(!cache.has("key1").await.unwrap());

        cache
            .add("key1", json!({"base": "EUR"}), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.has("key1").await.unwrap());
        assert_eq!(
            cache.get("key1").await.unwrap(),
            Some(json!({"base": "EUR"}))
        );

        // Get a non-existent key
        assert!(cache.get("key2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_add_keeps_live_entry() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::open(dir.path(), "rates").unwrap();
        let ttl = Duration::from_secs(60);

        assert!(cache.add("key1", json!(1), ttl).await.unwrap());
        assert!(!cache.add("key1", json!(2), ttl).await.unwrap());
        assert_eq!(cache.get("key1").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::open(dir.path(), "rates").unwrap();

        // Put value with 10ms TTL
        cache
            .add("key1", json!(123), Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(cache.get("key1").await.unwrap(), Some(json!(123)));

        // Wait for TTL expiration
        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("key1").await.unwrap().is_none());
        assert!(!cache.has("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_disk_cache_sweeps_expired_entries() {
        let dir = tempdir().unwrap();
        let cache = DiskCollection::open(dir.path(), "rates").unwrap();

        for key in ["2020-01-01", "2020-01-02"] {
            cache
                .add(key, json!(1), Duration::from_millis(10))
                .await
                .unwrap();
        }
        sleep(Duration::from_millis(20)).await;

        cache
            .add("latest", json!(2), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.partition.iter().count(), 1);
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }
}
