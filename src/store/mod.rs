pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use crate::core::config::{CacheBackend, CacheConfig};
use anyhow::{Context, Result};
use disk::DiskCollection;
use memory::MemoryCollection;
use std::sync::Arc;
use tracing::debug;

/// Partition holding cached API responses in the disk store.
const RESPONSES_PARTITION: &str = "responses";

/// Opens the collection selected by the cache configuration.
pub fn open_collection(config: &CacheConfig) -> Result<Arc<dyn KeyValueCollection>> {
    match config.backend {
        CacheBackend::Memory => {
            debug!("Using in-memory response cache");
            Ok(Arc::new(MemoryCollection::new()))
        }
        CacheBackend::Disk => {
            let path = config.data_path()?;
            debug!("Using disk response cache at {}", path.display());
            let collection = DiskCollection::open(&path, RESPONSES_PARTITION)
                .with_context(|| format!("Failed to open cache store at {}", path.display()))?;
            Ok(Arc::new(collection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_open_memory_collection() {
        let collection = open_collection(&CacheConfig::default()).unwrap();
        collection
            .add("k", json!(1), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(collection.has("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_disk_collection() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            backend: CacheBackend::Disk,
            path: Some(dir.path().join("cache").to_string_lossy().into_owned()),
            ..Default::default()
        };

        let collection = open_collection(&config).unwrap();
        collection
            .add("k", json!("v"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(collection.get("k").await.unwrap(), Some(json!("v")));
    }
}
