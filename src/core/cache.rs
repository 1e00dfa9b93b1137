use crate::core::query::Query;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Prefix shared by every response cache key.
pub const KEY_NAMESPACE: &str = "exchangerates:";

/// A string keyed store of JSON values with per-entry expiry.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    /// Whether a live (non-expired) entry exists for `key`.
    async fn has(&self, key: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` for `ttl` unless a live entry already exists.
    ///
    /// Returns `true` when the value was written.
    async fn add(&self, key: &str, value: Value, ttl: Duration) -> Result<bool>;
}

/// How query parameters are ordered when building a cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Parameters keep the order the caller inserted them in, so
    /// `{a:1,b:2}` and `{b:2,a:1}` are cached separately.
    #[default]
    Insertion,
    /// Parameters are sorted by key first.
    Sorted,
}

/// Builds the cache key for a request: namespace, hex digest of the path and
/// the JSON form of the query (`[]` when empty).
pub fn cache_key(path: &str, query: &Query, order: KeyOrder) -> Result<String> {
    let digest = hex::encode(Sha256::digest(path.as_bytes()));
    let params = if query.is_empty() {
        "[]".to_string()
    } else {
        match order {
            KeyOrder::Insertion => serde_json::to_string(query)?,
            KeyOrder::Sorted => serde_json::to_string(&query.sorted())?,
        }
    };
    Ok(format!("{KEY_NAMESPACE}{digest}{params}"))
}
