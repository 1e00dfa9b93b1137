//! Client for the exchangerate.host API with a read-through response cache.

use crate::core::cache::{KeyOrder, KeyValueCollection, cache_key};
use crate::core::config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_TTL_SECONDS};
use crate::core::error::{RateError, Result};
use crate::core::query::{Param, Query};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct RateClient {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<dyn KeyValueCollection>,
    ttl: Duration,
    key_order: KeyOrder,
}

impl RateClient {
    pub fn new(cache: Arc<dyn KeyValueCollection>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, cache)
    }

    pub fn with_base_url(base_url: &str, cache: Arc<dyn KeyValueCollection>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxrates/1.0")
            .build()
            .map_err(RateError::Client)?;
        Ok(RateClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache,
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            key_order: KeyOrder::default(),
        })
    }

    /// Builds a client from the application config around an already opened
    /// cache collection.
    pub fn from_config(config: &AppConfig, cache: Arc<dyn KeyValueCollection>) -> Result<Self> {
        Ok(Self::with_base_url(&config.base_url, cache)?
            .with_ttl(config.ttl())
            .with_key_order(config.cache.key_order))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Latest rates.
    pub async fn rates(&self, query: Query) -> Result<Value> {
        self.fetch("/latest", &query).await
    }

    /// Converts `amount` (1 when `None`) of `from` into `to`.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Option<f64>,
        query: Query,
    ) -> Result<Value> {
        let required = Query::new()
            .with("from", from)
            .with("to", to)
            .with("amount", amount.unwrap_or(1.0));
        self.fetch("/convert", &required.union(query)).await
    }

    /// Rates as of a single day.
    pub async fn historical(&self, date: NaiveDate, query: Query) -> Result<Value> {
        let path = format!("/{}", date.format(DATE_FORMAT));
        self.fetch(&path, &query).await
    }

    /// Daily rates between two days.
    pub async fn timeseries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        query: Query,
    ) -> Result<Value> {
        self.fetch("/timeseries", &date_range(start, end).union(query))
            .await
    }

    /// Rate movement between two days.
    pub async fn fluctuation(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        query: Query,
    ) -> Result<Value> {
        self.fetch("/fluctuation", &date_range(start, end).union(query))
            .await
    }

    /// Supported currency symbols.
    pub async fn symbols(&self, query: Query) -> Result<Value> {
        self.fetch("/symbols", &query).await
    }

    /// VAT rates per country.
    pub async fn vat_rates(&self, query: Query) -> Result<Value> {
        self.fetch("/vat_rates", &query).await
    }

    /// GETs `path` with `query`, serving from the cache while the entry is live.
    ///
    /// Failed requests are never cached. Concurrent misses on the same key are
    /// not coalesced and each goes to the network.
    #[instrument(name = "RateFetch", skip(self, query), fields(path = %path))]
    pub async fn fetch(&self, path: &str, query: &Query) -> Result<Value> {
        let key = cache_key(path, query, self.key_order).map_err(RateError::Cache)?;

        if self.cache.has(&key).await.map_err(RateError::Cache)? {
            // the entry may expire between the two calls
            if let Some(cached) = self.cache.get(&key).await.map_err(RateError::Cache)? {
                return Ok(cached);
            }
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("Requesting {} with {} query params", url, query.len());

        let transport = |source| RateError::Transport {
            path: path.to_string(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(RateError::Status {
                status: response.status(),
                path: path.to_string(),
            });
        }

        let text = response.text().await.map_err(transport)?;
        let body: Value = serde_json::from_str(&text).map_err(|source| RateError::Decode {
            path: path.to_string(),
            source,
        })?;

        self.cache
            .add(&key, body.clone(), self.ttl)
            .await
            .map_err(RateError::Cache)?;

        Ok(body)
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> Query {
    Query::new()
        .with("start_date", Param::Str(start.format(DATE_FORMAT).to_string()))
        .with("end_date", Param::Str(end.format(DATE_FORMAT).to_string()))
}
