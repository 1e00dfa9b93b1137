//! Errors surfaced by the rates client

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request error for {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for {path}")]
    Status { status: StatusCode, path: String },

    #[error("Failed to parse JSON response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache error: {0}")]
    Cache(#[source] anyhow::Error),
}

pub type Result<T, E = RateError> = std::result::Result<T, E>;
