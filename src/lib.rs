pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::query::Query;
use crate::providers::RateClient;
use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Convert {
        from: String,
        to: String,
        amount: Option<f64>,
    },
    Historical {
        date: NaiveDate,
    },
    Timeseries {
        start: NaiveDate,
        end: NaiveDate,
    },
    Fluctuation {
        start: NaiveDate,
        end: NaiveDate,
    },
    Symbols,
    VatRates,
}

/// Per-invocation settings that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ttl: Option<Duration>,
    pub query: Query,
}

/// Builds the shared client the way the application wires it: config file
/// first, then the configured cache backend.
pub fn build_client(config: &AppConfig) -> Result<Arc<RateClient>> {
    let cache = store::open_collection(&config.cache)?;
    Ok(Arc::new(RateClient::from_config(config, cache)?))
}

/// Runs a single API command against an existing client.
pub async fn execute(client: &RateClient, command: AppCommand, query: Query) -> Result<Value> {
    let value = match command {
        AppCommand::Rates => client.rates(query).await?,
        AppCommand::Convert { from, to, amount } => {
            client.convert(&from, &to, amount, query).await?
        }
        AppCommand::Historical { date } => client.historical(date, query).await?,
        AppCommand::Timeseries { start, end } => client.timeseries(start, end, query).await?,
        AppCommand::Fluctuation { start, end } => client.fluctuation(start, end, query).await?,
        AppCommand::Symbols => client.symbols(query).await?,
        AppCommand::VatRates => client.vat_rates(query).await?,
    };
    Ok(value)
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    overrides: Overrides,
) -> Result<Value> {
    info!("fxrates starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_or_default()?,
    };
    if let Some(ttl) = overrides.ttl {
        config.ttl_seconds = ttl.as_secs();
    }
    debug!("Loaded config: {config:#?}");

    let client = build_client(&config)?;
    let value = execute(&client, command, overrides.query).await?;
    cli::output::print_json(&value)?;
    Ok(value)
}
