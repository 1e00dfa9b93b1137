use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxrates::core::log::init_logging;
use fxrates::core::query::{Param, Query};
use std::time::Duration;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Cache lifetime in seconds, overrides the configuration file
    #[arg(long, global = true)]
    ttl: Option<u64>,

    /// Extra query parameter sent with the request, as KEY=VALUE
    #[arg(short = 'p', long = "param", global = true, value_parser = parse_param)]
    params: Vec<(String, Param)>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Latest exchange rates
    Rates,
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        /// Amount to convert
        #[arg(default_value_t = 1.0)]
        amount: f64,
    },
    /// Rates for a past day (YYYY-MM-DD)
    Historical { date: NaiveDate },
    /// Daily rates between two days
    Timeseries { start: NaiveDate, end: NaiveDate },
    /// Rate fluctuation between two days
    Fluctuation { start: NaiveDate, end: NaiveDate },
    /// Supported currency symbols
    Symbols,
    /// VAT rates per country
    VatRates,
}

impl From<Commands> for fxrates::AppCommand {
    fn from(cmd: Commands) -> fxrates::AppCommand {
        match cmd {
            Commands::Rates => fxrates::AppCommand::Rates,
            Commands::Convert { from, to, amount } => fxrates::AppCommand::Convert {
                from,
                to,
                amount: Some(amount),
            },
            Commands::Historical { date } => fxrates::AppCommand::Historical { date },
            Commands::Timeseries { start, end } => fxrates::AppCommand::Timeseries { start, end },
            Commands::Fluctuation { start, end } => {
                fxrates::AppCommand::Fluctuation { start, end }
            }
            Commands::Symbols => fxrates::AppCommand::Symbols,
            Commands::VatRates => fxrates::AppCommand::VatRates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, Param), String> {
    fxrates::cli::parse_param(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let overrides = fxrates::Overrides {
        ttl: cli.ttl.map(Duration::from_secs),
        query: cli.params.into_iter().collect::<Query>(),
    };

    let result = match cli.command {
        Some(Commands::Setup) => fxrates::cli::setup::setup(),
        Some(cmd) => {
            fxrates::run_command(cmd.into(), cli.config_path.as_deref(), overrides)
                .await
                .map(|_| ())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
