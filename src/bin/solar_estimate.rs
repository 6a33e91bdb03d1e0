use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use validator::Validate;

use solar_savings::{
    config::{Config, DEFAULT_CONFIG_PATH},
    energy::estimate,
    report::{load_household, render_text},
    telemetry,
};

/// Estimate consumption, solar coverage, bill savings and system size for a
/// household described in a TOML or JSON file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct EstimateArgs {
    /// Household file (.toml or .json) with appliances and a solar setup
    household: PathBuf,

    /// Configuration file supplying assumptions and component costs
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Peak-equivalent sun hours per day
    #[arg(long)]
    sun_hours: Option<f64>,

    /// Grid tariff per kWh
    #[arg(long)]
    tariff: Option<f64>,

    /// Credit per exported kWh
    #[arg(long)]
    export_credit: Option<f64>,

    #[arg(long)]
    days_per_month: Option<f64>,

    #[arg(long)]
    currency: Option<String>,

    /// Print the full report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = EstimateArgs::parse();
    telemetry::init_cli_tracing(args.verbose);

    let cfg = Config::load_from(&args.config)?;
    let mut assumptions = cfg.assumptions;
    if let Some(v) = args.sun_hours {
        assumptions.sun_hours = v;
    }
    if let Some(v) = args.tariff {
        assumptions.tariff_per_kwh = v;
    }
    if let Some(v) = args.export_credit {
        assumptions.export_credit_per_kwh = v;
    }
    if let Some(v) = args.days_per_month {
        assumptions.days_per_month = v;
    }
    if let Some(v) = args.currency {
        assumptions.currency = v;
    }
    assumptions
        .validate()
        .context("invalid assumption override")?;
    debug!(?assumptions, "assumptions in effect");

    let request = load_household(&args.household)?;
    let report = estimate(&request, &assumptions, &cfg.costs)
        .with_context(|| format!("cannot estimate {}", args.household.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report)?);
    }
    Ok(())
}
