//! # Surf Glass Command Line
//!
//! Searches surf breaks and prints their latest forecast from
//! surf-forecast.com. The `parse` subcommand works on a saved page and never
//! touches the network, which is handy when the site changes its markup.
//!
//! Logs go to stderr through `tracing`; set `RUST_LOG=surf_glass=debug` to
//! follow every request and extraction stage.


use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use surf_glass::config::{Config, CONFIG_FILE};
use surf_glass::renderer::{draw_ascii, render_break, render_search_results};
use surf_glass::surf_data::{self, Break, SurfClient, SurfError};
use surf_glass::ForecastIssue;
use surf_glass::timezones::StaticTimezones;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "surf-glass", version, about = "Surf forecasts from surf-forecast.com")]
struct Cli {
    /// Read configuration from this file instead of ./surf-config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search surf breaks by name
    Search { query: String },

    /// Show the latest forecast for a break ID or name
    Forecast {
        #[arg(value_name = "BREAK")]
        ident: String,
    },

    /// Extract a forecast from a saved latest-forecast page
    Parse { file: PathBuf },

    /// Write the default configuration to ./surf-config.toml or --config
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("surf_glass=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON shape of the `forecast` subcommand.
#[derive(Serialize)]
struct ForecastReport<'a> {
    #[serde(rename = "break")]
    spot: &'a Break,
    forecast: &'a ForecastIssue,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn client(config: &Config) -> anyhow::Result<SurfClient> {
    SurfClient::new(&config.site).context("could not build HTTP client")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let config = &loaded;
    let as_json = cli.json;

    match cli.command {
        Command::Search { query } => {
            let client = client(config)?;
            let results = client.search_breaks(&query).await?;
            if as_json {
                print_json(&results)?;
            } else {
                print!("{}", render_search_results(&results));
            }
        }
        Command::Forecast { ident } => {
            let client = client(config)?;
            let spot = match ident.trim().parse::<u32>() {
                Ok(id) => client.break_details(id).await?,
                Err(_) => {
                    let (id, slug) = client.resolve_slug(&ident).await?;
                    client.describe_break(id, slug).await?
                }
            };
            let issue = client
                .latest_forecast_issue(&spot.slug)
                .await
                .with_context(|| format!("could not load forecast for {}", spot.name))?;

            if as_json {
                print_json(&ForecastReport {
                    spot: &spot,
                    forecast: &issue,
                })?;
            } else {
                println!("{}", render_break(&spot));
                draw_ascii(&issue, &config.display);
            }
        }
        Command::Parse { file } => parse_saved_page(&file, config, as_json)?,
        Command::Init { force } => {
            let path = init_config(cli.config.as_deref(), force)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Writes the default configuration, refusing to clobber an existing file.
fn init_config(path: Option<&Path>, force: bool) -> anyhow::Result<PathBuf> {
    let target = path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
    if target.exists() && !force {
        anyhow::bail!("{} already exists, pass --force to overwrite it", target.display());
    }

    let config = Config::default();
    match path {
        Some(path) => config.save_to_path(path)?,
        None => config.save()?,
    }
    Ok(target)
}

fn parse_saved_page(file: &Path, config: &Config, as_json: bool) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let issue = surf_data::parse_forecast_page(&html, &StaticTimezones)
        .with_context(|| format!("could not extract forecast from {}", file.display()))?;

    if as_json {
        print_json(&issue)
    } else {
        draw_ascii(&issue, &config.display);
        Ok(())
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    match rt.block_on(run(cli)) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if matches!(err.downcast_ref::<SurfError>(), Some(SurfError::BreakNotFound)) => {
            eprintln!("No surf break found");
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err),
    }
}
