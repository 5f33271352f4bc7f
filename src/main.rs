//! # Gridiron Scrape
//!
//! Collects NFL injury reports and player profiles from public sports sites
//! and flattens them into tables.
//!
//! ## Usage
//!
//! ```sh
//! gridiron_scrape -o ./data injuries
//! gridiron_scrape report 2020 REG5
//! gridiron_scrape -o ./data players --start-year 2016
//! ```
//!
//! ## Architecture
//!
//! Each subcommand is a straight fetch → parse → collect loop:
//! 1. **Injuries**: one page per (season, period), every report table on it
//!    stacked into a single [`models::InjuryTable`]
//! 2. **Players**: one index page per letter to discover active players, then
//!    one profile page per player, deduplicated into [`models::PlayerProfile`]s
//!
//! Requests run one after another. The resulting table is written as JSON
//! when an output directory is given.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::ScrapeConfig;
use fetch::build_fetcher;
use models::{INJURIES_COLUMN, SeasonPeriod};
use outputs::json;
use scrapers::{injuries, players};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gridiron_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => ScrapeConfig::default(),
    };
    if let Some(ms) = args.request_delay_ms {
        config.request_delay = Duration::from_millis(ms);
    }

    // Fail before scraping for minutes if the results can't be saved.
    if let Some(dir) = &args.output_dir {
        if let Err(e) = utils::ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let fetcher = build_fetcher(&config)?;

    match args.command {
        Command::Injuries {
            from_year,
            to_year,
            periods,
        } => {
            let years = utils::year_range(from_year, to_year);
            let periods = if periods.is_empty() {
                SeasonPeriod::ALL.to_vec()
            } else {
                periods
            };

            let table = injuries::scrape_injury_data(&fetcher, &config, &years, &periods).await?;
            let (rows, columns) = table.shape();
            info!(rows, columns, "Injury scrape complete");

            if let Some(dir) = &args.output_dir {
                json::write_dataset(&table, dir, "nfl_injuries").await?;
            }
        }
        Command::Report { year, period } => {
            let table = injuries::get_injury_report(&fetcher, &config, year, &period).await?;
            if table.is_empty() {
                info!(year, %period, "Report published but lists no injuries");
            }
            for row in table.rows() {
                info!(
                    index = row.index,
                    player = ?table.value(row, "Player"),
                    injuries = ?table.value(row, INJURIES_COLUMN),
                    game_status = ?table.value(row, "Game Status"),
                    "Injury"
                );
            }

            if let Some(dir) = &args.output_dir {
                let dataset = format!("nfl_injuries_{year}_{period}");
                json::write_dataset(&table, dir, &dataset).await?;
            }
        }
        Command::Players {
            start_year,
            letters,
        } => {
            let letters = if letters.is_empty() {
                players::ALPHABET.to_vec()
            } else {
                letters
            };

            let profiles =
                players::scrape_nfl_player_data(&fetcher, &config, &letters, start_year).await?;
            info!(count = profiles.len(), "Player scrape complete");

            if let Some(dir) = &args.output_dir {
                json::write_dataset(&profiles, dir, "nfl_players").await?;
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
