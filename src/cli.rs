//! Command-line interface definitions.
//!
//! Global options can also come from environment variables.

use crate::config::{DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR, DEFAULT_START_YEAR};
use crate::models::SeasonPeriod;
use clap::{Parser, Subcommand};

/// Scrape NFL injury reports and player career statistics.
///
/// # Examples
///
/// ```sh
/// # Every injury report from 2000 through 2021
/// gridiron_scrape -o ./data injuries
///
/// # Two weeks of one season
/// gridiron_scrape injuries --from-year 2020 --to-year 2020 -p REG1 -p REG2
///
/// # Active players starting 2018 or later, last names A and B
/// gridiron_scrape -o ./data players --start-year 2018 -l A -l B
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml overriding endpoints and delays
    #[arg(short, long, env = "GRIDIRON_CONFIG")]
    pub config: Option<String>,

    /// Directory to write the resulting JSON dataset into
    #[arg(short, long, env = "GRIDIRON_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Pause before every request, in milliseconds
    #[arg(long, env = "GRIDIRON_REQUEST_DELAY_MS")]
    pub request_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape league injury reports for a range of seasons
    Injuries {
        /// First season (inclusive)
        #[arg(long, default_value_t = DEFAULT_FIRST_YEAR)]
        from_year: i32,

        /// Last season (inclusive)
        #[arg(long, default_value_t = DEFAULT_LAST_YEAR)]
        to_year: i32,

        /// Season period codes (REG1-REG17, POST1-POST4, PRO1); all when omitted
        #[arg(short, long = "period")]
        periods: Vec<SeasonPeriod>,
    },
    /// Fetch a single injury report and print its rows
    Report {
        /// Season, 1965 through the current year
        year: i32,

        /// Season period code, e.g. REG5
        period: String,
    },
    /// Scrape active player profiles and career statistics
    Players {
        /// Earliest career start year to include
        #[arg(long, default_value_t = DEFAULT_START_YEAR)]
        start_year: i32,

        /// Index letters to scrape; A-Z when omitted
        #[arg(short, long = "letter")]
        letters: Vec<char>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_help_carries_package_metadata() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_author(), Some(env!("CARGO_PKG_AUTHORS")));
        assert!(!env!("CARGO_PKG_AUTHORS").is_empty());
        assert!(env!("CARGO_PKG_REPOSITORY").starts_with("https://"));
    }

    #[test]
    fn test_injuries_defaults() {
        let cli = Cli::parse_from(["gridiron_scrape", "injuries"]);
        match cli.command {
            Command::Injuries {
                from_year,
                to_year,
                periods,
            } => {
                assert_eq!(from_year, 2000);
                assert_eq!(to_year, 2021);
                assert!(periods.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_injuries_periods_parse() {
        let cli = Cli::parse_from([
            "gridiron_scrape",
            "-o",
            "/tmp/out",
            "injuries",
            "-p",
            "REG1",
            "--period",
            "PRO1",
        ]);
        assert_eq!(cli.output_dir.as_deref(), Some("/tmp/out"));
        match cli.command {
            Command::Injuries { periods, .. } => {
                assert_eq!(periods, vec![SeasonPeriod::Regular(1), SeasonPeriod::ProBowl]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_period_rejected() {
        let result = Cli::try_parse_from(["gridiron_scrape", "injuries", "-p", "REG99"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_takes_raw_period() {
        let cli = Cli::parse_from(["gridiron_scrape", "report", "2020", "REG5"]);
        match cli.command {
            Command::Report { year, period } => {
                assert_eq!(year, 2020);
                assert_eq!(period, "REG5");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_players_flags() {
        let cli = Cli::parse_from([
            "gridiron_scrape",
            "--request-delay-ms",
            "500",
            "players",
            "--start-year",
            "2018",
            "-l",
            "A",
            "-l",
            "B",
        ]);
        assert_eq!(cli.request_delay_ms, Some(500));
        match cli.command {
            Command::Players {
                start_year,
                letters,
            } => {
                assert_eq!(start_year, 2018);
                assert_eq!(letters, vec!['A', 'B']);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
