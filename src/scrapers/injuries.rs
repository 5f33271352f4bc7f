//! League injury report scraper.
//!
//! Injury reports are published per season and period at
//! `{injury_base_url}/{year}/{period}` (e.g. `.../2020/REG5`). A page holds one
//! detailed report table per team playing that week; every table is lifted
//! into an [`InjuryTable`] and the results stacked.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::models::{INJURIES_COLUMN, InjuryTable, SeasonPeriod};
use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

static REPORT_TABLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table.d3-o-table.d3-o-table--detailed.d3-o-reports--detailed").unwrap()
});

/// Check the year and period code, returning the parsed period.
///
/// Years run from `config.min_year` through the current calendar year.
pub fn validate_request(
    config: &ScrapeConfig,
    year: i32,
    period: &str,
) -> Result<SeasonPeriod, ScrapeError> {
    check_year(config, year)?;
    period.parse()
}

fn check_year(config: &ScrapeConfig, year: i32) -> Result<(), ScrapeError> {
    let this_year = Local::now().year();
    if year < config.min_year || year > this_year {
        return Err(ScrapeError::InvalidParameter(format!(
            "the year must be between {} and {this_year}, got {year}",
            config.min_year
        )));
    }
    Ok(())
}

pub fn report_url(config: &ScrapeConfig, year: i32, period: SeasonPeriod) -> String {
    format!(
        "{}/{year}/{period}",
        config.injury_base_url.trim_end_matches('/')
    )
}

/// Fetch the injury report for one year and period code.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `config` - Supplies the report base URL and the earliest valid year
/// * `year` - Season, `config.min_year` through the current year
/// * `period` - Period code such as `REG5`, `POST1` or `PRO1`
///
/// # Returns
///
/// Every injured player listed on the page, tagged with `year` and `period`.
///
/// # Errors
///
/// - [`ScrapeError::InvalidParameter`] for an out-of-range year or unknown
///   period code, before any request is made
/// - [`ScrapeError::InjuryDataNotAvailable`] when the page carries no report tables
pub async fn get_injury_report<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    year: i32,
    period: &str,
) -> Result<InjuryTable, ScrapeError> {
    let period = validate_request(config, year, period)?;
    get_period_report(fetcher, config, year, period).await
}

/// Typed variant of [`get_injury_report`].
///
/// # Errors
///
/// Same as [`get_injury_report`]; a `period` outside the published codes
/// (e.g. `Regular(18)`) is [`ScrapeError::InvalidParameter`].
#[instrument(level = "info", skip(fetcher, config, period), fields(%period))]
pub async fn get_period_report<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    year: i32,
    period: SeasonPeriod,
) -> Result<InjuryTable, ScrapeError> {
    check_year(config, year)?;
    if !period.is_known() {
        return Err(ScrapeError::InvalidParameter(format!(
            "{period} is not a valid NFL season period code"
        )));
    }

    let url = report_url(config, year, period);
    let html = fetcher.fetch(&url).await?;
    let table = parse_injury_report(&html, year, period)?;
    debug!(rows = table.len(), %url, "Parsed injury report");
    Ok(table)
}

/// Parse every report table on an injury page.
///
/// Rows are tagged with `year` and `period`, rows without an injury
/// description are dropped and the remaining rows renumbered from zero.
///
/// # Arguments
///
/// * `html` - Raw page body
/// * `year` - Season the page belongs to
/// * `period` - Period the page belongs to
///
/// # Returns
///
/// The stacked table, or [`ScrapeError::InjuryDataNotAvailable`] when the
/// page has no report tables.
pub fn parse_injury_report(
    html: &str,
    year: i32,
    period: SeasonPeriod,
) -> Result<InjuryTable, ScrapeError> {
    let document = Html::parse_document(html);
    let tables: Vec<InjuryTable> = document
        .select(&REPORT_TABLE)
        .map(|t| parse_table(t, year, period))
        .collect();

    if tables.is_empty() {
        return Err(ScrapeError::InjuryDataNotAvailable { year, period });
    }

    let mut report = InjuryTable::concat(tables);
    report.retain_present(INJURIES_COLUMN);
    report.reindex();
    Ok(report)
}

/// Rows belonging to `table` itself, flagged when they sit in `thead`.
/// Footer rows and rows of tables nested in a cell are left out.
fn own_rows(table: ElementRef<'_>) -> Vec<(ElementRef<'_>, bool)> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push((child, false)),
            section @ ("thead" | "tbody") => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|r| r.value().name() == "tr")
                    .map(|r| (r, section == "thead")),
            ),
            _ => {}
        }
    }
    rows
}

/// Header from `thead` (or a leading all-`th` row), body from the other rows.
/// Without a header, columns are named by position.
fn parse_table(table: ElementRef<'_>, year: i32, period: SeasonPeriod) -> InjuryTable {
    let mut header: Option<Vec<String>> = None;
    let mut body: Vec<Vec<Option<String>>> = Vec::new();

    for (row, in_thead) in own_rows(table) {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let all_th = cells.iter().all(|c| c.value().name() == "th");

        if header.is_none() && body.is_empty() && (in_thead || all_th) {
            header = Some(
                cells
                    .iter()
                    .map(|c| cell_text(*c).unwrap_or_default())
                    .collect(),
            );
        } else if !in_thead {
            body.push(cells.into_iter().map(cell_text).collect());
        }
    }

    let columns = header.unwrap_or_else(|| {
        let width = body.iter().map(Vec::len).max().unwrap_or(0);
        (0..width).map(|i| i.to_string()).collect()
    });

    let mut out = InjuryTable::new(columns);
    for values in body {
        out.push(year, period, values);
    }
    out
}

/// Whitespace-normalized cell text, `None` when the cell is blank.
fn cell_text(cell: ElementRef<'_>) -> Option<String> {
    let text = cell.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Scrape every (year, period) pair and stack the results.
///
/// Pairs without a published report are skipped. Rows keep the index they
/// had on their own page.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `config` - Endpoint and year bounds
/// * `years` - Seasons to scrape, in order
/// * `periods` - Periods scraped for every season, in order
///
/// # Returns
///
/// All reports stacked in (year, period) order. Empty when nothing was
/// published.
///
/// # Errors
///
/// Any error other than [`ScrapeError::InjuryDataNotAvailable`] stops the batch.
#[instrument(level = "info", skip_all, fields(years = years.len(), periods = periods.len()))]
pub async fn scrape_injury_data<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    years: &[i32],
    periods: &[SeasonPeriod],
) -> Result<InjuryTable, ScrapeError> {
    let mut reports = Vec::new();

    for &year in years {
        info!(year, "Scraping NFL injury data");
        for &period in periods {
            match get_period_report(fetcher, config, year, period).await {
                Ok(report) => reports.push(report),
                Err(ScrapeError::InjuryDataNotAvailable { .. }) => {
                    debug!(year, %period, "No injury report published; skipping");
                }
                Err(e) => return Err(e),
            }
        }
    }

    let combined = InjuryTable::concat(reports);
    let (rows, columns) = combined.shape();
    info!(rows, columns, "Scraped injury data");
    Ok(combined)
}
