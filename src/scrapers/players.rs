//! Player profile scraper.
//!
//! Two-phase like the other scrapers:
//!
//! 1. **Indexing**: each letter's index page (`{players_base_url}/{letter}/`)
//!    lists every player whose last name starts with it. Active players are
//!    printed in bold, followed by their career span (`2018-2023`).
//! 2. **Fetching**: each profile page is parsed into a [`PlayerProfile`].
//!
//! The career totals on a profile page carry no ids or labels we can select
//! on; the only stable handle is the hover tooltip (`data-tip`) of the
//! column header next to each number. See [`career_stat_from_datatip`].

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::models::{CareerStats, PlayerProfile};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Index letters, A through Z.
pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const GP_TIP: &str = "Games played";
const AV_TIP: &str = "Approximate Value is our attempt to attach a single number to every player-season since 1960.<br>See the glossary for more information.";
const QBREC_TIP: &str = "Team record in games started by this QB (regular season)";
const CMP_PCT_TIP: &str = "Percentage of Passes Completed<br>Minimum 14 attempts per scheduled game to qualify as leader.<br />Minimum 1500 pass attempts to qualify as career leader.";
const YDS_PASS_TIP: &str =
    "Yards Gained by Passing<br>For teams, sack yardage is deducted from this total";
const YA_PASS_TIP: &str = "Yards gained per pass attempt <br>Minimum 14 attempts per scheduled game to qualify as leader.<br>Minimum 1500 pass attempts to qualify as career leader.";
const PASSING_TD_TIP: &str = "Passing Touchdowns";
const INT_THROWN_TIP: &str = "Interceptions thrown";
const SACKS_TIP: &str = "Sacks (official since 1982,<br />based on play-by-play, game film<br />and other research since 1960)";
const SOLO_TIP: &str = "Tackles<br>Before 1994:  unofficial and inconsistently recorded from team to team.  For amusement only.<br>1994-now:  unofficial but consistently recorded.<br>";
const FF_TIP: &str = "Number of times forced a fumble by the opposition recovered by either team";
const FANTPT_TIP: &str = concat!(
    "<b>Fantasy points:</b><br />\n",
    "\t\t\t\t\t\t\t\t1 point per 25 yards passing<br />\n",
    "\t\t\t\t\t\t\t\t4 points per passing touchdown<br />\n",
    "\t\t\t\t\t\t\t\t-2 points per interception thrown<br />\n",
    "\t\t\t\t\t\t\t\t1 point per 10 yards rushing/receiving<br />\n",
    "\t\t\t\t\t\t\t\t6 points per TD<br />\n",
    "\t\t\t\t\t\t\t\t2 points per two-point conversion<br />\n",
    "\t\t\t\t\t\t\t\t-2 points per fumble lost (est. prior to 1994)",
);

// Receiving
const REC_TIP: &str = "Receptions";
const YDS_RECEIVE_TIP: &str = "Receiving Yards";
const YR_TIP: &str = "Receiving Yards per Reception<br>Minimum 1.875 catches per game scheduled to qualify as leader.<br />Minimum 200 receptions to qualify as career leader.";
const RECEIVING_TD_TIP: &str = "Receiving Touchdowns";

// Rushing
const RUSH_TIP: &str = "Rushing Attempts (sacks not included in NFL)";
const YDS_RUSH_TIP: &str = "Rushing Yards Gained (sack yardage is not included by NFL)";
const YA_RUSH_TIP: &str = "Rushing Yards per Attempt<br>Minimum 6.25 rushes per game scheduled to qualify as leader.<br />Minimum 750 rushes to qualify as career leader.";
const RUSHING_TD_TIP: &str = "Rushing Touchdowns";

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static INFO: Lazy<Selector> = Lazy::new(|| Selector::parse("div#info.players").unwrap());
static NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"h1[itemprop="name"] span"#).unwrap());
static TEAM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[itemprop="affiliation"] a"#).unwrap());
static HEIGHT: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"span[itemprop="height"]"#).unwrap());
static WEIGHT: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"span[itemprop="weight"]"#).unwrap());
static BIRTH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[itemprop="birthDate"]"#).unwrap());
static AWARD: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[href="/awards/"]"#).unwrap());
static STRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").unwrap());
static STATS_PULLOUT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.stats_pullout").unwrap());
static DATATIP: Lazy<Selector> = Lazy::new(|| Selector::parse("span[data-tip]").unwrap());
static POSITION_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]").unwrap());

/// Convert a `feet-inches` height to centimeters, truncated.
///
/// Inches are weighted by 2.48, not 2.54, so `"6-2"` gives 187.
///
/// # Errors
///
/// [`ScrapeError::Malformed`] unless both halves are integers.
pub fn ft_in_to_cm(ft_in: &str) -> Result<i32, ScrapeError> {
    ft_in_to_cm_with(ft_in, '-')
}

pub fn ft_in_to_cm_with(ft_in: &str, delimiter: char) -> Result<i32, ScrapeError> {
    let malformed = || ScrapeError::Malformed {
        field: "height",
        value: ft_in.to_string(),
    };
    let mut parts = ft_in.split(delimiter);
    let feet: i32 = parts
        .next()
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(malformed)?;
    let inches: i32 = parts
        .next()
        .and_then(|i| i.trim().parse().ok())
        .ok_or_else(malformed)?;
    Ok((feet as f64 * 30.48 + inches as f64 * 2.48) as i32)
}

fn check_letter(letter: char) -> Result<(), ScrapeError> {
    if letter.is_ascii_uppercase() {
        Ok(())
    } else {
        Err(ScrapeError::InvalidParameter(format!(
            "index letter must be A-Z, got {letter:?}"
        )))
    }
}

pub fn index_url(config: &ScrapeConfig, letter: char) -> String {
    format!("{}/{letter}/", config.players_base_url.trim_end_matches('/'))
}

/// Discover profile links for one index letter.
///
/// Only players listed in bold (still active) whose career began in or after
/// `start_threshold` are returned, as site-relative paths.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `config` - Supplies the player index base URL
/// * `letter` - Index letter, `A` through `Z`
/// * `start_threshold` - Earliest career start year to keep
///
/// # Returns
///
/// Profile links in index order, e.g. `/players/B/BradTo00.htm`.
///
/// # Errors
///
/// [`ScrapeError::InvalidParameter`] for a letter outside `A`-`Z`, before any
/// request; fetch errors are passed through.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn gather_player_links<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    letter: char,
    start_threshold: i32,
) -> Result<Vec<String>, ScrapeError> {
    check_letter(letter)?;
    let html = fetcher.fetch(&index_url(config, letter)).await?;
    let links = parse_player_links(&html, letter, start_threshold)?;
    info!(count = links.len(), "Indexed player profile links");
    Ok(links)
}

/// Pure half of [`gather_player_links`].
///
/// # Arguments
///
/// * `html` - Raw index page body
/// * `letter` - Index letter the page belongs to
/// * `start_threshold` - Earliest career start year to keep
///
/// # Returns
///
/// Links of bold entries whose career began in or after `start_threshold`.
pub fn parse_player_links(
    html: &str,
    letter: char,
    start_threshold: i32,
) -> Result<Vec<String>, ScrapeError> {
    check_letter(letter)?;
    let pattern = Regex::new(&format!(r"/players/{letter}/(.*)\.htm"))
        .map_err(|e| ScrapeError::InvalidParameter(e.to_string()))?;
    let document = Html::parse_document(html);

    let mut links = Vec::new();
    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !pattern.is_match(href) {
            continue;
        }
        let Some(bold) = anchor.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if bold.value().name() != "b" {
            continue;
        }
        let Some(entry) = bold.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let text = entry.text().collect::<String>();
        match career_start(&text) {
            Some(start) if start >= start_threshold => links.push(href.to_string()),
            Some(_) => {}
            None => debug!(%href, "Index entry without a career span; skipping"),
        }
    }
    Ok(links)
}

/// First year of the trailing `YYYY-YYYY` span of an index entry.
fn career_start(entry_text: &str) -> Option<i32> {
    entry_text
        .split_whitespace()
        .last()?
        .split('-')
        .next()?
        .parse()
        .ok()
}

/// Fetch and parse one profile page.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `config` - Supplies the site base URL the link is resolved against
/// * `player_link` - Site-relative link from [`gather_player_links`]
///
/// # Returns
///
/// The parsed profile.
///
/// # Errors
///
/// [`ScrapeError::Url`] for an unresolvable link, a structural error for a
/// page missing biographical fields, and fetch errors as they come.
#[instrument(level = "debug", skip(fetcher, config))]
pub async fn get_player_profile<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    player_link: &str,
) -> Result<PlayerProfile, ScrapeError> {
    let url = Url::parse(&config.site_base_url)?.join(player_link)?;
    let html = fetcher.fetch(url.as_str()).await?;
    parse_player_profile(&html)
}

/// Text of the first child node, trimmed. Element children contribute
/// their full text.
fn first_content(element: ElementRef<'_>) -> Option<String> {
    let first = element.first_child()?;
    let text = match first.value().as_text() {
        Some(text) => text.to_string(),
        None => ElementRef::wrap(first)?.text().collect(),
    };
    Some(text.trim().to_string())
}

fn required<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    what: &'static str,
) -> Result<ElementRef<'a>, ScrapeError> {
    scope
        .select(selector)
        .next()
        .ok_or(ScrapeError::MissingElement(what))
}

fn required_content(
    scope: ElementRef<'_>,
    selector: &Selector,
    what: &'static str,
) -> Result<String, ScrapeError> {
    first_content(required(scope, selector, what)?).ok_or(ScrapeError::MissingElement(what))
}

/// First letter of the text after the `<strong>Position</strong>` label.
fn position_letter(info: ElementRef<'_>) -> Result<String, ScrapeError> {
    let label = info
        .select(&STRONG)
        .find(|s| s.text().collect::<String>() == "Position")
        .ok_or(ScrapeError::MissingElement("Position label"))?;
    let raw = label
        .next_sibling()
        .and_then(|n| n.value().as_text().map(|t| t.to_string()))
        .ok_or(ScrapeError::MissingElement("Position value"))?;

    let malformed = || ScrapeError::Malformed {
        field: "position",
        value: raw.clone(),
    };
    let value = raw.split(": ").nth(1).ok_or_else(malformed)?;
    POSITION_LETTER
        .find(value)
        .map(|m| m.as_str().to_string())
        .ok_or_else(malformed)
}

/// Parse a player profile page.
///
/// # Arguments
///
/// * `html` - Raw profile page body
///
/// # Returns
///
/// Biography, awards and the career totals found on the page.
///
/// # Errors
///
/// A structural error ([`ScrapeError::is_structural`]) when the info block or
/// any biographical field is missing, as on pages of long-retired players.
/// Career statistics never fail the parse; absent ones are `None`.
pub fn parse_player_profile(html: &str) -> Result<PlayerProfile, ScrapeError> {
    let document = Html::parse_document(html);
    let info = document
        .select(&INFO)
        .next()
        .ok_or(ScrapeError::MissingElement("div#info.players"))?;

    let name = required_content(info, &NAME, "name")?;
    let team = required_content(info, &TEAM, "team")?;
    let position = position_letter(info)?;
    let height = ft_in_to_cm(&required_content(info, &HEIGHT, "height")?)?;
    let weight = required_content(info, &WEIGHT, "weight")?;
    let birth_date = required(info, &BIRTH, "birth date")?
        .value()
        .attr("data-birth")
        .ok_or(ScrapeError::MissingElement("data-birth"))?
        .to_string();
    let awards = info
        .select(&AWARD)
        .map(|a| a.text().collect::<String>())
        .collect();

    let career_stats = career_stats(&document);

    Ok(PlayerProfile {
        name,
        team,
        position,
        height,
        weight,
        birth_date,
        awards,
        career_stats,
    })
}

fn career_stats(document: &Html) -> CareerStats {
    let stat = |tip: &str| career_stat_in_document(document, tip);
    CareerStats {
        games_played: stat(GP_TIP),
        approx_val: stat(AV_TIP),
        qbrec: stat(QBREC_TIP),
        cmp_pct: stat(CMP_PCT_TIP),
        yds_pass: stat(YDS_PASS_TIP),
        ya_pass: stat(YA_PASS_TIP),
        passing_td: stat(PASSING_TD_TIP),
        int_thrown: stat(INT_THROWN_TIP),
        sacks: stat(SACKS_TIP),
        solo: stat(SOLO_TIP),
        ff: stat(FF_TIP),
        rec: stat(REC_TIP),
        yds_receive: stat(YDS_RECEIVE_TIP),
        yr: stat(YR_TIP),
        receiving_td: stat(RECEIVING_TD_TIP),
        rush: stat(RUSH_TIP),
        yds_rush: stat(YDS_RUSH_TIP),
        ya_rush: stat(YA_RUSH_TIP),
        rushing_td: stat(RUSHING_TD_TIP),
        fantpt: stat(FANTPT_TIP),
    }
}

/// Read a career total by its tooltip.
///
/// Finds the `span` whose `data-tip` equals `datatip`, then returns the
/// first text of the last `<p>` sibling after it (the career column; earlier
/// siblings hold the latest season). `None` when the marker or the sibling
/// is missing, i.e. the stat does not apply to the player's position.
pub fn career_stat_from_datatip(scope: ElementRef<'_>, datatip: &str) -> Option<String> {
    let marker = scope
        .select(&DATATIP)
        .find(|span| span.value().attr("data-tip") == Some(datatip))?;
    let career = marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "p")
        .last()?;
    first_content(career)
}

/// [`career_stat_from_datatip`] against the stats pullout of a whole document.
pub fn career_stat_in_document(document: &Html, datatip: &str) -> Option<String> {
    let pullout = document.select(&STATS_PULLOUT).next()?;
    career_stat_from_datatip(pullout, datatip)
}

/// Drop repeated players, keeping the first occurrence of each
/// [`PlayerProfile::identity_key`].
pub fn dedup_profiles(profiles: Vec<PlayerProfile>) -> Vec<PlayerProfile> {
    profiles
        .into_iter()
        .unique_by(PlayerProfile::identity_key)
        .collect()
}

/// Scrape every active player whose career began in or after `start_year`.
///
/// Profiles that fail to parse are skipped. A connection reset pauses for
/// `config.reset_delay` and skips that player; the request is not retried.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `config` - Endpoints and the reset delay
/// * `letters` - Index letters to walk, in order
/// * `start_year` - Earliest career start year to include
///
/// # Returns
///
/// Profiles in discovery order, deduplicated by [`PlayerProfile::identity_key`].
///
/// # Errors
///
/// An invalid letter, or any fetch error other than a connection reset.
#[instrument(level = "info", skip(fetcher, config, letters))]
pub async fn scrape_nfl_player_data<F: Fetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    letters: &[char],
    start_year: i32,
) -> Result<Vec<PlayerProfile>, ScrapeError> {
    let mut profiles = Vec::new();

    for &letter in letters {
        let links = gather_player_links(fetcher, config, letter, start_year).await?;
        for link in links {
            match get_player_profile(fetcher, config, &link).await {
                Ok(profile) => {
                    debug!(%link, name = %profile.name, "Parsed player profile");
                    profiles.push(profile);
                }
                Err(e) if e.is_structural() => {
                    debug!(%link, error = %e, "Profile page not in expected shape; skipping");
                }
                Err(e) if e.is_connection_reset() => {
                    warn!(%link, delay = ?config.reset_delay, "Connection reset; pausing and skipping player");
                    sleep(config.reset_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    info!(count = profiles.len(), "Collected player profiles");
    let unique = dedup_profiles(profiles);
    info!(count = unique.len(), "Deduplicated player profiles");
    Ok(unique)
}
