//! Data models for scraped injury reports and player profiles.
//!
//! - [`SeasonPeriod`]: the coded week/round an injury report belongs to
//! - [`InjuryTable`] / [`InjuryRecord`]: rows lifted out of the league injury tables
//! - [`PlayerProfile`] / [`CareerStats`]: one record per scraped player page
//!
//! Injury tables keep whatever columns the source page publishes, so a row is
//! stored as values aligned with the owning table's column list rather than as
//! a fixed struct.

use crate::error::ScrapeError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Column holding the injury description. Rows without it are dropped.
pub const INJURIES_COLUMN: &str = "Injuries";

/// A week or round within an NFL season, as used in injury report URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeasonPeriod {
    /// Regular-season week 1..=17 (`REG1`..`REG17`).
    Regular(u8),
    /// Post-season round 1..=4 (`POST1`..`POST4`).
    Post(u8),
    /// The all-star exhibition (`PRO1`).
    ProBowl,
}

impl SeasonPeriod {
    /// Every period in the order the league calendar runs through them.
    pub const ALL: [SeasonPeriod; 22] = [
        SeasonPeriod::Regular(1),
        SeasonPeriod::Regular(2),
        SeasonPeriod::Regular(3),
        SeasonPeriod::Regular(4),
        SeasonPeriod::Regular(5),
        SeasonPeriod::Regular(6),
        SeasonPeriod::Regular(7),
        SeasonPeriod::Regular(8),
        SeasonPeriod::Regular(9),
        SeasonPeriod::Regular(10),
        SeasonPeriod::Regular(11),
        SeasonPeriod::Regular(12),
        SeasonPeriod::Regular(13),
        SeasonPeriod::Regular(14),
        SeasonPeriod::Regular(15),
        SeasonPeriod::Regular(16),
        SeasonPeriod::Regular(17),
        SeasonPeriod::Post(1),
        SeasonPeriod::Post(2),
        SeasonPeriod::Post(3),
        SeasonPeriod::ProBowl,
        SeasonPeriod::Post(4),
    ];

    pub fn is_known(&self) -> bool {
        Self::ALL.contains(self)
    }
}

impl fmt::Display for SeasonPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonPeriod::Regular(week) => write!(f, "REG{week}"),
            SeasonPeriod::Post(round) => write!(f, "POST{round}"),
            SeasonPeriod::ProBowl => f.write_str("PRO1"),
        }
    }
}

impl FromStr for SeasonPeriod {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeasonPeriod::ALL
            .iter()
            .copied()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| {
                ScrapeError::InvalidParameter(format!(
                    "{s:?} is not a valid NFL season period code (expected REG1-REG17, POST1-POST4 or PRO1)"
                ))
            })
    }
}

impl TryFrom<String> for SeasonPeriod {
    type Error = ScrapeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeasonPeriod> for String {
    fn from(period: SeasonPeriod) -> Self {
        period.to_string()
    }
}

/// One player-injury row from a league injury report.
#[derive(Debug, Clone, PartialEq)]
pub struct InjuryRecord {
    /// Zero-based position within the page the row came from.
    pub index: usize,
    pub year: i32,
    pub period: SeasonPeriod,
    /// Cell values aligned with [`InjuryTable::columns`]; `None` for empty cells.
    pub values: Vec<Option<String>>,
}

/// Rows sharing one ordered column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjuryTable {
    columns: Vec<String>,
    rows: Vec<InjuryRecord>,
}

impl InjuryTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[InjuryRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows by columns, counting the appended `year` and `period` columns.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len() + 2)
    }

    /// Append a row. Values beyond the column count are ignored and missing
    /// trailing values are treated as empty.
    pub fn push(&mut self, year: i32, period: SeasonPeriod, mut values: Vec<Option<String>>) {
        values.resize(self.columns.len(), None);
        let index = self.rows.len();
        self.rows.push(InjuryRecord {
            index,
            year,
            period,
            values,
        });
    }

    /// Value of `column` in `record`, if the column exists and the cell is filled.
    pub fn value<'a>(&self, record: &'a InjuryRecord, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        record.values.get(idx)?.as_deref()
    }

    /// Keep only rows with a value in `column`. A table without that column
    /// keeps nothing.
    pub fn retain_present(&mut self, column: &str) {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self
                .rows
                .retain(|r| r.values.get(idx).is_some_and(Option::is_some)),
            None => self.rows.clear(),
        }
    }

    /// Renumber row indices as 0..len.
    pub fn reindex(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.index = i;
        }
    }

    /// Stack tables vertically. Columns are the ordered union of the inputs;
    /// cells for columns a table lacked are empty. Row indices are kept.
    pub fn concat<I>(tables: I) -> InjuryTable
    where
        I: IntoIterator<Item = InjuryTable>,
    {
        let mut out = InjuryTable::default();
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|col| match out.columns.iter().position(|c| c == col) {
                    Some(idx) => idx,
                    None => {
                        out.columns.push(col.clone());
                        for row in &mut out.rows {
                            row.values.push(None);
                        }
                        out.columns.len() - 1
                    }
                })
                .collect();

            for row in table.rows {
                let mut values = vec![None; out.columns.len()];
                for (src, value) in row.values.into_iter().enumerate() {
                    if let Some(&dst) = mapping.get(src) {
                        values[dst] = value;
                    }
                }
                out.rows.push(InjuryRecord { values, ..row });
            }
        }
        out
    }
}

/// Rows serialize as objects keyed by column name, in column order, followed
/// by `year` and `period`.
impl Serialize for InjuryTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                record: row,
            })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    columns: &'a [String],
    record: &'a InjuryRecord,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 2))?;
        for (column, value) in self.columns.iter().zip(&self.record.values) {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry("year", &self.record.year)?;
        map.serialize_entry("period", &self.record.period)?;
        map.end()
    }
}

/// Career totals from the stats pullout of a player page. A `None` field
/// means the statistic is not published for the player's position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerStats {
    pub games_played: Option<String>,
    pub approx_val: Option<String>,
    pub qbrec: Option<String>,
    pub cmp_pct: Option<String>,
    pub yds_pass: Option<String>,
    pub ya_pass: Option<String>,
    pub passing_td: Option<String>,
    pub int_thrown: Option<String>,
    pub sacks: Option<String>,
    pub solo: Option<String>,
    pub ff: Option<String>,
    pub rec: Option<String>,
    pub yds_receive: Option<String>,
    pub yr: Option<String>,
    pub receiving_td: Option<String>,
    pub rush: Option<String>,
    pub yds_rush: Option<String>,
    pub ya_rush: Option<String>,
    pub rushing_td: Option<String>,
    pub fantpt: Option<String>,
}

/// (name, team, position, height, weight, birth_date)
pub type IdentityKey = (String, String, String, i32, String, String);

/// Biographical data and career totals for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub team: String,
    /// Single uppercase letter, the first letter of the listed position.
    pub position: String,
    /// Centimeters, see [`crate::scrapers::players::ft_in_to_cm`].
    pub height: i32,
    /// As printed on the page, e.g. `"220lb"`.
    pub weight: String,
    /// `data-birth` attribute, `YYYY-MM-DD`.
    pub birth_date: String,
    pub awards: Vec<String>,
    pub career_stats: CareerStats,
}

impl PlayerProfile {
    /// Fields that identify a player across duplicate index listings.
    pub fn identity_key(&self) -> IdentityKey {
        (
            self.name.clone(),
            self.team.clone(),
            self.position.clone(),
            self.height,
            self.weight.clone(),
            self.birth_date.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_period_codes_parse_and_display() {
        assert_eq!("REG17".parse::<SeasonPeriod>().unwrap(), SeasonPeriod::Regular(17));
        assert_eq!("POST4".parse::<SeasonPeriod>().unwrap(), SeasonPeriod::Post(4));
        assert_eq!("PRO1".parse::<SeasonPeriod>().unwrap(), SeasonPeriod::ProBowl);
        assert_eq!(SeasonPeriod::Regular(9).to_string(), "REG9");
    }

    #[test]
    fn test_unknown_period_codes_rejected() {
        for code in ["REG18", "REG0", "POST5", "PRO2", "reg1", ""] {
            let err = code.parse::<SeasonPeriod>().unwrap_err();
            assert!(matches!(err, ScrapeError::InvalidParameter(_)), "{code}");
        }
        assert!(!SeasonPeriod::Regular(18).is_known());
    }

    #[test]
    fn test_period_list_order() {
        assert_eq!(SeasonPeriod::ALL[0], SeasonPeriod::Regular(1));
        assert_eq!(SeasonPeriod::ALL[20], SeasonPeriod::ProBowl);
        assert_eq!(SeasonPeriod::ALL[21], SeasonPeriod::Post(4));
    }

    #[test]
    fn test_retain_present_and_reindex() {
        let mut table = InjuryTable::new(cols(&["Player", "Injuries"]));
        table.push(2020, SeasonPeriod::Regular(1), vec![some("A"), some("Knee")]);
        table.push(2020, SeasonPeriod::Regular(1), vec![some("B"), None]);
        table.push(2020, SeasonPeriod::Regular(1), vec![some("C"), some("Ankle")]);

        table.retain_present(INJURIES_COLUMN);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].index, 2);

        table.reindex();
        let indices: Vec<usize> = table.rows().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(table.value(&table.rows()[1], "Player"), Some("C"));
    }

    #[test]
    fn test_retain_present_without_column_empties_table() {
        let mut table = InjuryTable::new(cols(&["Player"]));
        table.push(2020, SeasonPeriod::Regular(1), vec![some("A")]);
        table.retain_present(INJURIES_COLUMN);
        assert!(table.is_empty());
    }

    #[test]
    fn test_concat_unions_columns() {
        let mut a = InjuryTable::new(cols(&["Player", "Injuries"]));
        a.push(2019, SeasonPeriod::Regular(2), vec![some("A"), some("Hip")]);
        let mut b = InjuryTable::new(cols(&["Player", "Game Status", "Injuries"]));
        b.push(2019, SeasonPeriod::Regular(3), vec![some("B"), some("Out"), some("Toe")]);

        let merged = InjuryTable::concat([a, b]);
        assert_eq!(merged.columns(), &cols(&["Player", "Injuries", "Game Status"])[..]);
        assert_eq!(merged.shape(), (2, 5));
        let first = &merged.rows()[0];
        let second = &merged.rows()[1];
        assert_eq!(merged.value(first, "Game Status"), None);
        assert_eq!(merged.value(second, "Game Status"), Some("Out"));
        assert_eq!(merged.value(second, "Injuries"), Some("Toe"));
        assert_eq!(second.index, 0);
    }

    #[test]
    fn test_table_serializes_rows_as_objects() {
        let mut table = InjuryTable::new(cols(&["Player", "Injuries"]));
        table.push(2021, SeasonPeriod::Post(1), vec![some("A"), None]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"Player":"A","Injuries":null,"year":2021,"period":"POST1"}]"#
        );
    }

    #[test]
    fn test_profile_round_trips_through_json() {
        let profile = PlayerProfile {
            name: "Joe Burrow".into(),
            team: "Cincinnati Bengals".into(),
            position: "Q".into(),
            height: 188,
            weight: "221lb".into(),
            birth_date: "1996-12-10".into(),
            awards: vec![],
            career_stats: CareerStats {
                games_played: some("52"),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["career_stats"]["games_played"], "52");
        assert!(json["career_stats"]["sacks"].is_null());
        let back: PlayerProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }
}
