//! JSON dumps of the scraped tables.
//!
//! Files are named by dataset and scrape date:
//! ```text
//! output_dir/
//! ├── nfl_injuries_20211005.json
//! └── nfl_players_20211005.json
//! ```

use crate::utils::{ensure_writable_dir, today_stamp};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Write `data` to `{output_dir}/{dataset}_{YYYYMMDD}.json`, creating the
/// directory if needed.
///
/// # Arguments
///
/// * `data` - Any serializable table or list of records
/// * `output_dir` - Directory to write into
/// * `dataset` - File name prefix, e.g. `nfl_injuries`
///
/// # Returns
///
/// The path of the written file, or an error if serialization, directory
/// creation or the write fails.
#[instrument(level = "info", skip(data))]
pub async fn write_dataset<T: Serialize + ?Sized>(
    data: &T,
    output_dir: &str,
    dataset: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    write_dataset_stamped(data, output_dir, dataset, &today_stamp()).await
}

/// Same as [`write_dataset`] with an explicit `stamp` in place of today's date.
///
/// # Output Path
///
/// The file is written to: `{output_dir}/{dataset}_{stamp}.json`
pub async fn write_dataset_stamped<T: Serialize + ?Sized>(
    data: &T,
    output_dir: &str,
    dataset: &str,
    stamp: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(data)?;
    ensure_writable_dir(output_dir).await?;

    let path = PathBuf::from(output_dir).join(format!("{dataset}_{stamp}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote dataset");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InjuryTable, SeasonPeriod};

    #[tokio::test]
    async fn test_write_injury_table() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();

        let mut table = InjuryTable::new(vec!["Player".into(), "Injuries".into()]);
        table.push(
            2020,
            SeasonPeriod::Regular(4),
            vec![Some("Saquon Barkley".into()), Some("Knee".into())],
        );

        let path = write_dataset_stamped(&table, dir, "nfl_injuries", "20201004")
            .await
            .unwrap();
        assert!(path.ends_with("nfl_injuries_20201004.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["Player"], "Saquon Barkley");
        assert_eq!(written[0]["period"], "REG4");
        assert_eq!(written[0]["year"], 2020);
    }

    #[tokio::test]
    async fn test_write_dataset_uses_today_stamp() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let path = write_dataset(&Vec::<u8>::new(), dir, "nfl_players").await.unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(name, format!("nfl_players_{}.json", today_stamp()));
    }
}
