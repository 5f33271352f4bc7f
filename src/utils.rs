//! Small helpers shared by both scrapers and the output writers.

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Format a date as the compact `YYYYMMDD` stamp used in output file names.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Today's [`date_stamp`] in local time.
pub fn today_stamp() -> String {
    date_stamp(Local::now().date_naive())
}

/// Inclusive list of seasons between `first` and `last`.
pub fn year_range(first: i32, last: i32) -> Vec<i32> {
    (first..=last).collect()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let scratch_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_stamp() {
        let date = NaiveDate::from_ymd_opt(2021, 9, 7).unwrap();
        assert_eq!(date_stamp(date), "20210907");
    }

    #[test]
    fn test_today_stamp_shape() {
        let stamp = today_stamp();
        assert_eq!(stamp.len(), 8);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_year_range_inclusive() {
        assert_eq!(year_range(2019, 2021), vec![2019, 2020, 2021]);
        assert!(year_range(2021, 2019).is_empty());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        let nested = nested.to_str().unwrap();
        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
