//! Output writers for scraped datasets.
//!
//! - [`json`]: pretty-printed JSON files stamped with the scrape date

pub mod json;
