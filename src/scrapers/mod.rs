//! Scrapers for the two sources.
//!
//! | Source | Module | Output |
//! |--------|--------|--------|
//! | League injury reports | [`injuries`] | [`InjuryTable`](crate::models::InjuryTable) |
//! | Pro Football Reference players | [`players`] | [`PlayerProfile`](crate::models::PlayerProfile) list |
//!
//! Both follow the same shape: validate parameters, build a URL, fetch
//! through a [`Fetch`](crate::fetch::Fetch) implementation, parse with
//! `scraper`. Parsing is kept in pure functions over HTML strings so it can
//! be exercised against fixture pages. Requests are issued one at a time.

pub mod injuries;
pub mod players;
