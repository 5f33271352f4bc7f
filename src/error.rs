//! Error taxonomy for the scrapers.
//!
//! Callers mostly care about one question: should this failure stop the run
//! or skip the current item? [`ScrapeError::is_structural`] and
//! [`ScrapeError::is_connection_reset`] answer it without matching on every
//! variant.

use crate::models::SeasonPeriod;
use std::error::Error as _;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while fetching or parsing a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A precondition on the call arguments failed. Raised before any request.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The injury page was fetched but carries no injury tables, usually a
    /// period that has not been played yet.
    #[error(
        "could not find any injury details for {year}/{period}, please check the year and period exist"
    )]
    InjuryDataNotAvailable { year: i32, period: SeasonPeriod },

    /// A required element is missing from the page.
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    /// An element was found but its contents could not be interpreted.
    #[error("malformed {field}: {value:?}")]
    Malformed { field: &'static str, value: String },

    /// The server dropped the connection, typically when throttling.
    #[error("connection reset while fetching {url}")]
    ConnectionReset { url: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Parse failures that mean "this page does not look like we expect".
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ScrapeError::MissingElement(_) | ScrapeError::Malformed { .. }
        )
    }

    pub fn is_connection_reset(&self) -> bool {
        matches!(self, ScrapeError::ConnectionReset { .. })
    }

    /// Map a transport error, promoting connection resets to their own variant.
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        let mut source = err.source();
        while let Some(inner) = source {
            if let Some(io_err) = inner.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::ConnectionReset {
                    return ScrapeError::ConnectionReset {
                        url: url.to_string(),
                    };
                }
            }
            source = inner.source();
        }
        ScrapeError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(ScrapeError::MissingElement("div#info").is_structural());
        assert!(
            ScrapeError::Malformed {
                field: "height",
                value: "six".into()
            }
            .is_structural()
        );
        assert!(!ScrapeError::InvalidParameter("year".into()).is_structural());
        assert!(
            !ScrapeError::ConnectionReset {
                url: "https://example.com".into()
            }
            .is_structural()
        );
    }

    #[test]
    fn test_not_available_message_names_the_page() {
        let err = ScrapeError::InjuryDataNotAvailable {
            year: 2031,
            period: SeasonPeriod::Regular(3),
        };
        assert!(err.to_string().contains("2031/REG3"));
    }
}
