//! HTTP page fetching.
//!
//! # Architecture
//!
//! - [`Fetch`]: core trait, "give me the body behind this URL"
//! - [`HttpFetcher`]: `reqwest` client carrying the browser user-agent
//! - [`Throttled`]: decorator that waits a fixed delay before each request
//!
//! Requests are never retried. Bodies are returned whatever the HTTP status,
//! since a missing page is detected downstream by the absence of the
//! elements the parsers look for.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Anything that can turn a URL into page content.
pub trait Fetch {
    /// Fetch the body behind `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page
    ///
    /// # Returns
    ///
    /// The response body as text.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::ConnectionReset`] when the peer resets the connection,
    /// any other transport failure as [`ScrapeError::Http`].
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Plain GET requests with a fixed user-agent header.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` on every request.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Value of the `User-Agent` header
    ///
    /// # Returns
    ///
    /// The fetcher, or [`ScrapeError::Http`] if the TLS backend cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Non-success status; parsing body anyway");
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_transport(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Waits `delay` before delegating each request to `inner`.
pub struct Throttled<T> {
    inner: T,
    delay: Duration,
}

impl<T> Throttled<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<T> fmt::Debug for Throttled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("delay", &self.delay)
            .finish()
    }
}

impl<T: Fetch> Fetch for Throttled<T> {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.inner.fetch(url).await
    }
}

/// The fetcher `main` hands to the collectors.
///
/// # Arguments
///
/// * `config` - Supplies the user agent and the per-request delay
///
/// # Returns
///
/// An [`HttpFetcher`] wrapped in [`Throttled`]; a zero delay makes the wrapper a pass-through.
pub fn build_fetcher(config: &ScrapeConfig) -> Result<Throttled<HttpFetcher>, ScrapeError> {
    let http = HttpFetcher::new(&config.user_agent)?;
    Ok(Throttled::new(http, config.request_delay))
}
