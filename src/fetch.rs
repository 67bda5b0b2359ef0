//! HTTP fetching with exponential backoff retry logic.
//!
//! All network access goes through this module. It provides a small
//! trait-based design so scrapers can be tested against canned pages:
//! - [`FetchPage`]: core trait defining an async page fetch
//! - [`HttpFetcher`]: reqwest-backed implementation with the configured
//!   user agent and timeout
//! - [`RetryFetch`]: decorator that adds retry logic to any [`FetchPage`]
//!   implementation
//!
//! # Retry Strategy
//!
//! - Maximum 3 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::SourceSettings;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for fetching a page body over HTTP.
///
/// Implementors return the response body as text. The abstraction exists so
/// retry behavior can be layered on as a decorator and so scraper tests can
/// substitute canned HTML or XML for the network.
pub trait FetchPage {
    /// Fetch `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// reqwest-backed [`FetchPage`] implementation.
///
/// One instance carries one [`reqwest::Client`] and is reused across every
/// request of a run, so connection pooling applies across the front page and
/// all RSS feeds.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured user agent and per-request timeout.
    pub fn new(settings: &SourceSettings) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(StdDuration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        match self.client.get(url).send().await {
            Ok(response) => {
                let response = response.error_for_status().map_err(|e| {
                    warn!(
                        elapsed_ms = t0.elapsed().as_millis() as u128,
                        error = %e,
                        "Request returned error status"
                    );
                    e
                })?;
                let body = response.text().await?;
                debug!(
                    elapsed_ms = t0.elapsed().as_millis() as u128,
                    bytes = body.len(),
                    preview = %truncate_for_log(&body, 120),
                    "Fetched page"
                );
                Ok(body)
            }
            Err(e) => {
                warn!(
                    elapsed_ms = t0.elapsed().as_millis() as u128,
                    error = %e,
                    "Request failed"
                );
                Err(Box::new(e))
            }
        }
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchPage`]
/// implementation.
///
/// News sites throttle and time out intermittently; the decorator retries
/// transient failures before the scrape gives up on a source.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    /// Wrap an existing fetcher with retry logic.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(10),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage + fmt::Debug,
{
    #[instrument(level = "info", skip_all, fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(url).await {
                Ok(body) => {
                    return Ok(body);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Build the standard retrying fetcher for a run.
///
/// Up to 3 retry attempts with exponential backoff: 1s, 2s, 4s (capped at
/// 10s), plus jitter.
pub fn retrying_fetcher(settings: &SourceSettings) -> Result<RetryFetch<HttpFetcher>, Box<dyn Error>> {
    let http = HttpFetcher::new(settings)?;
    Ok(RetryFetch::new(http, 3, StdDuration::from_secs(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `fail_first` calls, then succeeds.
    #[derive(Debug)]
    struct FlakyFetcher {
        fail_first: usize,
        calls: AtomicUsize,
    }

    impl FlakyFetcher {
        fn new(fail_first: usize) -> Self {
            Self {
                fail_first,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FetchPage for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, Box<dyn Error>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err("transient failure".into())
            } else {
                Ok("<html></html>".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let flaky = FlakyFetcher::new(2);
        let fetcher = RetryFetch::new(flaky, 3, StdDuration::from_millis(1));

        let body = fetcher.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "<html></html>");
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let flaky = FlakyFetcher::new(usize::MAX);
        let fetcher = RetryFetch::new(flaky, 2, StdDuration::from_millis(1));

        let err = fetcher.fetch("https://example.com").await.unwrap_err();
        assert!(err.to_string().contains("transient"));
        // Initial attempt plus two retries.
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_immediate_success() {
        let flaky = FlakyFetcher::new(0);
        let fetcher = RetryFetch::new(flaky, 3, StdDuration::from_millis(1));

        fetcher.fetch("https://example.com").await.unwrap();
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 1);
    }
}
