//! Headline scrapers for the supported source kinds.
//!
//! Each scraper follows the same two-phase pattern:
//!
//! 1. **Fetching**: Download the page or feed through the retrying
//!    [`crate::fetch::FetchPage`] client
//! 2. **Parsing**: Extract headline records from the body with a pure
//!    function that tests can drive with canned input
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Infobae América | [`infobae`] | HTML scraping | Front-page headline cards |
//! | RSS feeds | [`rss`] | XML parsing | Any feed list from the config |
//!
//! Scrapers use:
//! - Concurrent feed fetching with `futures::stream`
//! - Graceful error handling (a failed source is logged and skipped)
//! - The fetch time as timestamp, unless the source carries its own

pub mod infobae;
pub mod rss;
