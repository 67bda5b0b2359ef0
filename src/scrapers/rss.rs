//! RSS feed scraper for additional headline sources.
//!
//! The front page is the primary source; any configured RSS feeds are merged
//! in on top. Only three item fields matter here: `<title>` becomes the
//! headline, `<description>` the deck, and `<pubDate>` the record timestamp
//! when it parses as RFC 2822. Feeds wrap text in CDATA inconsistently and
//! often embed HTML inside descriptions, so both forms are handled and tags
//! are stripped.

use crate::fetch::FetchPage;
use crate::models::Headline;
use crate::utils::normalize_whitespace;
use chrono::{DateTime, NaiveDateTime};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::error::Error;
use tracing::{debug, error, info, instrument};

/// How many feeds are fetched at once. Order of the result follows the
/// configured feed order regardless of completion order.
const FEED_CONCURRENCY: usize = 4;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Fetch every configured feed and collect their headlines.
///
/// A failing feed is logged and skipped; it never fails the batch. Items
/// without a usable `<pubDate>` are stamped with `fallback_time`.
#[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
pub async fn fetch_feeds<F>(
    fetcher: &F,
    feeds: &[String],
    fallback_time: NaiveDateTime,
) -> Vec<Headline>
where
    F: FetchPage,
{
    if feeds.is_empty() {
        return Vec::new();
    }

    let batches: Vec<Vec<Headline>> = stream::iter(feeds)
        .map(|url| async move {
            match scrape_feed(fetcher, url, fallback_time).await {
                Ok(items) => {
                    debug!(%url, count = items.len(), "Parsed RSS feed");
                    items
                }
                Err(e) => {
                    error!(error = %e, %url, "RSS feed failed; skipping");
                    Vec::new()
                }
            }
        })
        .buffered(FEED_CONCURRENCY)
        .collect()
        .await;

    let headlines: Vec<Headline> = batches.into_iter().flatten().collect();
    info!(
        feeds = feeds.len(),
        count = headlines.len(),
        "Collected RSS headlines"
    );
    headlines
}

/// Fetch and parse a single feed.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn scrape_feed<F>(
    fetcher: &F,
    url: &str,
    fallback_time: NaiveDateTime,
) -> Result<Vec<Headline>, Box<dyn Error>>
where
    F: FetchPage,
{
    let xml = fetcher.fetch(url).await?;
    parse_feed(&xml, fallback_time)
}

/// Which `<item>` child the reader is currently inside.
#[derive(Clone, Copy)]
enum ItemField {
    Title,
    Description,
    PubDate,
}

fn field_buf<'a>(
    field: ItemField,
    title: &'a mut String,
    description: &'a mut String,
    pub_date: &'a mut String,
) -> &'a mut String {
    match field {
        ItemField::Title => title,
        ItemField::Description => description,
        ItemField::PubDate => pub_date,
    }
}

/// Extract headline records from RSS XML.
///
/// Only `<title>`, `<description>` and `<pubDate>` inside `<item>` elements
/// are read; the channel-level title and everything else is ignored. Items
/// without a non-empty title are dropped.
pub fn parse_feed(xml: &str, fallback_time: NaiveDateTime) -> Result<Vec<Headline>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    let mut headlines = Vec::new();

    let mut in_item = false;
    let mut field: Option<ItemField> = None;
    let mut title = String::new();
    let mut description = String::new();
    let mut pub_date = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    title.clear();
                    description.clear();
                    pub_date.clear();
                }
                b"title" if in_item => field = Some(ItemField::Title),
                b"description" if in_item => field = Some(ItemField::Description),
                b"pubDate" if in_item => field = Some(ItemField::PubDate),
                _ => field = None,
            },
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    in_item = false;
                    let headline_title = strip_tags(&title);
                    if !headline_title.is_empty() {
                        let subtitle = Some(strip_tags(&description)).filter(|d| !d.is_empty());
                        let extracted_at = parse_pub_date(&pub_date).unwrap_or(fallback_time);
                        headlines.push(Headline::new(headline_title, subtitle, extracted_at));
                    }
                }
                field = None;
            }
            Event::Text(e) => {
                if in_item {
                    if let Some(f) = field {
                        let text = e.xml_content()?;
                        field_buf(f, &mut title, &mut description, &mut pub_date).push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if in_item {
                    if let Some(f) = field {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        field_buf(f, &mut title, &mut description, &mut pub_date).push_str(&text);
                    }
                }
            }
            Event::GeneralRef(e) => {
                if in_item {
                    if let Some(f) = field {
                        let replacement = if let Some(ch) =
                            e.resolve_char_ref().map_err(|err| err.to_string())?
                        {
                            Some(ch.to_string())
                        } else {
                            match e.decode().map_err(|err| err.to_string())?.as_ref() {
                                "amp" => Some("&".to_string()),
                                "lt" => Some("<".to_string()),
                                "gt" => Some(">".to_string()),
                                "apos" => Some("'".to_string()),
                                "quot" => Some("\"".to_string()),
                                other => {
                                    debug!(entity = other, "Dropping unknown entity reference");
                                    None
                                }
                            }
                        };
                        if let Some(s) = replacement {
                            field_buf(f, &mut title, &mut description, &mut pub_date).push_str(&s);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(headlines)
}

/// Strip embedded markup and collapse whitespace.
fn strip_tags(s: &str) -> String {
    normalize_whitespace(&TAG_RE.replace_all(s, " "))
}

/// Parse an RFC 2822 `<pubDate>`, keeping the feed's own wall-clock time.
fn parse_pub_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc2822(trimmed) {
        Ok(dt) => Some(dt.naive_local()),
        Err(e) => {
            debug!(raw = trimmed, error = %e, "Unparseable pubDate; falling back to fetch time");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Infobae América</title>
    <description>Portada</description>
    <item>
      <title><![CDATA[Crisis económica golpea a la región]]></title>
      <description><![CDATA[<p>Los mercados reaccionaron con <b>fuertes caídas</b></p>]]></description>
      <pubDate>Sat, 01 Mar 2025 08:30:00 -0300</pubDate>
      <link>https://example.com/1</link>
    </item>
    <item>
      <title>Cumbre entre EEUU y China</title>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <description>Sin título, debe descartarse</description>
    </item>
  </channel>
</rss>"#;

    fn fallback() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_feed_items() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].title, "Crisis económica golpea a la región");
        assert_eq!(headlines[1].title, "Cumbre entre EEUU y China");
    }

    #[test]
    fn test_parse_feed_skips_channel_title() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        assert!(headlines.iter().all(|h| h.title != "Infobae América"));
    }

    #[test]
    fn test_description_html_is_stripped() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        assert_eq!(
            headlines[0].subtitle.as_deref(),
            Some("Los mercados reaccionaron con fuertes caídas")
        );
    }

    #[test]
    fn test_pub_date_used_when_parseable() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(headlines[0].extracted_at, expected);
    }

    #[test]
    fn test_bad_pub_date_falls_back_to_fetch_time() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        assert_eq!(headlines[1].extracted_at, fallback());
    }

    #[test]
    fn test_item_without_title_is_dropped() {
        let headlines = parse_feed(SAMPLE_FEED, fallback()).unwrap();
        assert!(headlines.iter().all(|h| h.subtitle.as_deref() != Some("Sin título, debe descartarse")));
    }

    #[test]
    fn test_escaped_ampersand_in_title() {
        let xml = r#"<rss><channel><item>
            <title>Petróleo &amp; gas en la agenda</title>
        </item></channel></rss>"#;
        let headlines = parse_feed(xml, fallback()).unwrap();
        assert_eq!(headlines[0].title, "Petróleo & gas en la agenda");
    }

    #[test]
    fn test_parse_pub_date() {
        assert_eq!(
            parse_pub_date("Sat, 01 Mar 2025 08:30:00 -0300"),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(8, 30, 0)
        );
        assert_eq!(parse_pub_date(""), None);
        assert_eq!(parse_pub_date("mañana"), None);
    }

    mod fetching {
        use super::*;

        #[derive(Debug)]
        struct FeedServer;

        impl FetchPage for FeedServer {
            async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
                if url.ends_with("/bad") {
                    Err("connection reset".into())
                } else {
                    Ok(SAMPLE_FEED.to_string())
                }
            }
        }

        #[tokio::test]
        async fn test_fetch_feeds_skips_failing_feed() {
            let feeds = vec![
                "https://example.com/rss".to_string(),
                "https://example.com/bad".to_string(),
            ];
            let headlines = fetch_feeds(&FeedServer, &feeds, fallback()).await;
            // Only the good feed contributes.
            assert_eq!(headlines.len(), 2);
        }

        #[tokio::test]
        async fn test_fetch_feeds_empty_list() {
            let headlines = fetch_feeds(&FeedServer, &[], fallback()).await;
            assert!(headlines.is_empty());
        }
    }
}
