//! Infobae América front-page scraper.
//!
//! Headlines on the front page are laid out as story cards: the headline text
//! sits in `h2.story-card-hl` elements and the deck (subtitle) in
//! `h3.story-card-deck` elements. The markup does not nest a card's deck
//! under its headline, so decks attach in order to the headlines that
//! survive the empty-text filter. An approximation, but it holds for the
//! common card layout.

use crate::config::SourceSettings;
use crate::fetch::FetchPage;
use crate::models::Headline;
use crate::utils::normalize_whitespace;
use chrono::NaiveDateTime;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Scrape the configured front page into headline records.
///
/// Every record is stamped with `extracted_at`; the page itself carries no
/// usable per-headline timestamps.
#[instrument(level = "info", skip_all, fields(url = %settings.url))]
pub async fn scrape_front_page<F>(
    fetcher: &F,
    settings: &SourceSettings,
    extracted_at: NaiveDateTime,
) -> Result<Vec<Headline>, Box<dyn Error>>
where
    F: FetchPage,
{
    let html = fetcher.fetch(&settings.url).await?;
    let headlines = parse_front_page(
        &html,
        &settings.headline_selector,
        &settings.deck_selector,
        extracted_at,
    )?;

    info!(
        count = headlines.len(),
        source = %settings.url,
        "Indexed front-page headlines"
    );
    if headlines.is_empty() {
        warn!("Front page produced no headlines; the page structure may have changed");
    }
    Ok(headlines)
}

/// Extract headline records from front-page HTML.
///
/// Whitespace-only headline elements are dropped first; decks then pair in
/// document order with the headlines that remain, so the i-th deck goes with
/// the i-th kept headline. Headlines past the last deck get none, and an
/// empty deck element keeps its slot but yields no subtitle.
pub fn parse_front_page(
    html: &str,
    headline_selector: &str,
    deck_selector: &str,
    extracted_at: NaiveDateTime,
) -> Result<Vec<Headline>, Box<dyn Error>> {
    let title_sel = Selector::parse(headline_selector).map_err(|e| e.to_string())?;
    let deck_sel = Selector::parse(deck_selector).map_err(|e| e.to_string())?;

    let document = Html::parse_document(html);
    let decks: Vec<String> = document
        .select(&deck_sel)
        .map(|element| normalize_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
        .collect();

    let mut headlines = Vec::new();
    for (i, element) in document.select(&title_sel).enumerate() {
        let title = normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if title.is_empty() {
            debug!(index = i, "Skipping empty headline element");
            continue;
        }
        let subtitle = decks.get(headlines.len()).cloned().filter(|d| !d.is_empty());
        headlines.push(Headline::new(title, subtitle, extracted_at));
    }

    Ok(headlines)
}
