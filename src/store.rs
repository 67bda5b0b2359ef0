//! CSV persistence for the headline table.
//!
//! The table lives in a single CSV file (default `infobae_noticias.csv`) with
//! the header `titulo,subtitulo,fecha_extraccion`. Files written by earlier
//! versions of the scraper load unchanged: same columns, same timestamp
//! format, plain UTF-8. The reader also accepts files with a UTF-8 BOM up
//! front, which spreadsheet tools prepend when they re-save the table.

use crate::models::Headline;
use itertools::Itertools;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from reading or writing the headline table.
///
/// `csv` deserialize errors already carry the record and line number, so a
/// malformed row reports where it sits in the file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("headline table I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("headline table: {0}")]
    Csv(#[from] csv::Error),
}

/// Write all records to `path`, replacing whatever was there. Plain UTF-8,
/// no BOM.
pub fn save_headlines(path: &Path, headlines: &[Headline]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    for headline in headlines {
        writer.serialize(headline)?;
    }
    writer.flush()?;
    info!(path = %path.display(), count = headlines.len(), "Saved headline table");
    Ok(())
}

/// Read the full table from `path`.
///
/// An empty or header-only file loads as an empty table. A row with a
/// malformed timestamp fails the whole load.
pub fn load_headlines(path: &Path) -> Result<Vec<Headline>, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut headlines = Vec::new();
    for row in reader.deserialize() {
        let headline: Headline = row?;
        headlines.push(headline);
    }
    debug!(path = %path.display(), count = headlines.len(), "Loaded headline table");
    Ok(headlines)
}

/// Merge `fresh` into the table at `path` and save the result.
///
/// Existing rows keep their position; fresh rows with an already-present
/// title are dropped. Returns the merged table.
pub fn append_headlines(path: &Path, fresh: Vec<Headline>) -> Result<Vec<Headline>, StoreError> {
    let mut all = if path.exists() {
        load_headlines(path)?
    } else {
        Vec::new()
    };
    let before = all.len();
    all.extend(fresh);
    let merged = dedupe_by_title(all);
    info!(
        path = %path.display(),
        existing = before,
        total = merged.len(),
        "Merged fresh headlines into table"
    );
    save_headlines(path, &merged)?;
    Ok(merged)
}

/// Drop records whose title already appeared, keeping the first occurrence.
///
/// Front pages repeat top stories across sections, and an RSS feed usually
/// overlaps the front page, so a scrape pass can see the same headline
/// several times.
pub fn dedupe_by_title(headlines: Vec<Headline>) -> Vec<Headline> {
    headlines
        .into_iter()
        .unique_by(|h| h.title.clone())
        .collect()
}
