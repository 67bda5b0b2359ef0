//! Data models for scraped headlines and derived analysis results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Headline`]: one scraped headline row, CSV-compatible with the
//!   historical `infobae_noticias.csv` layout
//! - [`AnalysisSummary`]: per-run aggregate written next to the charts
//! - [`TermCount`]: a ranked term (word, person, or place) with its tally
//!
//! The CSV column names are Spanish (`titulo`, `subtitulo`, `fecha_extraccion`)
//! because existing data files use them; the Rust field names stay English and
//! the mapping is done with serde renames.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the CSV and in report headers.
///
/// Kept as `%Y-%m-%d %H:%M:%S` (space separator, no sub-seconds) so that data
/// files written by earlier versions of the scraper load unchanged.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single scraped headline.
///
/// The table of these records is the only persistent data the pipeline works
/// with. Analyses read the table and derive values (normalized words, lengths,
/// polarity scores, entities) transiently; nothing is written back into the
/// records themselves.
///
/// # Fields
///
/// * `title` - The headline text
/// * `subtitle` - The deck shown under the headline, when the page had one
/// * `extracted_at` - When the row entered the table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Headline {
    /// The headline text as displayed on the front page.
    #[serde(rename = "titulo")]
    pub title: String,
    /// The deck (subtitle) paired with the headline, empty for unpaired rows.
    #[serde(rename = "subtitulo")]
    pub subtitle: Option<String>,
    /// When the headline entered the table. For the front-page scraper this is
    /// the extraction time; for RSS sources it is the feed's publication time
    /// when the item carries one.
    #[serde(rename = "fecha_extraccion", with = "csv_timestamp")]
    pub extracted_at: NaiveDateTime,
}

impl Headline {
    pub fn new(
        title: impl Into<String>,
        subtitle: Option<String>,
        extracted_at: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.filter(|s| !s.trim().is_empty()),
            extracted_at,
        }
    }

    /// Title length in characters, not bytes.
    ///
    /// Accented Spanish letters are multi-byte in UTF-8; the length
    /// distribution chart counts characters so it matches what a reader sees.
    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    /// Hour of day (0-23) the headline was recorded at.
    pub fn hour(&self) -> u32 {
        use chrono::Timelike;
        self.extracted_at.time().hour()
    }
}

/// A term (word, person, or place) together with how often it appeared.
///
/// Ranking lists are ordered by descending count, ties broken alphabetically,
/// so repeated runs over the same table produce identical output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TermCount {
    /// The counted term, in its display form.
    pub term: String,
    /// Number of occurrences across all analyzed titles.
    pub count: usize,
}

impl TermCount {
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Aggregate results of one analysis run.
///
/// Each `analyze` execution produces one of these, serialized to
/// `resumen_{timestamp}.json` in the charts directory so runs can be compared
/// later without re-reading the chart images.
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalysisSummary {
    /// Run timestamp in [`TIMESTAMP_FORMAT`].
    pub generated_at: String,
    /// Number of headlines analyzed.
    pub headline_count: usize,
    /// Mean polarity over all headlines, in [-1, 1].
    pub mean_polarity: f64,
    /// Headlines classified positive.
    pub positive: usize,
    /// Headlines classified negative.
    pub negative: usize,
    /// Headlines in the neutral band.
    pub neutral: usize,
    /// Most frequent title words after stopword filtering.
    pub top_words: Vec<TermCount>,
    /// Most mentioned people.
    pub top_people: Vec<TermCount>,
    /// Most mentioned places.
    pub top_places: Vec<TermCount>,
    /// Chart files generated by this run, in generation order.
    pub charts: Vec<String>,
}

/// Serde adapter for [`TIMESTAMP_FORMAT`] timestamps.
///
/// chrono's default `NaiveDateTime` serde uses the ISO `T` separator, which
/// would break compatibility with CSVs written by earlier scraper versions.
mod csv_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
