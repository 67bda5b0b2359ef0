//! JSON summary output for an analysis run.
//!
//! Alongside its charts, every `analyze` run drops a machine-readable
//! `resumen_{timestamp}.json` into the charts directory. The file carries the
//! aggregates (counts, polarity, top terms) plus the list of chart files the
//! run produced, so consumers never have to guess which images belong
//! together.

use crate::models::AnalysisSummary;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument};

/// Write the run summary as pretty-printed JSON.
///
/// # Arguments
///
/// * `summary` - Aggregates of the run
/// * `dir` - Charts directory, assumed to exist
/// * `slug` - The run's timestamp slug, shared with the chart filenames
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn write_summary(
    summary: &AnalysisSummary,
    dir: &Path,
    slug: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    let path = dir.join(format!("resumen_{slug}.json"));

    if let Err(e) = fs::write(&path, json).await {
        error!(path = %path.display(), error = %e, "Failed to write summary");
        return Err(e.into());
    }
    info!(path = %path.display(), "Wrote analysis summary");

    Ok(path)
}

/// Load the most recent run summary from the charts directory, if any.
///
/// Timestamped filenames sort chronologically, so the lexicographically last
/// `resumen_*.json` is the newest. The standalone report command uses this to
/// recover the headline count for its cover page; anything unreadable just
/// means no count is shown.
pub async fn read_latest_summary(dir: &Path) -> Option<AnalysisSummary> {
    let mut entries = fs::read_dir(dir).await.ok()?;
    let mut newest: Option<PathBuf> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let is_summary = path
            .file_name()
            .map(|n| {
                let name = n.to_string_lossy();
                name.starts_with("resumen_") && name.ends_with(".json")
            })
            .unwrap_or(false);
        if is_summary
            && newest
                .as_ref()
                .map(|p| path.file_name() > p.file_name())
                .unwrap_or(true)
        {
            newest = Some(path);
        }
    }

    let path = newest?;
    match serde_json::from_str(&fs::read_to_string(&path).await.ok()?) {
        Ok(summary) => Some(summary),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Latest summary is unreadable; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TermCount;

    fn sample_summary() -> AnalysisSummary {
        AnalysisSummary {
            generated_at: "2025-03-01 10:00:00".to_string(),
            headline_count: 3,
            mean_polarity: -0.12,
            positive: 1,
            negative: 1,
            neutral: 1,
            top_words: vec![TermCount::new("crisis", 2)],
            top_people: vec![TermCount::new("Donald Trump", 1)],
            top_places: vec![],
            charts: vec!["graficos/wordcloud_20250301_100000.png".to_string()],
        }
    }

    #[tokio::test]
    async fn test_write_summary_round_trips() {
        let dir = std::env::temp_dir().join(format!("titulares-summary-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let path = write_summary(&sample_summary(), &dir, "20250301_100000")
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "resumen_20250301_100000.json");

        let raw = fs::read_to_string(&path).await.unwrap();
        let parsed: AnalysisSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.headline_count, 3);
        assert_eq!(parsed.top_words[0].term, "crisis");
        assert_eq!(parsed.charts.len(), 1);

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_write_summary_fails_on_missing_dir() {
        let dir = Path::new("/definitely/not/writable");
        let result = write_summary(&sample_summary(), dir, "x").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_latest_summary_picks_newest() {
        let dir = std::env::temp_dir().join(format!("titulares-latest-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let mut older = sample_summary();
        older.headline_count = 1;
        write_summary(&older, &dir, "20250301_080000").await.unwrap();

        let mut newer = sample_summary();
        newer.headline_count = 7;
        write_summary(&newer, &dir, "20250301_100000").await.unwrap();

        fs::write(dir.join("notas.txt"), "no soy un resumen")
            .await
            .unwrap();

        let latest = read_latest_summary(&dir).await.unwrap();
        assert_eq!(latest.headline_count, 7);

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_read_latest_summary_empty_dir() {
        let dir = std::env::temp_dir().join(format!("titulares-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        assert!(read_latest_summary(&dir).await.is_none());
        let _ = fs::remove_dir_all(&dir).await;
    }
}
