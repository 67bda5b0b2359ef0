//! Utility functions for timestamps, text cleanup, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Timestamp slugs for chart and summary filenames
//! - Whitespace normalization for scraped text
//! - String truncation for logging
//! - File system validation for output directories

use chrono::NaiveDateTime;
use itertools::Itertools;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Format a timestamp as a filename-safe slug.
///
/// Chart files are named `{chart}_{slug}.png` and the JSON summary
/// `resumen_{slug}.json`. One slug is computed per analysis run and shared by
/// every file that run produces, so the files of a run sort together.
///
/// # Examples
///
/// ```ignore
/// // 2025-03-01 08:15:30 -> "20250301_081530"
/// ```
pub fn timestamp_slug(t: NaiveDateTime) -> String {
    t.format("%Y%m%d_%H%M%S").to_string()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
///
/// Text extracted from HTML keeps the source document's newlines and
/// indentation; headlines are stored single-line.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and a
/// character count indicator appended. Truncation counts characters rather
/// than bytes so accented Spanish text is never cut mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", cut, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file. Called before a run starts
/// rendering charts so a read-only charts directory fails up front instead of
/// after the scrape.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join(".probe_write");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_slug_format() {
        let t = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 30)
            .unwrap();
        assert_eq!(timestamp_slug(t), "20250301_081530");
    }

    #[test]
    fn test_timestamp_slug_pads_single_digits() {
        let t = NaiveDate::from_ymd_opt(2025, 1, 7)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(timestamp_slug(t), "20250107_030405");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Milei   anunció\n\t nuevas medidas  "),
            "Milei anunció nuevas medidas"
        );
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("   \n  "), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hola, mundo!";
        assert_eq!(truncate_for_log(s, 100), "Hola, mundo!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // Every character here is multi-byte; byte slicing would panic.
        let s = "áéíóúñ";
        assert_eq!(truncate_for_log(s, 3), "áéí…(+3 chars)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!("titulares-probe-{}", std::process::id()));
        let _ = stdfs::remove_dir_all(&dir);

        assert!(ensure_writable_dir(&dir).await.is_ok());
        assert!(dir.is_dir());

        let _ = stdfs::remove_dir_all(&dir);
    }
}
