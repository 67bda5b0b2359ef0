//! Chart rendering for analysis runs.
//!
//! Every chart is a 1200x600 PNG written into the charts directory with the
//! run's timestamp slug in the name, `{stem}_{YYYYmmdd_HHMMSS}.png`. Each
//! renderer returns `Ok(None)` when its input is empty: a run over a table
//! with no entity mentions, for example, simply has no `personas_*` chart
//! rather than an error.

use crate::models::{Headline, TermCount};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 600;

/// Bin count shared by the length and sentiment histograms.
pub const HISTOGRAM_BINS: usize = 20;

const BAR_BLUE: RGBColor = RGBColor(52, 152, 219);
const BAR_CORAL: RGBColor = RGBColor(240, 128, 128);
const BAR_GREEN: RGBColor = RGBColor(46, 204, 113);
const BAR_PURPLE: RGBColor = RGBColor(155, 89, 182);
const BAR_ORANGE: RGBColor = RGBColor(230, 126, 34);
const MEAN_RED: RGBColor = RGBColor(231, 76, 60);
const REFERENCE_GREY: RGBColor = RGBColor(120, 120, 120);

/// Errors that can occur during chart generation.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("failed to draw chart elements: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, ChartError>;

fn chart_path(dir: &Path, stem: &str, slug: &str) -> PathBuf {
    dir.join(format!("{stem}_{slug}.png"))
}

/// Histogram of title lengths (in characters) with a mean marker.
pub fn render_length_histogram(
    lengths: &[usize],
    dir: &Path,
    slug: &str,
) -> Result<Option<PathBuf>> {
    if lengths.is_empty() {
        warn!("No titles to measure; skipping length histogram");
        return Ok(None);
    }

    let values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
    let mut lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if lo >= hi {
        // All titles the same length still deserve a visible bar.
        lo -= 0.5;
        hi += 0.5;
    }
    let bins = histogram_bins(&values, lo, hi, HISTOGRAM_BINS);
    let bin_width = (hi - lo) / HISTOGRAM_BINS as f64;
    let y_max = headroom(bins.iter().copied().max().unwrap_or(0));
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let path = chart_path(dir, "longitud_titulos", slug);
    let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribución de longitud de títulos", ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Cantidad de caracteres")
        .y_desc("Cantidad de títulos")
        .axis_desc_style(("sans-serif", 22))
        .label_style(("sans-serif", 18))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(bins.iter().enumerate().map(|(i, &count)| {
            let x0 = lo + i as f64 * bin_width;
            let x1 = x0 + bin_width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], BAR_BLUE.filled())
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            vec![(mean, 0.0), (mean, y_max)],
            MEAN_RED.stroke_width(2),
        ))
        .map_err(|e| ChartError::Drawing(e.to_string()))?
        .label(format!("Media: {mean:.1} caracteres"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    info!(path = %path.display(), "Wrote length histogram");
    Ok(Some(path.clone()))
}

/// Horizontal bar chart of the most frequent title words.
pub fn render_top_words(words: &[TermCount], dir: &Path, slug: &str) -> Result<Option<PathBuf>> {
    if words.is_empty() {
        warn!("No words survived filtering; skipping word frequency chart");
        return Ok(None);
    }
    let caption = format!("Top {} palabras más comunes en títulos", words.len());
    let path = chart_path(dir, "top_palabras", slug);
    horizontal_bars(&path, &caption, "Frecuencia", BAR_CORAL, words)?;
    info!(path = %path.display(), "Wrote word frequency chart");
    Ok(Some(path))
}

/// Bar chart of headline counts per hour of day.
pub fn render_hour_distribution(
    hours: &[usize; 24],
    dir: &Path,
    slug: &str,
) -> Result<Option<PathBuf>> {
    let total: usize = hours.iter().sum();
    if total == 0 {
        warn!("No timestamps recorded; skipping hour distribution");
        return Ok(None);
    }
    let y_max = headroom(hours.iter().copied().max().unwrap_or(0));

    let path = chart_path(dir, "distribucion_horas", slug);
    let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribución de noticias por hora", ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..23.5, 0.0..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Hora del día")
        .y_desc("Cantidad de noticias")
        .axis_desc_style(("sans-serif", 22))
        .label_style(("sans-serif", 18))
        .x_labels(24)
        .x_label_formatter(&|v| {
            let hour = v.round();
            if (v - hour).abs() < 0.01 && (0.0..24.0).contains(&hour) {
                format!("{hour:02.0}")
            } else {
                String::new()
            }
        })
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(hours.iter().enumerate().map(|(hour, &count)| {
            let x = hour as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, count as f64)], BAR_GREEN.filled())
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    info!(path = %path.display(), "Wrote hour distribution");
    Ok(Some(path.clone()))
}

/// Histogram of polarity scores over the fixed [-1, 1] range, with reference
/// lines at -1, 0, and +1.
pub fn render_sentiment_histogram(
    scores: &[f64],
    dir: &Path,
    slug: &str,
) -> Result<Option<PathBuf>> {
    if scores.is_empty() {
        warn!("No polarity scores; skipping sentiment histogram");
        return Ok(None);
    }

    let bins = histogram_bins(scores, -1.0, 1.0, HISTOGRAM_BINS);
    let bin_width = 2.0 / HISTOGRAM_BINS as f64;
    let y_max = headroom(bins.iter().copied().max().unwrap_or(0));

    let path = chart_path(dir, "sentimiento", slug);
    let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribución de sentimiento en títulos", ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(60)
        .build_cartesian_2d(-1.05f64..1.05, 0.0..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Polaridad (-1 = Negativo, 1 = Positivo)")
        .y_desc("Cantidad de títulos")
        .axis_desc_style(("sans-serif", 22))
        .label_style(("sans-serif", 18))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(bins.iter().enumerate().map(|(i, &count)| {
            let x0 = -1.0 + i as f64 * bin_width;
            let x1 = x0 + bin_width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], BAR_PURPLE.filled())
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    for x in [-1.0f64, 0.0, 1.0] {
        chart
            .draw_series(LineSeries::new(
                vec![(x, 0.0), (x, y_max)],
                REFERENCE_GREY.stroke_width(1),
            ))
            .map_err(|e| ChartError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    info!(path = %path.display(), "Wrote sentiment histogram");
    Ok(Some(path.clone()))
}

/// Horizontal bar chart of the most mentioned people. Skipped when no people
/// were found.
pub fn render_people(entries: &[TermCount], dir: &Path, slug: &str) -> Result<Option<PathBuf>> {
    if entries.is_empty() {
        warn!("No people detected; skipping people chart");
        return Ok(None);
    }
    let path = chart_path(dir, "personas", slug);
    horizontal_bars(&path, "Personas más mencionadas", "Menciones", BAR_BLUE, entries)?;
    info!(path = %path.display(), "Wrote people chart");
    Ok(Some(path))
}

/// Horizontal bar chart of the most mentioned places. Skipped when no places
/// were found.
pub fn render_places(entries: &[TermCount], dir: &Path, slug: &str) -> Result<Option<PathBuf>> {
    if entries.is_empty() {
        warn!("No places detected; skipping places chart");
        return Ok(None);
    }
    let path = chart_path(dir, "lugares", slug);
    horizontal_bars(&path, "Lugares más mencionados", "Menciones", BAR_ORANGE, entries)?;
    info!(path = %path.display(), "Wrote places chart");
    Ok(Some(path))
}

/// Shared renderer for ranked horizontal bar charts.
///
/// The first entry (highest count) is drawn at the top. Counts are labeled
/// at the bar ends, mirroring the axis a reader scans first.
fn horizontal_bars(
    path: &Path,
    caption: &str,
    x_desc: &str,
    color: RGBColor,
    entries: &[TermCount],
) -> Result<()> {
    let n = entries.len();
    let x_max = headroom(entries.iter().map(|e| e.count).max().unwrap_or(0));

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(180)
        .build_cartesian_2d(0.0..x_max, -0.5f64..(n as f64 - 0.5))
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .axis_desc_style(("sans-serif", 22))
        .label_style(("sans-serif", 18))
        .y_labels(n)
        .y_label_formatter(&|v| {
            let idx = v.round();
            if (v - idx).abs() < 0.01 && idx >= 0.0 && (idx as usize) < n {
                // Row 0 is the bottom of the chart; rank 0 goes on top.
                entries[n - 1 - idx as usize].term.clone()
            } else {
                String::new()
            }
        })
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(entries.iter().enumerate().map(|(rank, entry)| {
            let y = (n - 1 - rank) as f64;
            Rectangle::new(
                [(0.0, y - 0.38), (entry.count as f64, y + 0.38)],
                color.filled(),
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    let label_offset = x_max * 0.01;
    chart
        .draw_series(entries.iter().enumerate().map(|(rank, entry)| {
            let y = (n - 1 - rank) as f64;
            Text::new(
                entry.count.to_string(),
                (entry.count as f64 + label_offset, y + 0.15),
                ("sans-serif", 18).into_font(),
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

/// Count headlines per hour of day.
pub fn hour_counts(headlines: &[Headline]) -> [usize; 24] {
    let mut counts = [0usize; 24];
    for headline in headlines {
        counts[headline.hour() as usize] += 1;
    }
    counts
}

/// Bin `values` into `bins` equal-width buckets over [lo, hi].
///
/// Values outside the range are clamped into the edge buckets; the top edge
/// itself lands in the last bucket.
pub(crate) fn histogram_bins(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let width = (hi - lo) / bins as f64;
    for &value in values {
        let idx = ((value - lo) / width).floor() as i64;
        let idx = idx.clamp(0, bins as i64 - 1) as usize;
        counts[idx] += 1;
    }
    counts
}

/// Y-axis (or X-axis) upper bound with a little headroom above the tallest bar.
fn headroom(max_count: usize) -> f64 {
    (max_count as f64 * 1.15).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    #[test]
    fn test_histogram_bins_distributes_values() {
        let values = [0.0, 0.1, 0.9, 1.0];
        let bins = histogram_bins(&values, 0.0, 1.0, 10);
        assert_eq!(bins[0], 1);
        assert_eq!(bins[1], 1);
        assert_eq!(bins[9], 2, "the top edge belongs to the last bucket");
        assert_eq!(bins.iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_histogram_bins_clamps_outliers() {
        let bins = histogram_bins(&[-5.0, 5.0], -1.0, 1.0, 20);
        assert_eq!(bins[0], 1);
        assert_eq!(bins[19], 1);
    }

    #[test]
    fn test_hour_counts() {
        let mk = |h: u32| {
            Headline::new(
                "t",
                None,
                NaiveDate::from_ymd_opt(2025, 3, 1)
                    .unwrap()
                    .and_hms_opt(h, 30, 0)
                    .unwrap(),
            )
        };
        let counts = hour_counts(&[mk(8), mk(8), mk(23)]);
        assert_eq!(counts[8], 2);
        assert_eq!(counts[23], 1);
        assert_eq!(counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_chart_path_carries_slug() {
        let path = chart_path(Path::new("graficos"), "sentimiento", "20250301_100000");
        assert_eq!(
            path,
            Path::new("graficos").join("sentimiento_20250301_100000.png")
        );
    }

    #[test]
    fn test_empty_inputs_skip_without_touching_disk() {
        let dir = Path::new("/definitely/not/writable");
        assert!(matches!(render_length_histogram(&[], dir, "x"), Ok(None)));
        assert!(matches!(render_top_words(&[], dir, "x"), Ok(None)));
        assert!(matches!(render_sentiment_histogram(&[], dir, "x"), Ok(None)));
        assert!(matches!(render_people(&[], dir, "x"), Ok(None)));
        assert!(matches!(render_places(&[], dir, "x"), Ok(None)));
        assert!(matches!(
            render_hour_distribution(&[0usize; 24], dir, "x"),
            Ok(None)
        ));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_full_chart_set() {
        let dir = std::env::temp_dir().join("titulares-chart-tests");
        fs::create_dir_all(&dir).unwrap();
        let slug = "20250301_100000";

        let lengths = vec![30, 42, 55, 61, 48, 70, 38];
        assert!(render_length_histogram(&lengths, &dir, slug).unwrap().is_some());

        let words = vec![
            TermCount::new("crisis", 9),
            TermCount::new("gobierno", 6),
            TermCount::new("economía", 4),
        ];
        assert!(render_top_words(&words, &dir, slug).unwrap().is_some());

        let mut hours = [0usize; 24];
        hours[8] = 5;
        hours[13] = 2;
        assert!(render_hour_distribution(&hours, &dir, slug).unwrap().is_some());

        let scores = vec![-0.8, -0.3, 0.0, 0.0, 0.2, 0.6];
        assert!(render_sentiment_histogram(&scores, &dir, slug).unwrap().is_some());

        let people = vec![TermCount::new("Donald Trump", 4), TermCount::new("Milei", 2)];
        assert!(render_people(&people, &dir, slug).unwrap().is_some());

        let places = vec![TermCount::new("México", 3)];
        assert!(render_places(&places, &dir, slug).unwrap().is_some());

        assert!(dir.join(format!("longitud_titulos_{slug}.png")).exists());
        assert!(dir.join(format!("sentimiento_{slug}.png")).exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
