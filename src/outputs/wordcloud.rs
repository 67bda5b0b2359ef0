//! Word cloud rendering.
//!
//! Words are placed on an Archimedean spiral stretched to the 2:1 canvas,
//! largest first, nudged outward until they stop colliding with anything
//! already placed. Layout is plain rectangle arithmetic so it can be tested
//! without a font backend; only [`render_wordcloud`] touches the bitmap.

use crate::models::TermCount;
use crate::outputs::charts::ChartError;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CANVAS_WIDTH: u32 = 1200;
const CANVAS_HEIGHT: u32 = 600;
const MIN_FONT_SIZE: u32 = 14;
const MAX_FONT_SIZE: u32 = 110;

/// Padding in pixels kept around every placed word.
const WORD_PADDING: i32 = 3;

/// Radial growth per radian of spiral, in pixels.
const SPIRAL_SPACING: f64 = 2.0;
const SPIRAL_STEP: f64 = 0.35;
const SPIRAL_MAX_STEPS: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Rect {
    fn centered_at(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self {
            x: cx - w / 2,
            y: cy - h / 2,
            w,
            h,
        }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    fn within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + self.w <= width && self.y + self.h <= height
    }
}

/// A word with its final pixel position and style.
#[derive(Debug, Clone)]
pub(crate) struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Top-left corner in canvas pixels.
    pub x: i32,
    pub y: i32,
    /// Normalized frequency, also used to pick the color.
    pub weight: f64,
}

/// Font size for a word, scaled by the square root of its normalized
/// frequency so mid-tier words stay legible.
pub(crate) fn font_size_for(count: usize, max_count: usize) -> u32 {
    if max_count == 0 {
        return MIN_FONT_SIZE;
    }
    let weight = (count as f64 / max_count as f64).sqrt();
    let span = (MAX_FONT_SIZE - MIN_FONT_SIZE) as f64;
    MIN_FONT_SIZE + (span * weight).round() as u32
}

/// Point on the elliptical spiral after `step` increments, relative to the
/// canvas center. The x radius grows twice as fast as the y radius to match
/// the 2:1 canvas.
pub(crate) fn spiral_point(step: usize) -> (f64, f64) {
    let t = step as f64 * SPIRAL_STEP;
    let r = SPIRAL_SPACING * t;
    (2.0 * r * t.cos(), r * t.sin())
}

/// Lay out up to `max_words` entries on the canvas.
///
/// `measure` maps (text, font size) to a pixel bounding box; the renderer
/// passes the backend's font metrics, tests pass a deterministic stand-in.
/// Words that never find a free slot are dropped.
pub(crate) fn layout_words<F>(
    words: &[TermCount],
    max_words: usize,
    measure: F,
) -> Vec<PlacedWord>
where
    F: Fn(&str, u32) -> (u32, u32),
{
    let max_count = words.first().map(|w| w.count).unwrap_or(0);
    let center_x = (CANVAS_WIDTH / 2) as i32;
    let center_y = (CANVAS_HEIGHT / 2) as i32;

    let mut taken: Vec<Rect> = Vec::new();
    let mut placed = Vec::new();

    for entry in words.iter().take(max_words) {
        let font_size = font_size_for(entry.count, max_count);
        let (w, h) = measure(&entry.term, font_size);
        let (w, h) = (w as i32 + WORD_PADDING * 2, h as i32 + WORD_PADDING * 2);

        let mut slot = None;
        for step in 0..SPIRAL_MAX_STEPS {
            let (dx, dy) = spiral_point(step);
            let rect = Rect::centered_at(center_x + dx as i32, center_y + dy as i32, w, h);
            if rect.within(CANVAS_WIDTH as i32, CANVAS_HEIGHT as i32)
                && !taken.iter().any(|t| rect.overlaps(t))
            {
                slot = Some(rect);
                break;
            }
        }

        match slot {
            Some(rect) => {
                taken.push(rect);
                placed.push(PlacedWord {
                    text: entry.term.clone(),
                    font_size,
                    x: rect.x + WORD_PADDING,
                    y: rect.y + WORD_PADDING,
                    weight: if max_count == 0 {
                        0.0
                    } else {
                        entry.count as f64 / max_count as f64
                    },
                });
            }
            None => {
                debug!(word = %entry.term, "No room left on the canvas; dropping word");
            }
        }
    }

    placed
}

/// Render the word cloud PNG for this run.
///
/// `words` must already be sorted by descending count. Returns `Ok(None)`
/// when there is nothing to draw.
pub fn render_wordcloud(
    words: &[TermCount],
    dir: &Path,
    slug: &str,
    max_words: usize,
) -> Result<Option<PathBuf>, ChartError> {
    if words.is_empty() {
        warn!("No words survived filtering; skipping word cloud");
        return Ok(None);
    }

    let path = dir.join(format!("wordcloud_{slug}.png"));
    let root = BitMapBackend::new(&path, (CANVAS_WIDTH, CANVAS_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let placed = layout_words(words, max_words, |text, size| {
        let style: TextStyle = ("sans-serif", size).into_font().into();
        root.estimate_text_size(text, &style).unwrap_or((
            text.chars().count() as u32 * size / 2,
            size,
        ))
    });

    for word in &placed {
        // Darker end of viridis for the most frequent words.
        let color = ViridisRGB.get_color(1.0 - word.weight);
        let style = ("sans-serif", word.font_size).into_font().color(&color);
        root.draw(&Text::new(word.text.clone(), (word.x, word.y), style))
            .map_err(|e| ChartError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    info!(path = %path.display(), words = placed.len(), "Wrote word cloud");
    Ok(Some(path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic stand-in for font metrics.
    fn fake_measure(text: &str, size: u32) -> (u32, u32) {
        (text.chars().count() as u32 * size / 2, size)
    }

    fn sample_words(n: usize) -> Vec<TermCount> {
        (0..n)
            .map(|i| TermCount::new(format!("palabra{i}"), 100 - i))
            .collect()
    }

    #[test]
    fn test_font_size_scales_with_frequency() {
        assert_eq!(font_size_for(100, 100), MAX_FONT_SIZE);
        let mid = font_size_for(25, 100);
        let low = font_size_for(1, 100);
        assert!(mid > low, "more frequent words get bigger fonts");
        assert!(low >= MIN_FONT_SIZE);
        // sqrt scaling: a quarter of the max frequency gets half the span.
        assert_eq!(mid, MIN_FONT_SIZE + (MAX_FONT_SIZE - MIN_FONT_SIZE) / 2);
    }

    #[test]
    fn test_font_size_handles_empty_input() {
        assert_eq!(font_size_for(0, 0), MIN_FONT_SIZE);
    }

    #[test]
    fn test_spiral_starts_at_center_and_grows() {
        assert_eq!(spiral_point(0), (0.0, 0.0));
        let (x1, y1) = spiral_point(100);
        let (x2, y2) = spiral_point(500);
        let r1 = (x1 * x1 + y1 * y1).sqrt();
        let r2 = (x2 * x2 + y2 * y2).sqrt();
        assert!(r2 > r1, "the spiral moves outward");
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect { x: 0, y: 0, w: 10, h: 10 };
        let b = Rect { x: 5, y: 5, w: 10, h: 10 };
        let c = Rect { x: 10, y: 0, w: 10, h: 10 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c), "sharing an edge is not an overlap");
    }

    #[test]
    fn test_layout_places_words_without_collisions() {
        let words = sample_words(30);
        let placed = layout_words(&words, 30, fake_measure);
        assert!(!placed.is_empty());

        let rects: Vec<Rect> = placed
            .iter()
            .map(|p| {
                let (w, h) = fake_measure(&p.text, p.font_size);
                Rect { x: p.x, y: p.y, w: w as i32, h: h as i32 }
            })
            .collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.within(CANVAS_WIDTH as i32, CANVAS_HEIGHT as i32));
            for b in rects.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{:?} collides with {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_layout_caps_word_count() {
        let words = sample_words(50);
        let placed = layout_words(&words, 10, fake_measure);
        assert!(placed.len() <= 10);
    }

    #[test]
    fn test_layout_puts_biggest_word_near_center() {
        let words = sample_words(5);
        let placed = layout_words(&words, 5, fake_measure);
        let first = &placed[0];
        let (w, h) = fake_measure(&first.text, first.font_size);
        let cx = first.x + w as i32 / 2;
        let cy = first.y + h as i32 / 2;
        assert!((cx - (CANVAS_WIDTH / 2) as i32).abs() < 40);
        assert!((cy - (CANVAS_HEIGHT / 2) as i32).abs() < 40);
    }

    #[test]
    fn test_layout_drops_words_wider_than_canvas() {
        let words = vec![
            TermCount::new("corto", 10),
            TermCount::new("x".repeat(500), 9),
        ];
        let placed = layout_words(&words, 10, fake_measure);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "corto");
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_wordcloud_writes_png() {
        let dir = std::env::temp_dir().join("titulares-wordcloud-test");
        std::fs::create_dir_all(&dir).unwrap();
        let words = sample_words(40);
        let path = render_wordcloud(&words, &dir, "20250301_100000", 200)
            .unwrap()
            .unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
