//! PDF report assembly.
//!
//! The report is an A4 document: a cover page with the run metadata, then
//! one page per chart image. Charts can come straight from an analysis run
//! or be picked up from the charts directory, sorted by filename so the
//! newest run's images group together.

use once_cell::sync::Lazy;
use printpdf::image_crate::GenericImageView;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};
use regex::Regex;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;

/// Width charts are scaled to on the page.
const IMAGE_WIDTH_MM: f64 = 180.0;
/// Tall images are shrunk further so they never collide with the footer area.
const MAX_IMAGE_HEIGHT_MM: f64 = 240.0;
/// Top edge of the embedded image, leaving room for the page heading.
const IMAGE_TOP_MM: f64 = 268.0;

static SLUG_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\d{8}_\d{6}$").unwrap());

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to load chart image {path}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// All PNG files in the charts directory, sorted by filename.
///
/// Timestamped names sort chronologically, so one run's charts stay adjacent
/// in the report.
pub fn collect_chart_images(dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png {
            images.push(path);
        }
    }
    images.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(images)
}

/// Build the PDF at `output` from the given chart images.
///
/// The cover carries the report title, the generation timestamp, and the
/// headline count when the caller knows it. With an empty chart list the
/// report is still written, cover page only, with a warning. Chart paths
/// that no longer exist are skipped; a file that exists but cannot be
/// decoded aborts the build rather than shipping a silently incomplete
/// report.
#[instrument(level = "info", skip_all, fields(output = %output.display(), charts = charts.len()))]
pub fn build_report(
    charts: &[PathBuf],
    title: &str,
    generated_at: &str,
    headline_count: Option<usize>,
    output: &Path,
) -> Result<PathBuf, ReportError> {
    if charts.is_empty() {
        warn!("No chart images found; the report will only have a cover page");
    }

    let (doc, cover_page, cover_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Capa 1");
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let layer = doc.get_page(cover_page).get_layer(cover_layer);
    layer.use_text(title, 26.0, centered_x(title, 26.0), Mm(250.0), &bold);
    layer.use_text(
        format!("Generado: {generated_at}"),
        12.0,
        Mm(20.0),
        Mm(235.0),
        &regular,
    );
    if let Some(count) = headline_count {
        layer.use_text(
            format!("Total de noticias analizadas: {count}"),
            12.0,
            Mm(20.0),
            Mm(227.0),
            &regular,
        );
    }
    layer.use_text(
        format!("Gráficos incluidos: {}", charts.len()),
        12.0,
        Mm(20.0),
        Mm(219.0),
        &regular,
    );

    for chart in charts {
        if !chart.exists() {
            warn!(path = %chart.display(), "Chart file disappeared; skipping page");
            continue;
        }
        let img = printpdf::image_crate::open(chart).map_err(|e| ReportError::Image {
            path: chart.clone(),
            message: e.to_string(),
        })?;
        let (w_px, h_px) = img.dimensions();
        let (dpi, height_mm) = fit_image(w_px, h_px);

        let (page, layer_idx) =
            doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Capa 1");
        let layer = doc.get_page(page).get_layer(layer_idx);

        let stem = chart
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        layer.use_text(display_name(&stem), 14.0, Mm(MARGIN_MM as f32), Mm(280.0), &bold);
        layer.use_text(stem.as_str(), 9.0, Mm(MARGIN_MM as f32), Mm(273.0), &regular);

        Image::from_dynamic_image(&img).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM as f32)),
                translate_y: Some(Mm((IMAGE_TOP_MM - height_mm) as f32)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
    }

    let file = File::create(output)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    info!(path = %output.display(), pages = charts.len() + 1, "Wrote PDF report");
    Ok(output.to_path_buf())
}

/// Rough centering for cover text set in Helvetica.
///
/// printpdf exposes no glyph metrics for builtin fonts; half an em per
/// character is close enough for a title line.
fn centered_x(text: &str, font_size_pt: f64) -> Mm {
    const MM_PER_PT: f64 = 0.3528;
    let approx_width = text.chars().count() as f64 * font_size_pt * 0.5 * MM_PER_PT;
    Mm(((PAGE_WIDTH_MM - approx_width) / 2.0).max(MARGIN_MM) as f32)
}

/// Heading shown above a chart, derived from its file stem.
fn display_name(stem: &str) -> String {
    let base = SLUG_SUFFIX_RE.replace(stem, "");
    match base.as_ref() {
        "wordcloud" => "Nube de palabras".to_string(),
        "longitud_titulos" => "Distribución de longitud de títulos".to_string(),
        "top_palabras" => "Palabras más frecuentes".to_string(),
        "distribucion_horas" => "Distribución por hora".to_string(),
        "sentimiento" => "Distribución de sentimiento".to_string(),
        "personas" => "Personas más mencionadas".to_string(),
        "lugares" => "Lugares más mencionados".to_string(),
        other => other.to_string(),
    }
}

/// DPI and resulting height for embedding an image at [`IMAGE_WIDTH_MM`],
/// shrinking it further if it would exceed [`MAX_IMAGE_HEIGHT_MM`].
fn fit_image(w_px: u32, h_px: u32) -> (f64, f64) {
    const MM_PER_INCH: f64 = 25.4;
    let mut width_mm = IMAGE_WIDTH_MM;
    let mut height_mm = h_px as f64 * width_mm / w_px as f64;
    if height_mm > MAX_IMAGE_HEIGHT_MM {
        width_mm *= MAX_IMAGE_HEIGHT_MM / height_mm;
        height_mm = MAX_IMAGE_HEIGHT_MM;
    }
    (w_px as f64 * MM_PER_INCH / width_mm, height_mm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use printpdf::image_crate::{ImageBuffer, Rgb};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("titulares-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_display_name_strips_slug_and_translates() {
        assert_eq!(
            display_name("sentimiento_20250301_100000"),
            "Distribución de sentimiento"
        );
        assert_eq!(display_name("wordcloud_20250301_100000"), "Nube de palabras");
        assert_eq!(display_name("algo_inesperado"), "algo_inesperado");
    }

    #[test]
    fn test_fit_image_keeps_aspect_ratio() {
        let (dpi, height_mm) = fit_image(1200, 600);
        assert!((height_mm - 90.0).abs() < 0.01);
        assert!((dpi - 1200.0 * 25.4 / 180.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_image_caps_tall_images() {
        let (_, height_mm) = fit_image(600, 1200);
        assert!((height_mm - MAX_IMAGE_HEIGHT_MM).abs() < 0.01);
    }

    #[test]
    fn test_collect_chart_images_filters_and_sorts() {
        let dir = scratch_dir("collect");
        fs::write(dir.join("b_chart.png"), b"x").unwrap();
        fs::write(dir.join("a_chart.png"), b"x").unwrap();
        fs::write(dir.join("notas.txt"), b"x").unwrap();

        let images = collect_chart_images(&dir).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_chart.png", "b_chart.png"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_centered_x_stays_inside_margins() {
        let x = centered_x("Reporte de Análisis: Infobae América", 26.0);
        assert!(f64::from(x.0) >= MARGIN_MM);
        assert!(f64::from(x.0) < PAGE_WIDTH_MM / 2.0);

        let absurd = centered_x(&"x".repeat(400), 26.0);
        assert!((f64::from(absurd.0) - MARGIN_MM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_build_report_cover_only() {
        let dir = scratch_dir("report-cover");
        let output = dir.join("reporte.pdf");
        let path = build_report(
            &[],
            "Reporte de prueba",
            "2025-03-01 10:00:00",
            Some(42),
            &output,
        )
        .unwrap();
        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() > 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_report_embeds_images() {
        let dir = scratch_dir("report-images");
        let chart = dir.join("sentimiento_20250301_100000.png");
        ImageBuffer::from_pixel(8, 4, Rgb([200u8, 30, 30]))
            .save(&chart)
            .unwrap();

        let output = dir.join("reporte.pdf");
        build_report(
            &[chart],
            "Reporte de prueba",
            "2025-03-01 10:00:00",
            Some(3),
            &output,
        )
        .unwrap();

        let cover_only = dir.join("solo_portada.pdf");
        build_report(
            &[],
            "Reporte de prueba",
            "2025-03-01 10:00:00",
            Some(3),
            &cover_only,
        )
        .unwrap();
        assert!(
            fs::metadata(&output).unwrap().len() > fs::metadata(&cover_only).unwrap().len(),
            "the embedded image should grow the document"
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_report_skips_missing_charts() {
        let dir = scratch_dir("report-missing");
        let gone = dir.join("ya_no_existe.png");

        let output = dir.join("reporte.pdf");
        let path = build_report(&[gone], "Reporte", "2025-03-01 10:00:00", None, &output).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_report_rejects_unreadable_chart() {
        let dir = scratch_dir("report-bad");
        let fake = dir.join("roto.png");
        fs::write(&fake, b"this is not a png").unwrap();

        let output = dir.join("reporte.pdf");
        let result = build_report(&[fake], "Reporte", "2025-03-01 10:00:00", None, &output);
        assert!(matches!(result, Err(ReportError::Image { .. })));

        let _ = fs::remove_dir_all(&dir);
    }
}
