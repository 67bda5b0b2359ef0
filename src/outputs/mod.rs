//! Output generation for charts, the word cloud, the JSON summary, and the
//! PDF report.
//!
//! # Submodules
//!
//! - [`charts`]: Statistical PNG charts (histograms, bar charts)
//! - [`wordcloud`]: The word cloud PNG
//! - [`summary`]: Machine-readable JSON summary of a run
//! - [`report`]: PDF report bundling the charts
//!
//! # Output Structure
//!
//! ```text
//! graficos/
//! ├── wordcloud_20250301_100000.png
//! ├── longitud_titulos_20250301_100000.png
//! ├── top_palabras_20250301_100000.png
//! ├── distribucion_horas_20250301_100000.png
//! ├── sentimiento_20250301_100000.png
//! ├── personas_20250301_100000.png
//! ├── lugares_20250301_100000.png
//! └── resumen_20250301_100000.json
//!
//! reporte_analisis.pdf
//! ```
//!
//! All images from one run share the run's timestamp slug.

pub mod charts;
pub mod report;
pub mod summary;
pub mod wordcloud;
