//! # Titulares
//!
//! A headline scraping and analysis pipeline for Infobae América. Collects
//! front-page titles (and optional RSS feeds) into a CSV table, then analyzes
//! the accumulated headlines: word frequencies, a word cloud, a Spanish
//! sentiment score per title, heuristic person/place extraction, timestamped
//! PNG charts, and a PDF report bundling it all.
//!
//! ## Usage
//!
//! ```sh
//! titulares scrape            # collect headlines into infobae_noticias.csv
//! titulares analyze           # render charts + resumen JSON into graficos/
//! titulares report            # bundle the charts into reporte_analisis.pdf
//! titulares run               # all three in one invocation
//! ```
//!
//! ## Architecture
//!
//! The pipeline has three stages, each usable on its own:
//! 1. **Scrape**: fetch the front page and feeds, dedupe, persist CSV rows
//! 2. **Analyze**: compute the stats over the table and render the images
//! 3. **Report**: assemble the PDF from the rendered charts

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod analysis;
mod cli;
mod config;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod store;
mod utils;

use analysis::{entities, sentiment, text};
use cli::{Cli, Command};
use config::AppConfig;
use models::{AnalysisSummary, Headline, TIMESTAMP_FORMAT};
use outputs::{charts, report, summary, wordcloud};
use utils::{ensure_writable_dir, timestamp_slug};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("titulares starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let config = config::load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Scrape { csv, append, quiet } => {
            scrape(&config, &csv, append, quiet).await?;
        }
        Command::Analyze {
            csv,
            charts_dir,
            top,
        } => {
            analyze(&config, &csv, &charts_dir, top).await?;
        }
        Command::Report { charts_dir, output } => {
            assemble_report(&config, &charts_dir, &output).await?;
        }
        Command::Run {
            csv,
            charts_dir,
            output,
            append,
            top,
        } => {
            scrape(&config, &csv, append, false).await?;
            let run = analyze(&config, &csv, &charts_dir, top).await?;
            // The run's own charts, not whatever older runs left in the dir.
            let chart_paths: Vec<PathBuf> = run.charts.iter().map(PathBuf::from).collect();
            report::build_report(
                &chart_paths,
                &config.report.title,
                &run.generated_at,
                Some(run.headline_count),
                &output,
            )?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Scrape the front page (plus any configured feeds) and persist the table.
///
/// An empty overall result is an error: there is nothing to save, and
/// overwriting a good CSV with nothing would destroy data.
#[instrument(level = "info", skip_all, fields(csv = %csv.display(), append))]
async fn scrape(
    config: &AppConfig,
    csv: &Path,
    append: bool,
    quiet: bool,
) -> Result<Vec<Headline>, Box<dyn Error>> {
    let fetcher = fetch::retrying_fetcher(&config.source)?;
    let extracted_at = Local::now().naive_local();

    // ---- Collect from all sources ----
    let mut headlines =
        scrapers::infobae::scrape_front_page(&fetcher, &config.source, extracted_at).await?;
    if !config.source.rss_feeds.is_empty() {
        let from_feeds =
            scrapers::rss::fetch_feeds(&fetcher, &config.source.rss_feeds, extracted_at).await;
        headlines.extend(from_feeds);
    }
    let headlines = store::dedupe_by_title(headlines);

    if headlines.is_empty() {
        error!("Scrape produced no headlines; nothing to save");
        return Err("no headlines scraped".into());
    }

    if !quiet {
        print_headlines(&headlines);
    }

    let stored = if append {
        store::append_headlines(csv, headlines)?
    } else {
        store::save_headlines(csv, &headlines)?;
        headlines
    };
    info!(count = stored.len(), path = %csv.display(), "Scrape complete");

    Ok(stored)
}

/// Numbered headline listing, the scraper's user-facing output.
fn print_headlines(headlines: &[Headline]) {
    println!("\nTitulares de Infobae América:\n");
    for (i, headline) in headlines.iter().enumerate() {
        println!("{}. {}", i + 1, headline.title);
        if let Some(subtitle) = &headline.subtitle {
            println!("   {subtitle}");
        }
    }
    println!("\nTotal: {} titulares", headlines.len());
}

/// Analyze the stored table: charts, word cloud, and the JSON summary.
///
/// All images of one run share a single timestamp slug. Returns the run
/// summary so `run` can hand exactly this run's charts to the report.
#[instrument(level = "info", skip_all, fields(csv = %csv.display(), charts_dir = %charts_dir.display()))]
async fn analyze(
    config: &AppConfig,
    csv: &Path,
    charts_dir: &Path,
    top: Option<usize>,
) -> Result<AnalysisSummary, Box<dyn Error>> {
    let headlines = store::load_headlines(csv)?;
    info!(count = headlines.len(), "Loaded headline table");
    if headlines.is_empty() {
        warn!("The table is empty; charts will be skipped and the summary will carry zeros");
    }

    // Early check: charts dir must exist and be writable before rendering.
    if let Err(e) = ensure_writable_dir(charts_dir).await {
        error!(
            path = %charts_dir.display(),
            error = %e,
            "Charts directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let now = Local::now().naive_local();
    let slug = timestamp_slug(now);
    let generated_at = now.format(TIMESTAMP_FORMAT).to_string();
    let top_n = top.unwrap_or(config.analysis.top_words);

    let titles: Vec<&str> = headlines.iter().map(|h| h.title.as_str()).collect();

    // ---- Text, sentiment, entities ----
    let word_counts = text::count_words(titles.iter().copied(), &config.analysis);
    let top_words = text::top_terms(&word_counts, top_n);
    let cloud_words = text::top_terms(&word_counts, config.analysis.max_cloud_words);

    let scores = sentiment::score_all(titles.iter().copied());
    let mean_polarity = sentiment::mean_polarity(&scores);
    let (positive, negative, neutral) = sentiment::class_counts(&scores);

    let entity_counts = entities::count_entities(titles.iter().copied());
    let top_people = text::top_terms(&entity_counts.people, config.analysis.top_entities);
    let top_places = text::top_terms(&entity_counts.places, config.analysis.top_entities);

    let lengths: Vec<usize> = headlines.iter().map(Headline::title_len).collect();
    let hours = charts::hour_counts(&headlines);

    // ---- Render, keeping this run's files in generation order ----
    let rendered = [
        wordcloud::render_wordcloud(
            &cloud_words,
            charts_dir,
            &slug,
            config.analysis.max_cloud_words,
        )?,
        charts::render_length_histogram(&lengths, charts_dir, &slug)?,
        charts::render_top_words(&top_words, charts_dir, &slug)?,
        charts::render_hour_distribution(&hours, charts_dir, &slug)?,
        charts::render_sentiment_histogram(&scores, charts_dir, &slug)?,
        charts::render_people(&top_people, charts_dir, &slug)?,
        charts::render_places(&top_places, charts_dir, &slug)?,
    ];
    let chart_files: Vec<PathBuf> = rendered.into_iter().flatten().collect();

    let run_summary = AnalysisSummary {
        generated_at,
        headline_count: headlines.len(),
        mean_polarity,
        positive,
        negative,
        neutral,
        top_words,
        top_people,
        top_places,
        charts: chart_files
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    };
    summary::write_summary(&run_summary, charts_dir, &slug).await?;

    info!(
        headlines = run_summary.headline_count,
        charts = chart_files.len(),
        mean_polarity = format!("{mean_polarity:.3}"),
        "Analysis complete"
    );

    Ok(run_summary)
}

/// Build the PDF from every chart currently in the charts directory.
///
/// The headline count on the cover comes from the newest run summary, when
/// one is present.
#[instrument(level = "info", skip_all, fields(charts_dir = %charts_dir.display(), output = %output.display()))]
async fn assemble_report(
    config: &AppConfig,
    charts_dir: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let images = report::collect_chart_images(charts_dir)?;
    let headline_count = summary::read_latest_summary(charts_dir)
        .await
        .map(|s| s.headline_count);
    let generated_at = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();

    report::build_report(
        &images,
        &config.report.title,
        &generated_at,
        headline_count,
        output,
    )?;

    Ok(())
}
