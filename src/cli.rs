//! Command-line interface definitions for titulares.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Each pipeline stage is its own subcommand so the scrape can run on a
//! schedule while analysis happens on demand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CSV: &str = "infobae_noticias.csv";
pub const DEFAULT_CHARTS_DIR: &str = "graficos";
pub const DEFAULT_REPORT: &str = "reporte_analisis.pdf";

/// Command-line arguments for the titulares application.
///
/// # Examples
///
/// ```sh
/// # Collect today's headlines into the default CSV
/// titulares scrape
///
/// # Keep accumulating into the same table across runs
/// titulares scrape --append
///
/// # Charts and summary from whatever the table holds
/// titulares analyze --top 20
///
/// # The whole pipeline with a custom config
/// titulares --config config.yaml run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "TITULARES_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the front page and store the headlines as CSV
    Scrape {
        /// CSV file the headlines are written to
        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,

        /// Merge into an existing CSV instead of overwriting it
        #[arg(long)]
        append: bool,

        /// Skip the headline listing on stdout
        #[arg(short, long)]
        quiet: bool,
    },

    /// Analyze the stored headlines: charts, word cloud, and summary JSON
    Analyze {
        /// CSV file to read headlines from
        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,

        /// Directory the charts are written to
        #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
        charts_dir: PathBuf,

        /// How many words the frequency chart shows (overrides the config file)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Assemble the PDF report from the charts on disk
    Report {
        /// Directory holding the chart images
        #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
        charts_dir: PathBuf,

        /// Path of the PDF report
        #[arg(short, long, default_value = DEFAULT_REPORT)]
        output: PathBuf,
    },

    /// Scrape, analyze, and build the report in one invocation
    Run {
        /// CSV file the headlines are written to and read back from
        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,

        /// Directory the charts are written to
        #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
        charts_dir: PathBuf,

        /// Path of the PDF report
        #[arg(short, long, default_value = DEFAULT_REPORT)]
        output: PathBuf,

        /// Merge into an existing CSV instead of overwriting it
        #[arg(long)]
        append: bool,

        /// How many words the frequency chart shows (overrides the config file)
        #[arg(long)]
        top: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_defaults() {
        let cli = Cli::parse_from(["titulares", "scrape"]);
        match cli.command {
            Command::Scrape { csv, append, quiet } => {
                assert_eq!(csv, PathBuf::from(DEFAULT_CSV));
                assert!(!append);
                assert!(!quiet);
            }
            other => panic!("expected scrape, got {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_scrape_flags() {
        let cli = Cli::parse_from(["titulares", "scrape", "--csv", "hoy.csv", "--append", "-q"]);
        match cli.command {
            Command::Scrape { csv, append, quiet } => {
                assert_eq!(csv, PathBuf::from("hoy.csv"));
                assert!(append);
                assert!(quiet);
            }
            other => panic!("expected scrape, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_top_override() {
        let cli = Cli::parse_from(["titulares", "analyze", "--top", "20"]);
        match cli.command {
            Command::Analyze { top, charts_dir, .. } => {
                assert_eq!(top, Some(20));
                assert_eq!(charts_dir, PathBuf::from(DEFAULT_CHARTS_DIR));
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_report_output_short_flag() {
        let cli = Cli::parse_from(["titulares", "report", "-o", "informe.pdf"]);
        match cli.command {
            Command::Report { output, .. } => {
                assert_eq!(output, PathBuf::from("informe.pdf"));
            }
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        // `global = true` lets --config sit on either side of the subcommand.
        let cli = Cli::parse_from(["titulares", "run", "--config", "ajustes.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("ajustes.yaml")));

        let cli = Cli::parse_from(["titulares", "--config", "ajustes.yaml", "run"]);
        assert_eq!(cli.config, Some(PathBuf::from("ajustes.yaml")));
    }
}
