//! Command-line interface.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;

use crate::app;
use crate::config::PipelineConfig;
use crate::data::normalise::NormalisationMode;
use crate::pipeline::{self, ProcessedFile};
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "rusty-mephisto")]
#[command(about = "Normalise Mephisto .mcc beam scans and export them per curve", version)]
pub struct Cli {
    /// Mephisto .mcc files to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile normalisation (overrides config)
    #[arg(short, long, value_enum)]
    normalise: Option<NormalisationMode>,

    /// Keep curves in file order instead of PDD, in-plane, cross-plane
    #[arg(long)]
    no_reorder: bool,

    /// Do not write CSV tables
    #[arg(long)]
    no_output: bool,

    /// Directory for CSV tables (single input only)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not open the plot window
    #[arg(long)]
    no_plot: bool,

    /// Save the effective configuration as JSON before processing
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Merge command-line overrides into `config`.
    pub fn apply_to(&self, mut config: PipelineConfig) -> Result<PipelineConfig> {
        if let Some(mode) = self.normalise {
            config.normalisation = mode;
        }
        if self.no_reorder {
            config.reorder = false;
        }
        if self.no_output {
            config.write_tables = false;
        }
        if self.no_plot {
            config.display = false;
        }
        if let Some(dir) = &self.output_dir {
            if self.inputs.len() > 1 {
                bail!("--output-dir can only be used with a single input file");
            }
            config.output_directory = Some(dir.clone());
        }
        if self.inputs.len() > 1 && config.output_directory.is_some() {
            warn!("ignoring configured output directory for multiple inputs");
            config.output_directory = None;
        }
        Ok(config)
    }
}

/// Load the config named on the command line, or the defaults when none is
/// given. A named config that cannot be read or parsed is an error.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let config = PipelineConfig::from_json(path)?;
            info!("Loaded config from: {}", path.display());
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = match load_config(cli.config.as_deref()).and_then(|base| cli.apply_to(base)) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(2);
        }
    };

    if let Some(path) = &cli.write_config {
        if let Err(e) = config.to_json(path) {
            error!("{e:#}");
            std::process::exit(1);
        }
        info!("Saved config to: {}", path.display());
    }

    let start = Instant::now();

    // Files are independent, so each gets its own pipeline run.
    let results: Vec<(PathBuf, Result<ProcessedFile>)> = cli
        .inputs
        .par_iter()
        .map(|path| {
            let result = pipeline::process_file(path, &config, config.write_tables);
            (path.clone(), result)
        })
        .collect();

    let mut processed = Vec::new();
    let mut failures = 0usize;
    for (path, result) in results {
        match result {
            Ok(file) => processed.push(file),
            Err(e) => {
                error!("{}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }

    let tables: usize = processed.iter().map(|f| f.written.len()).sum();
    let curves: usize = processed.iter().map(|f| f.curves.len()).sum();
    print_summary(
        "Mephisto Processing Complete",
        &[
            ("Files processed", processed.len().to_string()),
            ("Files failed", failures.to_string()),
            ("Curves", curves.to_string()),
            ("Normalisation", config.normalisation.to_string()),
            ("Reordered", config.reorder.to_string()),
            ("Tables written", tables.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    // Tables are already written; a missing window system does not fail the run.
    if config.display && !processed.is_empty() {
        if let Err(e) = app::run_viewer(AppState::new(processed, config)) {
            warn!("Viewer could not be opened: {e}");
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
