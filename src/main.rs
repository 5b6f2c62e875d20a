//! UmaTurniej command-line tool.
//!
//! Processes a folder of race-standings screenshots into `race_results.txt`,
//! re-reads persisted entry crops, or prints the JSON result for one file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use uma_turniej::ocr::ensure_tessdata;
use uma_turniej::results::{export_to_json, result_to_json, write_report};
use uma_turniej::{
    Pipeline, Report, TesseractCli, format_report, list_screenshots, load_config, paths,
};

const LOG_FILE: &str = "uma_turniej.log";

#[derive(Parser)]
#[command(name = "uma-turniej", version, about = "OCR for UmaTurniej race standings screenshots")]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Download trained data for the configured language if missing
    #[arg(long, global = true)]
    download_tessdata: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every screenshot in a directory
    Process {
        #[arg(long)]
        screenshots: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write the structured results as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Re-run OCR over saved entry crops
    Extract {
        #[arg(long)]
        cropped: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Process one screenshot and print its JSON result
    Single { file: PathBuf },
}

fn init_tracing() -> Result<()> {
    let log_path = paths::get_logs_dir().join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .init();
    Ok(())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        error!("[PANIC]{} {}", location, msg);
        eprintln!("[PANIC]{} {}", location, msg);
    }));
}

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    paths::ensure_directories().context("Failed to create output directories")?;
    init_tracing()?;
    install_panic_hook();

    let config_path = cli.config.clone().unwrap_or_else(paths::get_config_path);
    let config = load_config(&config_path);

    if cli.download_tessdata {
        let dir = ensure_tessdata(&config.language)?;
        info!("Tessdata ready at {}", dir.display());
    }

    let engine = TesseractCli::discover(config.language.clone())?;
    let pipeline = Pipeline::new(config, &engine).with_crop_dir(paths::get_cropped_dir());

    match cli.command {
        Command::Process {
            screenshots,
            output,
            json,
        } => {
            let dir = screenshots.unwrap_or_else(paths::get_screenshots_dir);
            let files = list_screenshots(&dir)?;
            if files.is_empty() {
                warn!("No screenshots found in {}", dir.display());
            }
            let report = pipeline.run_batch(&files)?;
            finish_report(&report, output)?;
            if let Some(json_path) = json {
                export_to_json(&report, &json_path)?;
                info!("JSON results written to {}", json_path.display());
            }
        }
        Command::Extract { cropped, output } => {
            let dir = cropped.unwrap_or_else(paths::get_cropped_dir);
            let report = pipeline.run_cropped_dir(&dir)?;
            finish_report(&report, output)?;
        }
        Command::Single { file } => {
            let result = pipeline.process_path(&file)?;
            println!("{}", result_to_json(&result)?);
        }
    }

    Ok(())
}

fn finish_report(report: &Report, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(paths::get_report_path);
    write_report(report, &output)?;

    println!("{}", format_report(report));
    if !report.skipped().is_empty() {
        println!("Skipped {} screenshot(s), see log for details", report.skipped().len());
    }
    info!("Report written to {}", output.display());
    Ok(())
}
