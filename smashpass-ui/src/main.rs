//! smashpass - Pokemon Smash or Pass, terminal edition
//!
//! Pages through the catalog, records a Smash/Pass verdict per character and
//! imports/exports those verdicts as CSV.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smashpass_common::config::{self, SmashPassConfig};
use smashpass_common::csv_codec::{self, ImportOptions, RosterPolicy};
use smashpass_common::events::EventBus;
use smashpass_common::{Catalog, VerdictStore};
use smashpass_ui::services::ImageFetcher;
use smashpass_ui::{build_info, render, App, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Store change notifications buffered for the UI
const EVENT_BUS_CAPACITY: usize = 256;

/// Command-line arguments for smashpass
#[derive(Parser, Debug)]
#[command(name = "smashpass")]
#[command(about = "Pokemon Smash or Pass")]
#[command(version = build_info::VERSION)]
struct Args {
    /// Config file (default: <config dir>/smashpass/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog JSON to use instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Character to start with; repeat for several (replaces the configured roster)
    #[arg(short = 'c', long = "character")]
    characters: Vec<String>,

    /// Start with an empty catalog if it cannot be loaded
    #[arg(long)]
    allow_empty_catalog: bool,

    /// Do not download entity images
    #[arg(long)]
    no_images: bool,

    /// Log level (overrides RUST_LOG and the config file)
    #[arg(long, env = "SMASHPASS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Interactive session (default)
    Run,
    /// Print per-character stats from a CSV file
    Tally {
        /// CSV file written by an export
        file: PathBuf,
    },
    /// Write a blank sheet (all Undecided) for the configured characters
    Export {
        /// Destination; .csv is appended when missing
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the file can set the log level
    let config = config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(args.log_level.as_deref(), &config);

    info!("Starting {}", build_info::describe());

    let catalog = Arc::new(load_catalog(&args, &config)?);
    let roster = config::resolve_roster(&args.characters, &config);

    match args.command.unwrap_or(Mode::Run) {
        Mode::Run => run_interactive(catalog, &roster, &config, args.no_images).await,
        Mode::Tally { file } => tally(catalog, &file, &config),
        Mode::Export { file } => {
            let store = VerdictStore::new().with_roster(&roster)?;
            let written = csv_codec::export_to_file(&file, &store, &catalog)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Saved {}", written.display());
            Ok(())
        }
    }
}

fn init_tracing(cli_level: Option<&str>, config: &SmashPassConfig) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(directives(level)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives(&config.logging.level))),
    };

    // stderr keeps log lines out of the rendered UI on stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn directives(level: &str) -> String {
    format!("smashpass={0},smashpass_ui={0},smashpass_common={0}", level)
}

fn load_catalog(args: &Args, config: &SmashPassConfig) -> Result<Catalog> {
    let result = match config::resolve_catalog_path(args.catalog.as_deref(), config) {
        Some(path) => Catalog::load(&path),
        None => Catalog::bundled(),
    };

    match result {
        Ok(catalog) => Ok(catalog),
        Err(e) if args.allow_empty_catalog || config.allow_empty_catalog => {
            warn!(error = %e, "Catalog unavailable, continuing with an empty catalog");
            Ok(Catalog::empty())
        }
        Err(e) => Err(e).context("Failed to load catalog"),
    }
}

async fn run_interactive(
    catalog: Arc<Catalog>,
    roster: &[String],
    config: &SmashPassConfig,
    no_images: bool,
) -> Result<()> {
    let bus = EventBus::new(EVENT_BUS_CAPACITY);
    let events = bus.subscribe();
    let store = VerdictStore::with_events(bus).with_roster(roster)?;
    info!(characters = store.len(), entities = catalog.len(), "Session ready");

    let session = Session::new(catalog, store, config.import_options())
        .with_default_export_name(config.default_export_name.clone());

    let fetcher = if no_images {
        None
    } else {
        Some(ImageFetcher::new(Duration::from_secs(config.image_timeout_secs))?)
    };

    let mut app = App::new(session, events, fetcher, tokio::io::stdout());
    println!("{}\n", render::HELP);
    app.run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await
        .context("Terminal I/O failed")?;
    Ok(())
}

fn tally(catalog: Arc<Catalog>, file: &std::path::Path, config: &SmashPassConfig) -> Result<()> {
    let mut store = VerdictStore::new();
    let options = ImportOptions {
        roster_policy: RosterPolicy::AdoptHeader,
        ..config.import_options()
    };
    csv_codec::import_from_file(file, &catalog, &mut store, options)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let session = Session::new(catalog, store, options);
    println!("{}", render::stats_view(&session));
    Ok(())
}
