//! Fortune CLI - manage the fortune database and serve the web demo

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use fortune_demo::config::{self, FortuneConfig};
use fortune_demo::importer::{ImportReport, Importer};
use fortune_demo::storage::FortuneStore;
use fortune_demo::ui::{self, Icons};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fortune")]
#[command(version)]
#[command(about = "Serve random fortunes and import fortune files into SQLite")]
#[command(long_about = r#"
Keeps a table of fortunes in SQLite and shows a random one on a web page.

Example usage:
  fortune db init
  fortune db import more-fortunes.txt
  fortune random
  fortune serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config and environment)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the fortune table
    #[command(subcommand)]
    Db(DbCommands),

    /// Print one random fortune
    Random,

    /// Run the web server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create the table and import the initial set of entries
    Init {
        /// Fortune file to import on first initialization
        #[arg(short, long, default_value = "fortunes.txt")]
        file: PathBuf,
    },

    /// Import entries from a fortune file
    Import {
        /// Fortune file, entries separated by lines holding a single '%'
        filename: PathBuf,
    },

    /// Drop the existing table and create a new empty one
    Reset,

    /// Drop the existing table
    Drop,

    /// Show statistics about the stored fortunes
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = FortuneConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    match cli.command {
        Commands::Db(DbCommands::Init { file }) => {
            let mut store = open_store(&config)?;
            let outcome = store.initialize(false)?;
            if outcome.already_existed() {
                ui::info("Database", "already initialized");
                return Ok(());
            }

            tracing::info!("Initializing the database...");
            let report = import_file(&store, &file)?;
            print_report(&report);
        }

        Commands::Db(DbCommands::Import { filename }) => {
            let store = open_store(&config)?;
            let report = import_file(&store, &filename)?;
            print_report(&report);
        }

        Commands::Db(DbCommands::Reset) => {
            let mut store = open_store(&config)?;
            store.initialize(true)?;
            ui::success("Fortune table is empty and ready");
        }

        Commands::Db(DbCommands::Drop) => {
            let store = open_store(&config)?;
            tracing::info!("Dropping fortune table...");
            store.drop_table()?;
            tracing::info!("Fortune table dropped.");
            ui::status(Icons::DEL, "Dropped", &config.database.display().to_string());
        }

        Commands::Db(DbCommands::Stats) => {
            let store = open_store(&config)?;
            let stats = store.stats()?;
            let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
                d.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string())
            };

            ui::section(&format!("{} Fortune Statistics", Icons::STATS));
            let fortunes = stats.fortunes.to_string();
            let oldest = date(stats.oldest);
            let newest = date(stats.newest);
            let database = config.database.display().to_string();
            println!(
                "{}",
                ui::stats_table(&[
                    ("Database", database.as_str()),
                    ("Fortunes", fortunes.as_str()),
                    ("Oldest", oldest.as_str()),
                    ("Newest", newest.as_str()),
                    ("Uniqueness", stats.mode.as_str()),
                ])
            );
        }

        Commands::Random => {
            let store = open_store(&config)?;
            let text = store.read_random_fortune()?;
            println!("{} {}", Icons::COOKIE, text.trim_end().style(ui::theme().quote.clone()));
        }

        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(fortune_demo::server::start_server(config))?;
        }
    }

    Ok(())
}

fn open_store(config: &FortuneConfig) -> anyhow::Result<FortuneStore> {
    config::ensure_db_dir(&config.database)?;
    tracing::debug!("Opening {}", config.database.display());
    Ok(FortuneStore::open(&config.database, config.uniqueness)?)
}

fn import_file(store: &FortuneStore, path: &Path) -> anyhow::Result<ImportReport> {
    ui::header(&format!("Importing file '{}' to the database", path.display()));

    // Log lines replace the bar when nobody is watching a terminal
    if !console::Term::stdout().is_term() {
        return Ok(Importer::new(store).import_file(path)?);
    }

    let (progress, tx) = ui::ImportProgress::new();
    let result = Importer::new(store).with_progress(tx).import_file(path);
    progress.finish();
    Ok(result?)
}

fn print_report(report: &ImportReport) {
    ui::success(&format!("Imported {} entries", report.imported));
    ui::summary_row("Entries:", &report.total.to_string());
    ui::summary_row("Duplicates found:", &report.duplicates.to_string());
    ui::summary_row("Speed:", &format!("{:.2} eps", report.entries_per_second()));
    ui::timing(&report.elapsed_hms());
}
