mod db;
mod error;
mod fetch;
mod ingest;
mod loader;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use error::IngestError;
use fetch::HttpFetcher;
use ingest::{Sources, StepOutcome};
use loader::{Action, Progress, RowCounts};

const COMPLETE_MESSAGE: &str = "All 100 rows of Web Data have been inserted into the Safe_Cities and Dangerous_Cities tables in the database.";

#[derive(Parser)]
#[command(
    name = "crime_data",
    about = "Scrape the safest and most dangerous U.S. cities into SQLite, one batch per run"
)]
struct Cli {
    /// SQLite file to fill (default: crime.db next to the executable)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the next batch (the default)
    Step,
    /// Keep ingesting batches until every table is full
    Run,
    /// Show row counts and the next batch without fetching anything
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = settings::load()?;
    if let Some(db) = cli.db {
        settings.database = db;
    }

    let conn = db::connect(&settings.database)
        .with_context(|| format!("Failed to open {:?}", settings.database))?;
    let sources = Sources {
        safest_cities_url: &settings.safest_cities_url,
        dangerous_cities_url: &settings.dangerous_cities_url,
    };
    let fetcher = || {
        HttpFetcher::new(
            &settings.user_agent,
            Duration::from_secs(settings.timeout_secs),
        )
    };

    match cli.command.unwrap_or(Commands::Step) {
        Commands::Step => match ingest::plan(&conn)? {
            Progress::Pending { next } => {
                announce(&next);
                ingest::execute(&conn, &fetcher()?, &sources, next)?;
                finished(&next);
            }
            Progress::Complete => println!("{}", COMPLETE_MESSAGE),
            Progress::Stalled { why } => return Err(IngestError::Unrecoverable(why).into()),
        },
        Commands::Run => {
            let t0 = Instant::now();
            let fetcher = fetcher()?;
            loop {
                match ingest::step(&conn, &fetcher, &sources, announce)? {
                    StepOutcome::Inserted { action, rows } => {
                        println!("  {} rows", rows);
                        finished(&action);
                    }
                    StepOutcome::Complete => break,
                }
            }
            println!("{}", COMPLETE_MESSAGE);
            println!("\nDone in {:.1}s", t0.elapsed().as_secs_f64());
        }
        Commands::Status { json } => print_status(&conn, &settings.database, json)?,
    }

    Ok(())
}

fn announce(action: &Action) {
    match action {
        Action::ScrapeStates(b) => {
            println!("Collecting States and State Abbreviations...({}/{})", b.step, b.of)
        }
        Action::ScrapeCities(b) => println!("Collecting Web Data...({}/{})", b.step, b.of),
        Action::NoOp => {}
    }
}

fn finished(action: &Action) {
    match action {
        Action::ScrapeStates(b) if b.is_last() => println!("States table is Completed."),
        Action::ScrapeCities(b) if b.is_last() => {
            println!("Safe_Cities and Dangerous_Cities tables are Completed.")
        }
        _ => println!("Finished"),
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    database: &'a Path,
    counts: RowCounts,
    #[serde(flatten)]
    progress: Progress,
}

fn print_status(conn: &Connection, database: &Path, json: bool) -> anyhow::Result<()> {
    let progress = ingest::plan(conn)?;
    let counts = db::row_counts(conn)?;

    if json {
        let report = StatusReport {
            database,
            counts,
            progress,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Database:         {}", database.display());
    println!("States:           {:>3} / {}", counts.states, loader::STATE_TOTAL);
    println!("Safe_Cities:      {:>3} / {}", counts.safe, loader::CITY_TOTAL);
    println!("Dangerous_Cities: {:>3} / {}", counts.dangerous, loader::CITY_TOTAL);
    let next = match progress {
        Progress::Pending {
            next: Action::ScrapeStates(b),
        } => format!("States [{}, {}) ({}/{})", b.start, b.end, b.step, b.of),
        Progress::Pending {
            next: Action::ScrapeCities(b),
        } => format!("cities [{}, {}) ({}/{})", b.start, b.end, b.step, b.of),
        Progress::Pending { next: Action::NoOp } | Progress::Complete => {
            "nothing, all tables complete".to_string()
        }
        Progress::Stalled { why } => format!("stuck: {}", why),
    };
    println!("Next:             {}", next);
    Ok(())
}
