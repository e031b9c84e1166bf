//! One step of the incremental load: read counts, pick the batch, fetch,
//! parse, write.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, CityRow, Table};
use crate::error::{IngestError, Result};
use crate::fetch::Fetch;
use crate::loader::{Action, Batch, Progress};
use crate::parser;

/// Where the two ranking pages live.
pub struct Sources<'a> {
    pub safest_cities_url: &'a str,
    pub dangerous_cities_url: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Inserted { action: Action, rows: usize },
    Complete,
}

/// Make sure the tables exist and classify the current counts. Never fetches.
pub fn plan(conn: &Connection) -> Result<Progress> {
    db::init_schema(conn)?;
    let counts = db::row_counts(conn)?;
    let progress = Progress::classify(counts);
    info!(
        states = counts.states,
        safe = counts.safe,
        dangerous = counts.dangerous,
        ?progress,
        "Read row counts"
    );
    Ok(progress)
}

/// Run one planned action. Returns the number of rows committed.
pub fn execute(
    conn: &Connection,
    fetcher: &dyn Fetch,
    sources: &Sources<'_>,
    action: Action,
) -> Result<usize> {
    match action {
        Action::ScrapeStates(batch) => ingest_states(conn, fetcher, sources, batch),
        Action::ScrapeCities(batch) => ingest_cities(conn, fetcher, sources, batch),
        Action::NoOp => Ok(0),
    }
}

/// Plan and run the next batch. `on_start` sees the action before anything is fetched.
pub fn step(
    conn: &Connection,
    fetcher: &dyn Fetch,
    sources: &Sources<'_>,
    on_start: impl FnOnce(&Action),
) -> Result<StepOutcome> {
    match plan(conn)? {
        Progress::Pending { next } => {
            on_start(&next);
            let rows = execute(conn, fetcher, sources, next)?;
            Ok(StepOutcome::Inserted { action: next, rows })
        }
        Progress::Complete => Ok(StepOutcome::Complete),
        Progress::Stalled { why } => {
            warn!("Refusing to continue: {}", why);
            Err(IngestError::Unrecoverable(why))
        }
    }
}

fn ingest_states(
    conn: &Connection,
    fetcher: &dyn Fetch,
    sources: &Sources<'_>,
    batch: Batch,
) -> Result<usize> {
    let html = fetcher.get(sources.safest_cities_url)?;
    let listing = parser::parse_state_listing(&html)?;
    let rows = (batch.start..batch.end)
        .map(|i| {
            listing.record(i).ok_or(IngestError::OutOfRange {
                table: Table::States.name(),
                index: i,
                available: listing.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let n = db::save_states(conn, &rows)?;
    info!("States [{}, {}): {} rows", batch.start, batch.end, n);
    Ok(n)
}

fn ingest_cities(
    conn: &Connection,
    fetcher: &dyn Fetch,
    sources: &Sources<'_>,
    batch: Batch,
) -> Result<usize> {
    let safe_html = fetcher.get(sources.safest_cities_url)?;
    let dangerous_html = fetcher.get(sources.dangerous_cities_url)?;
    let safe = parser::parse_safe_cities(&safe_html)?;
    let dangerous = parser::parse_dangerous_cities(&dangerous_html)?;

    let n = db::save_cities(
        conn,
        batch_slice(&safe, batch, Table::SafeCities)?,
        batch_slice(&dangerous, batch, Table::DangerousCities)?,
    )?;
    info!("Cities [{}, {}): {} rows", batch.start, batch.end, n);
    Ok(n)
}

fn batch_slice(rows: &[CityRow], batch: Batch, table: Table) -> Result<&[CityRow]> {
    rows.get(batch.start..batch.end)
        .ok_or(IngestError::OutOfRange {
            table: table.name(),
            index: rows.len().max(batch.start),
            available: rows.len(),
        })
}
