use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::loader::RowCounts;

pub const DEFAULT_DB_FILE: &str = "crime.db";

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    // The schema has no REFERENCES clauses; save_cities resolves state ids itself.
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS States (id INTEGER PRIMARY KEY, abbreviation TEXT, state_name TEXT);
        CREATE TABLE IF NOT EXISTS Safe_Cities (id INTEGER PRIMARY KEY, city TEXT, state_id INTEGER);
        CREATE TABLE IF NOT EXISTS Dangerous_Cities (id INTEGER PRIMARY KEY, city TEXT, state_id INTEGER);
        ",
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    States,
    SafeCities,
    DangerousCities,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::States => "States",
            Table::SafeCities => "Safe_Cities",
            Table::DangerousCities => "Dangerous_Cities",
        }
    }
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let n: usize = conn.query_row(&sql, [], |r| r.get(0))?;
    Ok(n)
}

pub fn row_counts(conn: &Connection) -> Result<RowCounts> {
    Ok(RowCounts {
        states: count_rows(conn, Table::States)?,
        safe: count_rows(conn, Table::SafeCities)?,
        dangerous: count_rows(conn, Table::DangerousCities)?,
    })
}

pub fn lookup_state_id(conn: &Connection, abbreviation: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM States WHERE abbreviation = ?1",
            [abbreviation],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

// ── States ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRow {
    pub id: i64,
    pub abbreviation: String,
    pub name: String,
}

/// Insert one batch of states. Nothing is kept unless every row goes in.
pub fn save_states(conn: &Connection, rows: &[StateRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt =
            tx.prepare("INSERT INTO States (id, abbreviation, state_name) VALUES (?1, ?2, ?3)")?;
        for r in rows {
            count += stmt.execute(rusqlite::params![r.id, r.abbreviation, r.name])?;
        }
    }
    tx.commit()?;
    debug!("Committed {} States rows", count);
    Ok(count)
}

// ── Cities ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityRow {
    pub id: i64,
    pub city: String,
    pub state_abbreviation: String,
}

/// Insert one batch into both city tables in a single transaction.
///
/// Each city's abbreviation is resolved against `States`; an unknown one
/// aborts the whole batch.
pub fn save_cities(conn: &Connection, safe: &[CityRow], dangerous: &[CityRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    for (table, rows) in [(Table::SafeCities, safe), (Table::DangerousCities, dangerous)] {
        let sql = format!(
            "INSERT INTO {} (id, city, state_id) VALUES (?1, ?2, ?3)",
            table.name()
        );
        let mut stmt = tx.prepare(&sql)?;
        for r in rows {
            let state_id = lookup_state_id(&tx, &r.state_abbreviation)?.ok_or_else(|| {
                IngestError::ForeignKeyLookup {
                    city: r.city.clone(),
                    abbreviation: r.state_abbreviation.clone(),
                }
            })?;
            count += stmt.execute(rusqlite::params![r.id, r.city, state_id])?;
        }
    }
    tx.commit()?;
    debug!("Committed {} city rows", count);
    Ok(count)
}
