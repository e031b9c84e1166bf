use crate::loader::StallReason;

pub type Result<T, E = IngestError> = std::result::Result<T, E>;

/// Everything that can abort a step. None of these are retried; the next
/// invocation re-reads the row counts and starts the batch over.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("unexpected page structure: {0}")]
    Parse(String),

    #[error("expected \"City, ST\" but got {line:?}")]
    Format { line: String },

    #[error("no state with abbreviation {abbreviation:?} for city {city:?}")]
    ForeignKeyLookup { city: String, abbreviation: String },

    #[error("{table}: row {index} requested but the source only has {available}")]
    OutOfRange {
        table: &'static str,
        index: usize,
        available: usize,
    },

    #[error("store is not on a known checkpoint: {0}")]
    Unrecoverable(StallReason),

    #[error("SQLite error: {0}")]
    Store(#[from] rusqlite::Error),
}
