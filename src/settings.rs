use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::db::DEFAULT_DB_FILE;

pub const SAFEST_CITIES_URL: &str = "https://www.safehome.org/safest-cities/";
pub const DANGEROUS_CITIES_URL: &str = "https://www.neighborhoodscout.com/blog/top100dangerous";

const CONFIG_FILE: &str = "crime_data";
const ENV_PREFIX: &str = "CRIME";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: PathBuf,
    pub safest_cities_url: String,
    pub dangerous_cities_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Next to the executable, falling back to the working directory.
fn default_database() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DB_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("database", default_database().to_string_lossy().to_string())?
        .set_default("safest_cities_url", SAFEST_CITIES_URL)?
        .set_default("dangerous_cities_url", DANGEROUS_CITIES_URL)?
        .set_default("timeout_secs", 30_i64)?
        .set_default(
            "user_agent",
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )?)
}

/// Defaults, then `crime_data.toml` if present, then `CRIME_*` variables.
pub fn load() -> Result<Settings> {
    defaults()?
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}
