pub mod extract;
pub mod normalize;

use tracing::debug;

use crate::db::CityRow;
use crate::error::Result;
use normalize::{StateListing, STATE_CORRECTIONS};

/// The safest-cities page lists more `h3`s than the ranking itself.
pub const RANKING_SIZE: usize = 100;

/// States page → corrected listing: names, abbreviations, then the manual inserts.
pub fn parse_state_listing(html: &str) -> Result<StateListing> {
    let names = extract::extract_state_names(html)?;
    let abbreviations = extract::extract_state_abbreviations(html)?;
    debug!(
        names = names.len(),
        abbreviations = abbreviations.len(),
        "Scraped state list"
    );
    let mut listing = StateListing::new(names, abbreviations)?;
    listing.apply_corrections(STATE_CORRECTIONS)?;
    Ok(listing)
}

pub fn parse_safe_cities(html: &str) -> Result<Vec<CityRow>> {
    let lines = extract::extract_city_state_lines(html, RANKING_SIZE);
    normalize::city_rows(&lines)
}

pub fn parse_dangerous_cities(html: &str) -> Result<Vec<CityRow>> {
    let lines = extract::extract_linked_city_state_lines(html)?;
    normalize::city_rows(&lines)
}
