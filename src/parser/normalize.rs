use tracing::debug;

use crate::db::{CityRow, StateRow};
use crate::error::{IngestError, Result};

const CITY_STATE_DELIMITER: &str = ", ";

/// A state the source page leaves out, and where it belongs in the scrape order.
#[derive(Debug, Clone, Copy)]
pub struct StateCorrection {
    pub position: usize,
    pub name: &'static str,
    pub abbreviation: &'static str,
}

/// Applied in order; each insertion shifts everything after it.
/// "Colombia" is kept as the source data spells it.
pub const STATE_CORRECTIONS: &[StateCorrection] = &[
    StateCorrection {
        position: 8,
        name: "District of Colombia",
        abbreviation: "DC",
    },
    StateCorrection {
        position: 11,
        name: "Hawaii",
        abbreviation: "HI",
    },
    StateCorrection {
        position: 13,
        name: "Illinois",
        abbreviation: "IL",
    },
];

/// Parallel name / abbreviation sequences in scrape order.
#[derive(Debug, Clone, Default)]
pub struct StateListing {
    names: Vec<String>,
    abbreviations: Vec<String>,
}

impl StateListing {
    /// Names and abbreviations are paired by position, so their lengths must agree.
    pub fn new(names: Vec<String>, abbreviations: Vec<String>) -> Result<Self> {
        if names.len() != abbreviations.len() {
            return Err(IngestError::Parse(format!(
                "state list has {} names but {} abbreviation links",
                names.len(),
                abbreviations.len()
            )));
        }
        Ok(StateListing {
            names,
            abbreviations,
        })
    }

    pub fn apply_corrections(&mut self, corrections: &[StateCorrection]) -> Result<()> {
        for c in corrections {
            if c.position > self.len() {
                return Err(IngestError::Parse(format!(
                    "cannot insert {} at {}: only {} states scraped",
                    c.abbreviation,
                    c.position,
                    self.len()
                )));
            }
            self.names.insert(c.position, c.name.to_string());
            self.abbreviations.insert(c.position, c.abbreviation.to_string());
            debug!("Inserted {} ({}) at {}", c.name, c.abbreviation, c.position);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn record(&self, index: usize) -> Option<StateRow> {
        Some(StateRow {
            id: index as i64,
            abbreviation: self.abbreviations.get(index)?.clone(),
            name: self.names.get(index)?.clone(),
        })
    }
}

/// Split `"City, ST"` into its two parts. Anything after a second delimiter is dropped.
pub fn split_city_state(line: &str) -> Result<(String, String)> {
    let mut parts = line.split(CITY_STATE_DELIMITER);
    let city = parts.next().unwrap_or_default();
    let state = parts.next().ok_or_else(|| IngestError::Format {
        line: line.to_string(),
    })?;
    Ok((city.to_string(), state.to_string()))
}

/// Turn ranked `"City, ST"` lines into rows whose id is the rank position.
pub fn city_rows(lines: &[String]) -> Result<Vec<CityRow>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let (city, state_abbreviation) = split_city_state(line)?;
            Ok(CityRow {
                id: i as i64,
                city,
                state_abbreviation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Alphabetical states with DC, HI and IL missing, as the source lists them.
    fn scraped_listing(count: usize) -> StateListing {
        let all = [
            ("Alabama", "AL"), ("Alaska", "AK"), ("Arizona", "AZ"), ("Arkansas", "AR"),
            ("California", "CA"), ("Colorado", "CO"), ("Connecticut", "CT"), ("Delaware", "DE"),
            ("Florida", "FL"), ("Georgia", "GA"), ("Idaho", "ID"), ("Indiana", "IN"),
            ("Iowa", "IA"), ("Kansas", "KS"), ("Kentucky", "KY"), ("Louisiana", "LA"),
        ];
        let (names, abbrs): (Vec<_>, Vec<_>) = all
            .iter()
            .take(count)
            .map(|(n, a)| (n.to_string(), a.to_string()))
            .unzip();
        StateListing::new(names, abbrs).unwrap()
    }

    #[test]
    fn split_plano() {
        assert_eq!(
            split_city_state("Plano, TX").unwrap(),
            ("Plano".to_string(), "TX".to_string())
        );
    }

    #[test]
    fn split_without_delimiter_is_format_error() {
        let err = split_city_state("Plano TX").unwrap_err();
        assert!(matches!(err, IngestError::Format { ref line } if line == "Plano TX"));
        // comma without the following space is not the delimiter either
        assert!(split_city_state("Plano,TX").is_err());
    }

    #[test]
    fn split_keeps_first_two_parts() {
        let (city, st) = split_city_state("Lexington, KY, USA").unwrap();
        assert_eq!(city, "Lexington");
        assert_eq!(st, "KY");
    }

    #[test]
    fn corrections_land_at_fixed_positions() {
        let mut listing = scraped_listing(16);
        listing.apply_corrections(STATE_CORRECTIONS).unwrap();
        assert_eq!(listing.len(), 19);

        let dc = listing.record(8).unwrap();
        assert_eq!(dc.name, "District of Colombia");
        assert_eq!(dc.abbreviation, "DC");
        let hi = listing.record(11).unwrap();
        assert_eq!((hi.name.as_str(), hi.abbreviation.as_str()), ("Hawaii", "HI"));
        let il = listing.record(13).unwrap();
        assert_eq!((il.name.as_str(), il.abbreviation.as_str()), ("Illinois", "IL"));

        // neighbours shifted, not overwritten
        assert_eq!(listing.record(7).unwrap().abbreviation, "DE");
        assert_eq!(listing.record(9).unwrap().abbreviation, "FL");
        assert_eq!(listing.record(12).unwrap().abbreviation, "ID");
        assert_eq!(listing.record(14).unwrap().abbreviation, "IN");
        assert_eq!(listing.record(13).unwrap().id, 13);
    }

    #[test]
    fn correction_past_end_is_parse_error() {
        let mut listing = scraped_listing(5);
        let err = listing.apply_corrections(STATE_CORRECTIONS).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }

    #[test]
    fn mismatched_lengths_are_parse_error() {
        let err = StateListing::new(strings(&["Alabama", "Alaska"]), strings(&["AL"])).unwrap_err();
        assert!(matches!(err, IngestError::Parse(msg) if msg.contains("2 names but 1")));
    }

    #[test]
    fn record_past_end_is_none() {
        let listing = StateListing::new(strings(&["Alabama"]), strings(&["AL"])).unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing.record(0).is_some());
        assert!(listing.record(1).is_none());
    }

    #[test]
    fn city_rows_use_rank_as_id() {
        let rows = city_rows(&strings(&["Plano, TX", "Irvine, CA"])).unwrap();
        assert_eq!(rows[1].id, 1);
        assert_eq!(rows[1].city, "Irvine");
        assert_eq!(rows[1].state_abbreviation, "CA");
    }

    #[test]
    fn city_rows_reject_bad_line() {
        let err = city_rows(&strings(&["Plano, TX", "Nowhere"])).unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }
}
