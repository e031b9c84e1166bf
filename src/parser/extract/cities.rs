use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::{IngestError, Result};

static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Text of every `h3`, in page order, stopping after `limit`.
///
/// The safest-cities page keeps going past the ranking, so the caller caps it.
pub fn extract_city_state_lines(html: &str, limit: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let lines = doc
        .select(&HEADING)
        .map(|h3| h3.text().collect::<String>().trim().to_string())
        .take(limit)
        .collect();
    lines
}

/// Text of the first link inside every `h3`.
pub fn extract_linked_city_state_lines(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let lines = doc
        .select(&HEADING)
        .enumerate()
        .map(|(i, h3)| {
            let a = h3.select(&ANCHOR).next().ok_or_else(|| {
                IngestError::Parse(format!(
                    "h3 #{} has no link: {:?}",
                    i,
                    h3.text().collect::<String>().trim()
                ))
            })?;
            Ok(a.text().collect::<String>().trim().to_string())
        })
        .collect();
    lines
}
