use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{IngestError, Result};

static STATE_LIST: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.home-state-list.list-unstyled").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static STATE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cities/(\w\w)").unwrap());

/// The first state list on the page, or a parse error if the markup moved.
fn state_list(doc: &Html) -> Result<ElementRef<'_>> {
    doc.select(&STATE_LIST).next().ok_or_else(|| {
        IngestError::Parse("no ul.home-state-list.list-unstyled on the page".to_string())
    })
}

fn entries<'a>(list: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    list.children().filter_map(ElementRef::wrap)
}

pub fn extract_state_names(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let list = state_list(&doc)?;
    let names = entries(list)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .collect();
    Ok(names)
}

/// Two-letter codes recovered from `.../cities/<xx>...` link targets, upper-cased.
pub fn extract_state_abbreviations(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let list = state_list(&doc)?;
    let mut abbreviations = Vec::new();
    for li in entries(list) {
        for a in li.select(&ANCHOR) {
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            abbreviations.extend(
                STATE_LINK_RE
                    .captures_iter(href)
                    .map(|c| c[1].to_uppercase()),
            );
        }
    }
    Ok(abbreviations)
}
