use anyhow::anyhow;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::Error;

const TITLE_SUFFIX: &str = " Episode Details";
const REMOVE_LABEL: &str = " Remove";

/// Episode update log of a single list entry, as shown by the
/// `ajaxtb.php` detail view.
///
/// This is also the on-disk format of the history cache, so field names
/// must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub anime_title: String,
    pub anime_id: i64,
    pub updates: Vec<String>,
}

fn selector(css: &'static str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::Other(anyhow!("invalid selector {css}: {e}")))
}

/// Parses the HTML fragment returned for `detailedaid={anime_id}`.
pub fn parse_update_history(html: &str, anime_id: i64) -> Result<HistoryRecord, Error> {
    let document = Html::parse_document(html);

    let anime_title = document
        .select(&selector("div.normal_header")?)
        .next()
        .ok_or(Error::Layout("div.normal_header"))?
        .text()
        .collect::<String>()
        .replace(TITLE_SUFFIX, "")
        .trim()
        .to_string();

    let updates = document
        .select(&selector("div.spaceit_pad")?)
        .map(|el| {
            el.text()
                .collect::<String>()
                .replace(REMOVE_LABEL, "")
                .trim()
                .to_string()
        })
        .collect::<Vec<_>>();

    debug!("parsed {} updates for {anime_id}", updates.len());

    Ok(HistoryRecord {
        anime_title,
        anime_id,
        updates,
    })
}
