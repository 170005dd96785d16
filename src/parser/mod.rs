mod detail;
mod history;

pub use detail::{parse_incident_detail, IncidentDetail};
pub use history::{parse_history_page, Component, HistoryPage, RawIncident};

use crate::{ScraperError, ScraperResult};
use scraper::Selector;

pub(crate) fn selector(css: &str) -> ScraperResult<Selector> {
    Selector::parse(css)
        .map_err(|e| ScraperError::ParsingError(format!("bad selector {css:?}: {e:?}")))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
