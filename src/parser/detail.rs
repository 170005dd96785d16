use scraper::Html;

use super::{collapse_whitespace, selector};
use crate::ScraperResult;

const AFFECTED_COMPONENTS: &str = "div.components-affected";
const UPDATE_BODY: &str = "div.update-body";

/// The parts of an incident page the extraction strategies read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentDetail {
    /// Text of the "This incident affected: ..." block, if the page has one.
    pub affected_components: Option<String>,
    /// Text of each status update, newest first as on the page.
    pub updates: Vec<String>,
}

impl IncidentDetail {
    /// First update whose text mentions every one of `words`, ignoring case.
    pub fn update_mentioning(&self, words: &[&str]) -> Option<&str> {
        self.updates
            .iter()
            .find(|update| {
                let lower = update.to_lowercase();
                words.iter().all(|word| lower.contains(&word.to_lowercase()))
            })
            .map(String::as_str)
    }
}

pub fn parse_incident_detail(body: &str) -> ScraperResult<IncidentDetail> {
    let document = Html::parse_document(body);
    let affected = selector(AFFECTED_COMPONENTS)?;
    let update = selector(UPDATE_BODY)?;

    let affected_components = document
        .select(&affected)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty());

    let updates = document
        .select(&update)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .collect();

    Ok(IncidentDetail {
        affected_components,
        updates,
    })
}
