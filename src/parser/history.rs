use log::{debug, trace};
use scraper::Html;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::selector;
use crate::{ScraperError, ScraperResult};

const HISTORY_INDEX: &str = r#"div[data-react-class="HistoryIndex"]"#;

/// One incident row as listed on a history page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawIncident {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub impact: String,
    /// Markup such as `<var data-var='date'>Jun 27</var>, ... PDT`; never carries a year.
    #[serde(default)]
    pub timestamp: String,
}

/// An entry of the page's component filter. Groups are regions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub group: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub incidents: Vec<RawIncident>,
    /// Year of the first month listed; applies to every incident on the page.
    pub year: Option<i32>,
    /// At least one incident row was listed, regardless of later filtering.
    pub had_any_incident: bool,
    pub components: Vec<Component>,
}

#[derive(Deserialize)]
struct HistoryProps {
    #[serde(default)]
    months: Vec<Month>,
    #[serde(default)]
    components: Vec<Component>,
}

#[derive(Deserialize)]
struct Month {
    #[serde(default, deserialize_with = "year_label")]
    year: Option<i32>,
    #[serde(default)]
    incidents: Vec<RawIncident>,
}

/// Years appear both as numbers and as strings.
fn year_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Reads the React props blob behind a status-page history listing.
pub fn parse_history_page(body: &str) -> ScraperResult<HistoryPage> {
    let document = Html::parse_document(body);
    let index = selector(HISTORY_INDEX)?;

    let props = document
        .select(&index)
        .next()
        .and_then(|div| div.value().attr("data-react-props"))
        .ok_or_else(|| ScraperError::ParsingError("history index not found on page".to_string()))?;
    trace!("History props: {}", props);

    let props: HistoryProps = serde_json::from_str(props)?;
    let year = props.months.first().and_then(|month| month.year);
    let incidents: Vec<RawIncident> = props
        .months
        .into_iter()
        .flat_map(|month| month.incidents)
        .collect();

    debug!("History page lists {} incidents (year {:?})", incidents.len(), year);

    Ok(HistoryPage {
        had_any_incident: !incidents.is_empty(),
        incidents,
        year,
        components: props.components,
    })
}
