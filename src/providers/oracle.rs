use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use super::{fetch_detail, listed_span, Extraction, Provider, StatusPageSite};
use crate::core::{Affected, Impact, ProviderType};
use crate::normalize::{clean_timestamp, classify_impact_none_as_degradation, TimeSpan};
use crate::parser::{IncidentDetail, RawIncident};
use crate::{Scraper, ScraperResult};

const BASE_URL: &str = "https://ocistatus.oraclecloud.com";

/// Written by hand in update text, so commas and colons come and go.
const LONG_DATE_FORMATS: [&str; 4] = [
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M",
    "%B %d, %Y %H%M",
    "%B %d %Y %H%M",
];

/// Result when the incident page has no usable start and end time.
const NO_DURATION: TimeSpan = TimeSpan {
    duration: -1,
    start: None,
};

fn start_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"start time: (.*?)utc").expect("valid regex"))
}

fn end_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"end time: (.*?)utc").expect("valid regex"))
}

/// `Service: <name> (<regions>)` in the affected-components block.
fn component_service_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(.*)\(").expect("valid regex"))
}

fn component_regions_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((.*)\)").expect("valid regex"))
}

/// Applied to lowercased update text.
fn update_service_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"services?\(?s?\)?: (.*?)region").expect("valid regex"))
}

/// Region names are lowercase identifiers; the list ends at the next capitalized word.
fn update_regions_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i:regions?\(?s?\)?): (.*?)[B-Z]").expect("valid regex"))
}

fn split_regions(text: &str) -> Vec<String> {
    text.replace("region", "")
        .split(',')
        .map(str::trim)
        .filter(|place| !place.is_empty())
        .map(String::from)
        .collect()
}

fn parse_long_date(text: &str) -> Option<NaiveDateTime> {
    let text = clean_timestamp(text);
    LONG_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
}

pub struct Oracle {
    site: StatusPageSite,
}

impl Oracle {
    pub const NAME: &'static str = "Oracle";

    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            site: StatusPageSite::parse(BASE_URL)?,
        })
    }

    pub fn with_base_url(mut self, base: Url) -> Self {
        self.site = StatusPageSite::new(base);
        self
    }

    /// Reads `Start time: ... UTC` / `End time: ... UTC` out of the update text.
    fn span_from_updates(&self, code: &str, detail: &IncidentDetail) -> TimeSpan {
        let Some(block) = detail.update_mentioning(&["start time"]) else {
            warn!("No duration in incident: {} {}", Self::NAME, code);
            return NO_DURATION;
        };

        let text = block.to_lowercase();
        let starts: Vec<&str> = start_time_regex()
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
            .collect();
        let ends: Vec<&str> = end_time_regex()
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
            .collect();

        // Some updates repeat "start time" where "end time" was meant.
        let (start, end) = match (starts.as_slice(), ends.as_slice()) {
            ([start, ..], [end, ..]) => (*start, *end),
            ([start, end], []) => (*start, *end),
            _ => {
                warn!("No duration in incident {} {}", Self::NAME, code);
                return NO_DURATION;
            }
        };

        match (parse_long_date(start), parse_long_date(end)) {
            (Some(start), Some(end)) => TimeSpan::between(start, end),
            _ => {
                warn!(
                    "Unreadable start/end time in incident {} {}: {:?} / {:?}",
                    Self::NAME,
                    code,
                    start,
                    end
                );
                NO_DURATION
            }
        }
    }

    fn extract(&self, code: &str, detail: &IncidentDetail) -> Extraction {
        let (service, locations) = if let Some(text) = detail.affected_components.as_deref() {
            let service = component_service_regex()
                .captures(text)
                .map(|caps| caps[1].trim().to_string())
                .filter(|service| !service.is_empty());
            let locations = component_regions_regex()
                .captures(text)
                .and_then(|caps| caps[1].split('(').last().map(split_regions))
                .unwrap_or_default();
            (service, locations)
        } else if let Some(block) = detail.update_mentioning(&["service", "region"]) {
            let service = update_service_regex()
                .captures(&block.to_lowercase())
                .map(|caps| caps[1].trim().to_string())
                .filter(|service| !service.is_empty());
            let locations = update_regions_regex()
                .captures(block)
                .map(|caps| split_regions(&caps[1]))
                .unwrap_or_default();
            (service, locations)
        } else {
            let mut extraction = Extraction::new(ProviderType::Hosting);
            extraction.location = Some(Affected::Many(Vec::new()));
            extraction.mark_missing(Self::NAME, code, "location");
            extraction.mark_missing(Self::NAME, code, "service");
            return extraction;
        };

        let provider_type = match &service {
            Some(service) if service.to_lowercase().contains("dns") => ProviderType::Dns,
            _ => ProviderType::Hosting,
        };

        let mut extraction = Extraction::new(provider_type);
        if service.is_none() {
            extraction.mark_missing(Self::NAME, code, "service");
        }
        if locations.is_empty() {
            info!("No location in incident {} {}", Self::NAME, code);
        }
        debug!(
            "{} incident {}: service {:?}, locations {:?}",
            Self::NAME,
            code,
            service,
            locations
        );
        extraction.service = service.map(Affected::One);
        extraction.location = Some(Affected::Many(locations));
        extraction
    }
}

#[async_trait]
impl Provider for Oracle {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn history_page_address(&self, page: usize) -> ScraperResult<Url> {
        self.site.history_page(page)
    }

    fn incident_page_address(&self, code: &str) -> ScraperResult<Url> {
        self.site.incident_page(code)
    }

    fn classify_impact(&self, label: &str) -> Option<Impact> {
        classify_impact_none_as_degradation(label)
    }

    /// Falls back to the incident page, once, when the listed timestamp gives no positive duration.
    async fn normalize_time(
        &self,
        scraper: &dyn Scraper,
        incident: &RawIncident,
        year: Option<i32>,
    ) -> ScraperResult<TimeSpan> {
        let span = listed_span(incident, year);
        if span.duration > 0 {
            return Ok(span);
        }

        debug!(
            "Looking up start/end time on the page of incident {} {}",
            Self::NAME,
            incident.code
        );
        let detail = fetch_detail(self, scraper, &incident.code).await?;
        Ok(self.span_from_updates(&incident.code, &detail))
    }

    async fn extract_location_service_and_type(
        &self,
        scraper: &dyn Scraper,
        code: &str,
    ) -> ScraperResult<Extraction> {
        let detail = fetch_detail(self, scraper, code).await?;
        Ok(self.extract(code, &detail))
    }
}
