mod cloudflare;
mod oracle;
mod sap;
mod site;

pub use cloudflare::Cloudflare;
pub use oracle::Oracle;
pub use sap::Sap;
pub use site::StatusPageSite;

use async_trait::async_trait;
use log::warn;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::core::{Affected, Impact, ProviderType};
use crate::normalize::{classify_impact, normalize_time, TimeSpan};
use crate::parser::{parse_incident_detail, IncidentDetail, RawIncident};
use crate::{Scraper, ScraperError, ScraperResult};

/// Location, service and classification read from one incident.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub location: Option<Affected>,
    pub service: Option<Affected>,
    pub provider_type: ProviderType,
    /// Fields the page did not carry; each was logged and left empty.
    pub missing: Vec<&'static str>,
}

impl Extraction {
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            location: None,
            service: None,
            provider_type,
            missing: Vec::new(),
        }
    }

    pub(crate) fn mark_missing(&mut self, provider: &str, code: &str, field: &'static str) {
        let error = ScraperError::MissingField {
            field,
            context: format!("{provider} incident {code}"),
        };
        warn!("{}", error);
        self.missing.push(field);
    }
}

/// Per-provider extraction strategy driven by the crawler.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn history_page_address(&self, page: usize) -> ScraperResult<Url>;

    fn incident_page_address(&self, code: &str) -> ScraperResult<Url>;

    async fn extract_location_service_and_type(
        &self,
        scraper: &dyn Scraper,
        code: &str,
    ) -> ScraperResult<Extraction>;

    fn classify_impact(&self, label: &str) -> Option<Impact> {
        classify_impact(label)
    }

    /// Duration and start of an incident listed under `year`.
    async fn normalize_time(
        &self,
        _scraper: &dyn Scraper,
        incident: &RawIncident,
        year: Option<i32>,
    ) -> ScraperResult<TimeSpan> {
        Ok(listed_span(incident, year))
    }

    /// File name the provider's events are persisted under.
    fn output_name(&self) -> String {
        format!("{}_outage.json", self.name().to_lowercase())
    }
}

/// Span read from the history listing; without a year the start cannot be dated.
pub(crate) fn listed_span(incident: &RawIncident, year: Option<i32>) -> TimeSpan {
    match year {
        Some(year) => normalize_time(&incident.timestamp, year),
        None => TimeSpan::unresolved(),
    }
}

/// Fetches and parses an incident page.
pub(crate) async fn fetch_detail<P: Provider + ?Sized>(
    provider: &P,
    scraper: &dyn Scraper,
    code: &str,
) -> ScraperResult<IncidentDetail> {
    let response = scraper
        .fetch_url(provider.incident_page_address(code)?)
        .await?;
    parse_incident_detail(&response.body)
}

/// Built-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Cloudflare,
    Sap,
    Oracle,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Cloudflare,
        ProviderKind::Sap,
        ProviderKind::Oracle,
    ];

    pub fn build(self) -> ScraperResult<Box<dyn Provider>> {
        Ok(match self {
            ProviderKind::Cloudflare => Box::new(Cloudflare::new()?),
            ProviderKind::Sap => Box::new(Sap::new()?),
            ProviderKind::Oracle => Box::new(Oracle::new()?),
        })
    }

    /// Providers named in `names`, or all of them when `names` is empty.
    pub fn select(names: &[String]) -> ScraperResult<Vec<ProviderKind>> {
        if names.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        names.iter().map(|name| name.parse()).collect()
    }
}

impl FromStr for ProviderKind {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloudflare" => Ok(ProviderKind::Cloudflare),
            "sap" => Ok(ProviderKind::Sap),
            "oracle" => Ok(ProviderKind::Oracle),
            other => Err(ScraperError::ConfigError(format!("unknown provider {other:?}"))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Cloudflare => Cloudflare::NAME,
            ProviderKind::Sap => Sap::NAME,
            ProviderKind::Oracle => Oracle::NAME,
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_by_default() {
        assert_eq!(ProviderKind::select(&[]).unwrap(), ProviderKind::ALL.to_vec());
    }

    #[test]
    fn test_select_by_name() {
        let names = vec!["Oracle".to_string(), " sap".to_string()];
        assert_eq!(
            ProviderKind::select(&names).unwrap(),
            vec![ProviderKind::Oracle, ProviderKind::Sap]
        );
    }

    #[test]
    fn test_unknown_provider() {
        let err = "azure".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, ScraperError::ConfigError(_)));
    }

    #[test]
    fn test_output_names() {
        for kind in ProviderKind::ALL {
            let provider = kind.build().unwrap();
            assert_eq!(provider.name(), kind.to_string());
            assert_eq!(
                provider.output_name(),
                format!("{}_outage.json", kind.to_string().to_lowercase())
            );
        }
    }
}
