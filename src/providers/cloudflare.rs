use async_trait::async_trait;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use super::{fetch_detail, Extraction, Provider, StatusPageSite};
use crate::core::{Affected, ProviderType};
use crate::parser::IncidentDetail;
use crate::{Scraper, ScraperResult};

const BASE_URL: &str = "https://www.cloudflarestatus.com";

/// Each affected data center reads `City, Country - (IATA)`.
fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,(]([^()]*?) - \([A-Z]+\)").expect("valid regex"))
}

pub struct Cloudflare {
    site: StatusPageSite,
}

impl Cloudflare {
    pub const NAME: &'static str = "Cloudflare";

    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            site: StatusPageSite::parse(BASE_URL)?,
        })
    }

    pub fn with_base_url(mut self, base: Url) -> Self {
        self.site = StatusPageSite::new(base);
        self
    }

    fn extract(&self, code: &str, detail: &IncidentDetail) -> Extraction {
        let Some(text) = detail.affected_components.as_deref() else {
            let mut extraction = Extraction::new(ProviderType::Dns);
            extraction.location = Some(Affected::Many(Vec::new()));
            extraction.mark_missing(Self::NAME, code, "location");
            return extraction;
        };

        let provider_type = if text.contains("CDN") {
            ProviderType::ContentDeliveryNetwork
        } else {
            ProviderType::Dns
        };

        let locations: Vec<String> = location_regex()
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|place| !place.is_empty())
            .collect();
        debug!("{} incident {} locations: {:?}", Self::NAME, code, locations);

        let mut extraction = Extraction::new(provider_type);
        extraction.location = Some(Affected::Many(locations));
        extraction
    }
}

#[async_trait]
impl Provider for Cloudflare {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn history_page_address(&self, page: usize) -> ScraperResult<Url> {
        self.site.history_page(page)
    }

    fn incident_page_address(&self, code: &str) -> ScraperResult<Url> {
        self.site.incident_page(code)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::MockScraper;
    use crate::test_support::detail_page;

    const BASE: &str = "https://cf.status.test";

    fn provider() -> Cloudflare {
        Cloudflare::new()
            .unwrap()
            .with_base_url(Url::parse(BASE).unwrap())
    }

    #[tokio::test]
    async fn test_cdn_incident_with_locations() {
        let scraper = MockScraper::new().with_page(
            "https://cf.status.test/incidents/k2x9",
            detail_page(
                Some(
                    "This incident affected: Cloudflare Sites and Services (CDN/Cache) and \
                     Europe (Frankfurt, Germany - (FRA), London, United Kingdom - (LHR))",
                ),
                &["Resolved"],
            ),
        );

        let extraction = provider()
            .extract_location_service_and_type(&scraper, "k2x9")
            .await
            .unwrap();

        assert_eq!(extraction.provider_type, ProviderType::ContentDeliveryNetwork);
        assert_eq!(
            extraction.location,
            Some(Affected::Many(vec![
                "Frankfurt, Germany".to_string(),
                "London, United Kingdom".to_string(),
            ]))
        );
        assert_eq!(extraction.service, None);
        assert!(extraction.missing.is_empty());
    }

    #[tokio::test]
    async fn test_dns_incident() {
        let scraper = MockScraper::new().with_page(
            "https://cf.status.test/incidents/d1",
            detail_page(Some("This incident affected: Authoritative DNS"), &[]),
        );

        let extraction = provider()
            .extract_location_service_and_type(&scraper, "d1")
            .await
            .unwrap();

        assert_eq!(extraction.provider_type, ProviderType::Dns);
        assert_eq!(extraction.location, Some(Affected::Many(Vec::new())));
    }

    #[tokio::test]
    async fn test_missing_block_yields_empty_location() {
        let scraper = MockScraper::new().with_page(
            "https://cf.status.test/incidents/none",
            detail_page(None, &["We are investigating."]),
        );

        let extraction = provider()
            .extract_location_service_and_type(&scraper, "none")
            .await
            .unwrap();

        assert_eq!(extraction.provider_type, ProviderType::Dns);
        assert_eq!(extraction.location, Some(Affected::Many(Vec::new())));
        assert_eq!(extraction.missing, vec!["location"]);
    }

    #[tokio::test]
    async fn test_detail_fetch_failure_propagates() {
        let scraper = MockScraper::new().with_status("https://cf.status.test/incidents/gone", 500);

        let err = provider()
            .extract_location_service_and_type(&scraper, "gone")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
