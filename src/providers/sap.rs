use async_trait::async_trait;
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tokio::sync::OnceCell;
use url::Url;

use super::{fetch_detail, Extraction, Provider, StatusPageSite};
use crate::core::{Affected, ProviderType};
use crate::parser::{parse_history_page, Component, IncidentDetail};
use crate::{Scraper, ScraperError, ScraperResult};

const BASE_URL: &str = "https://sapcp.statuspage.io";

/// Region tags inside service names, as in `App Engine [India] - Asia`.
fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").expect("valid regex"))
}

/// Location and service names offered by the history page's component filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentCatalog {
    pub locations: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

impl ComponentCatalog {
    pub fn from_components(components: &[Component]) -> Self {
        let mut catalog = Self::default();
        for component in components {
            let name = component.name.trim();
            if component.group && !name.contains("Identity Authentication") {
                catalog.locations.insert(name.to_string());
                continue;
            }

            let service = bracket_regex().replace_all(name, "");
            let service = service.split('-').next().unwrap_or_default().trim();
            if !service.is_empty() {
                catalog.services.insert(service.to_string());
            }
        }
        catalog
    }

    fn matching(names: &BTreeSet<String>, text: &str) -> Vec<String> {
        names
            .iter()
            .filter(|name| text.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

pub struct Sap {
    site: StatusPageSite,
    catalog: OnceCell<ComponentCatalog>,
}

impl Sap {
    pub const NAME: &'static str = "SAP";

    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            site: StatusPageSite::parse(BASE_URL)?,
            catalog: OnceCell::new(),
        })
    }

    pub fn with_base_url(mut self, base: Url) -> Self {
        self.site = StatusPageSite::new(base);
        self.catalog = OnceCell::new();
        self
    }

    /// Loaded from the first history page once per provider instance.
    async fn catalog(&self, scraper: &dyn Scraper) -> ScraperResult<&ComponentCatalog> {
        self.catalog
            .get_or_try_init(|| async {
                let response = scraper.fetch_url(self.site.history_page(1)?).await?;
                let page = parse_history_page(&response.body)?;
                let catalog = ComponentCatalog::from_components(&page.components);
                info!(
                    "{} component catalog: {} locations, {} services",
                    Self::NAME,
                    catalog.locations.len(),
                    catalog.services.len()
                );
                Ok::<_, ScraperError>(catalog)
            })
            .await
    }

    fn extract(&self, code: &str, catalog: &ComponentCatalog, detail: &IncidentDetail) -> Extraction {
        let mut extraction = Extraction::new(ProviderType::Hosting);
        let Some(text) = detail.affected_components.as_deref() else {
            extraction.location = Some(Affected::Many(Vec::new()));
            extraction.service = Some(Affected::Many(Vec::new()));
            extraction.mark_missing(Self::NAME, code, "location");
            extraction.mark_missing(Self::NAME, code, "service");
            return extraction;
        };

        let locations = ComponentCatalog::matching(&catalog.locations, text);
        let services = ComponentCatalog::matching(&catalog.services, text);
        debug!(
            "{} incident {}: locations {:?}, services {:?}",
            Self::NAME,
            code,
            locations,
            services
        );

        extraction.location = Some(Affected::Many(locations));
        extraction.service = Some(Affected::Many(services));
        extraction
    }
}

#[async_trait]
impl Provider for Sap {
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
        let catalog = self.catalog(scraper).await?;
        let detail = fetch_detail(self, scraper, code).await?;
        Ok(self.extract(code, catalog, &detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::MockScraper;
    use crate::test_support::{detail_page, history_page};
    use serde_json::json;

    const BASE: &str = "https://sap.status.test";

    fn provider() -> Sap {
        Sap::new().unwrap().with_base_url(Url::parse(BASE).unwrap())
    }

    fn components_page() -> String {
        history_page(
            json!([]),
            json!([
                {"name": "Europe (Frankfurt)", "group": true},
                {"name": "US East (Ashburn)", "group": true},
                {"name": "Identity Authentication", "group": true},
                {"name": "Cloud Foundry [Europe] - Frankfurt", "group": false},
                {"name": "App Engine [India] - Asia", "group": false},
            ]),
        )
    }

    #[test]
    fn test_catalog_from_components() {
        let components = vec![
            Component { name: " Europe (Frankfurt) ".to_string(), group: true },
            Component { name: "Identity Authentication".to_string(), group: true },
            Component { name: "App Engine [India] - Asia".to_string(), group: false },
        ];
        let catalog = ComponentCatalog::from_components(&components);

        assert_eq!(
            catalog.locations.into_iter().collect::<Vec<_>>(),
            vec!["Europe (Frankfurt)"]
        );
        assert_eq!(
            catalog.services.into_iter().collect::<Vec<_>>(),
            vec!["App Engine", "Identity Authentication"]
        );
    }

    #[tokio::test]
    async fn test_matches_catalog_names_in_affected_text() {
        let scraper = MockScraper::new()
            .with_page("https://sap.status.test/history?page=1", components_page())
            .with_page(
                "https://sap.status.test/incidents/s1",
                detail_page(
                    Some("This incident affected: Europe (Frankfurt) (Cloud Foundry [Europe] - Frankfurt)"),
                    &[],
                ),
            )
            .with_page(
                "https://sap.status.test/incidents/s2",
                detail_page(Some("This incident affected: US East (Ashburn) (App Engine)"), &[]),
            );

        let sap = provider();
        let first = sap
            .extract_location_service_and_type(&scraper, "s1")
            .await
            .unwrap();
        assert_eq!(first.provider_type, ProviderType::Hosting);
        assert_eq!(
            first.location,
            Some(Affected::Many(vec!["Europe (Frankfurt)".to_string()]))
        );
        assert_eq!(
            first.service,
            Some(Affected::Many(vec!["Cloud Foundry".to_string()]))
        );

        let second = sap
            .extract_location_service_and_type(&scraper, "s2")
            .await
            .unwrap();
        assert_eq!(
            second.location,
            Some(Affected::Many(vec!["US East (Ashburn)".to_string()]))
        );
        assert_eq!(
            second.service,
            Some(Affected::Many(vec!["App Engine".to_string()]))
        );

        assert_eq!(
            scraper.request_count("https://sap.status.test/history?page=1"),
            1,
            "component catalog is fetched once"
        );
    }

    #[tokio::test]
    async fn test_missing_block_yields_empty_lists() {
        let scraper = MockScraper::new()
            .with_page("https://sap.status.test/history?page=1", components_page())
            .with_page("https://sap.status.test/incidents/s3", detail_page(None, &[]));

        let extraction = provider()
            .extract_location_service_and_type(&scraper, "s3")
            .await
            .unwrap();

        assert_eq!(extraction.location, Some(Affected::Many(Vec::new())));
        assert_eq!(extraction.service, Some(Affected::Many(Vec::new())));
        assert_eq!(extraction.missing, vec!["location", "service"]);
    }
}
