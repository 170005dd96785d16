use url::Url;

use crate::ScraperResult;

/// Address scheme shared by every site on the status-page platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPageSite {
    base: Url,
}

impl StatusPageSite {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> ScraperResult<Self> {
        Ok(Self::new(Url::parse(base)?))
    }

    fn root(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn history_page(&self, page: usize) -> ScraperResult<Url> {
        Ok(Url::parse(&format!("{}/history?page={}", self.root(), page))?)
    }

    pub fn incident_page(&self, code: &str) -> ScraperResult<Url> {
        Ok(Url::parse(&format!("{}/incidents/{}", self.root(), code))?)
    }
}
