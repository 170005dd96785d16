use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use super::Scraper;
use crate::{HttpRequest, HttpResponse, ScraperResult, StatsTracker};

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

/// Serves canned pages keyed by URL; anything unknown is a 404.
#[derive(Clone, Default)]
pub struct MockScraper {
    responses: Arc<HashMap<String, MockResponse>>,
    requested: Arc<Mutex<Vec<String>>>,
    stats: Arc<StatsTracker>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        Arc::make_mut(&mut self.responses).insert(normalize(url), response);
        self
    }

    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.with_response(
            url,
            MockResponse {
                status: 200,
                body: body.into(),
            },
        )
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(
            url,
            MockResponse {
                status,
                body: String::new(),
            },
        )
    }

    /// Every URL fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        let url = normalize(url);
        self.requested.lock().iter().filter(|u| **u == url).count()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl Scraper for MockScraper {
    async fn fetch_single(&self, request: HttpRequest) -> ScraperResult<HttpResponse> {
        let key = request.url.to_string();
        self.requested.lock().push(key.clone());

        let response = self.responses.get(&key).cloned().unwrap_or(MockResponse {
            status: 404,
            body: String::new(),
        });

        Ok(HttpResponse {
            url: request.url,
            status: response.status,
            headers: HashMap::new(),
            body: response.body,
            timestamp: Utc::now(),
        })
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}
