use crate::{HttpRequest, HttpResponse, ScraperError, ScraperResult, StatsTracker};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;
use url::Url;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Performs the request without interpreting the status code.
    async fn fetch_single(&self, request: HttpRequest) -> ScraperResult<HttpResponse>;
    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);

    /// Fetches a page, failing with a transport error on any non-2xx status.
    async fn fetch(&self, request: HttpRequest) -> ScraperResult<HttpResponse> {
        let start_time = Utc::now();
        debug!("Fetching URL: {}", request.url);

        let response = self.fetch_single(request).await?;
        let duration = Utc::now().signed_duration_since(start_time);
        self.stats()
            .record_request(response.status, response.body.len(), duration);

        if !response.is_success() {
            warn!("Request to {} failed with status {}", response.url, response.status);
            return Err(ScraperError::StatusError {
                url: response.url,
                status: response.status,
            });
        }

        debug!(
            "Received response: status={}, body_length={}",
            response.status,
            response.body.len()
        );
        Ok(response)
    }

    async fn fetch_url(&self, url: Url) -> ScraperResult<HttpResponse> {
        self.fetch(HttpRequest::new(url)).await
    }
}
