use async_trait::async_trait;
use log::trace;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use super::Scraper;
use crate::{HttpRequest, HttpResponse, ScraperResult, StatsTracker};

/// Holds every request until `delay` has passed since the previous one completed.
pub struct PacedScraper {
    inner: Box<dyn Scraper>,
    delay: Duration,
    last_fetch: Mutex<Option<Instant>>,
}

impl PacedScraper {
    pub fn new(inner: Box<dyn Scraper>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            last_fetch: Mutex::new(None),
        }
    }

    fn remaining_wait(&self) -> Option<Duration> {
        let last = (*self.last_fetch.lock())?;
        let wait = self.delay.saturating_sub(last.elapsed());
        (!wait.is_zero()).then_some(wait)
    }
}

#[async_trait]
impl Scraper for PacedScraper {
    async fn fetch_single(&self, request: HttpRequest) -> ScraperResult<HttpResponse> {
        if let Some(wait) = self.remaining_wait() {
            trace!("Pacing {:?} before {}", wait, request.url);
            sleep(wait).await;
        }

        let result = self.inner.fetch_single(request).await;
        *self.last_fetch.lock() = Some(Instant::now());
        result
    }

    fn stats(&self) -> &StatsTracker {
        self.inner.stats()
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.inner.set_stats(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::MockScraper;
    use url::Url;

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_fetches_are_spaced() {
        let mock = MockScraper::new()
            .with_page("https://status.test/a", "a")
            .with_page("https://status.test/b", "b");
        let scraper = PacedScraper::new(Box::new(mock), Duration::from_secs(2));

        let started = Instant::now();
        scraper
            .fetch_url(Url::parse("https://status.test/a").unwrap())
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(1), "first fetch is not delayed");

        scraper
            .fetch_url(Url::parse("https://status.test/b").unwrap())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_still_paces_next_request() {
        let mock = MockScraper::new()
            .with_status("https://status.test/down", 503)
            .with_page("https://status.test/up", "up");
        let scraper = PacedScraper::new(Box::new(mock), Duration::from_secs(1));

        let started = Instant::now();
        assert!(scraper
            .fetch_url(Url::parse("https://status.test/down").unwrap())
            .await
            .is_err());
        scraper
            .fetch_url(Url::parse("https://status.test/up").unwrap())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
