use chrono::{DateTime, Duration, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub bytes_downloaded: usize,
    pub status_codes: HashMap<u16, usize>,
    pub average_response_time: f64, // in milliseconds
    pub pages_crawled: usize,
    pub empty_pages: usize,
    pub incidents_seen: usize,
    pub incidents_excluded: usize,
    pub events_recorded: usize,
    pub flagged_events: usize,
    pub field_warnings: usize,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                bytes_downloaded: 0,
                status_codes: HashMap::new(),
                average_response_time: 0.0,
                pages_crawled: 0,
                empty_pages: 0,
                incidents_seen: 0,
                incidents_excluded: 0,
                events_recorded: 0,
                flagged_events: 0,
                field_warnings: 0,
            })),
        }
    }

    pub fn record_request(&self, status: u16, size: usize, duration: Duration) {
        let mut stats = self.stats.write();
        stats.total_requests += 1;

        if (200..300).contains(&status) {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }

        *stats.status_codes.entry(status).or_insert(0) += 1;
        stats.bytes_downloaded += size;

        let current_total = stats.average_response_time * (stats.total_requests - 1) as f64;
        let new_duration = duration.num_milliseconds() as f64;
        stats.average_response_time = (current_total + new_duration) / stats.total_requests as f64;
    }

    pub fn record_page(&self, incidents: usize, excluded: usize) {
        let mut stats = self.stats.write();
        stats.pages_crawled += 1;
        if incidents == 0 {
            stats.empty_pages += 1;
        }
        stats.incidents_seen += incidents;
        stats.incidents_excluded += excluded;
    }

    pub fn record_event(&self, flagged: bool) {
        let mut stats = self.stats.write();
        stats.events_recorded += 1;
        if flagged {
            stats.flagged_events += 1;
        }
    }

    pub fn increment_field_warnings(&self) {
        self.stats.write().field_warnings += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self, provider: &str) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!(
            "{}: {} pages ({} empty), {} incidents seen, {} excluded, {} events ({} flagged), {} field warnings",
            provider,
            stats.pages_crawled,
            stats.empty_pages,
            stats.incidents_seen,
            stats.incidents_excluded,
            stats.events_recorded,
            stats.flagged_events,
            stats.field_warnings,
        );
        info!(
            "{}: {} requests ({} failed), {:.2} MB in {} seconds, average response {:.2}ms",
            provider,
            stats.total_requests,
            stats.failed_requests,
            stats.bytes_downloaded as f64 / 1_000_000.0,
            duration.num_seconds(),
            stats.average_response_time,
        );
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accounting() {
        let tracker = StatsTracker::new();
        tracker.record_request(200, 100, Duration::milliseconds(10));
        tracker.record_request(503, 20, Duration::milliseconds(30));

        let stats = tracker.get_stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.bytes_downloaded, 120);
        assert_eq!(stats.status_codes.get(&503), Some(&1));
        assert!((stats.average_response_time - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crawl_accounting() {
        let tracker = StatsTracker::new();
        tracker.record_page(4, 1);
        tracker.record_page(0, 0);
        tracker.record_event(false);
        tracker.record_event(true);
        tracker.increment_field_warnings();

        let stats = tracker.get_stats();
        assert_eq!(stats.pages_crawled, 2);
        assert_eq!(stats.empty_pages, 1);
        assert_eq!(stats.incidents_seen, 4);
        assert_eq!(stats.incidents_excluded, 1);
        assert_eq!(stats.events_recorded, 2);
        assert_eq!(stats.flagged_events, 1);
        assert_eq!(stats.field_warnings, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = StatsTracker::new();
        let clone = tracker.clone();
        clone.record_event(false);
        assert_eq!(tracker.get_stats().events_recorded, 1);
    }
}
