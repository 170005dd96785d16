pub mod core;
pub mod http;
pub mod normalize;
pub mod parser;
pub mod providers;
pub mod scrapers;
pub mod stats;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use core::{
    Affected, CrawlConfig, CrawlOutcome, CrawlReport, Crawler, Event, Impact, ProviderType,
    ScraperError, ScraperResult,
};
pub use http::{HttpRequest, HttpResponse};
pub use providers::{Provider, ProviderKind};
pub use scrapers::Scraper;
pub use stats::StatsTracker;
pub use storage::{DiskStorage, EventSink};
