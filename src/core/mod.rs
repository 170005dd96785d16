pub mod config;
pub mod crawling;
mod errors;
pub mod event;

pub use config::CrawlConfig;
pub use crawling::{CrawlCursor, CrawlOutcome, CrawlReport, Crawler};
pub use errors::{ScraperError, ScraperResult};
pub use event::{Affected, Event, Impact, ProviderType};
