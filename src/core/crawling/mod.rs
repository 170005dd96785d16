mod crawler;
mod cursor;

pub use crawler::{CrawlOutcome, CrawlReport, Crawler};
pub use cursor::CrawlCursor;
