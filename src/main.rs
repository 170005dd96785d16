use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info, warn};

use statusscraper::providers::ProviderKind;
use statusscraper::scrapers::HttpScraper;
use statusscraper::{CrawlConfig, CrawlOutcome, Crawler, DiskStorage, ScraperResult};

#[tokio::main]
async fn main() -> ScraperResult<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .parse_default_env()
        .init();

    let config = CrawlConfig::from_env();
    let kinds = ProviderKind::select(&config.providers)?;
    let storage = DiskStorage::new(&config.output_dir)?;
    let scraper = HttpScraper::from_config(&config)?;

    info!(
        "Crawling {} providers into {}",
        kinds.len(),
        storage.base_path().display()
    );

    let mut crawls = FuturesUnordered::new();
    for kind in kinds {
        let provider = kind.build()?;
        let crawler = Crawler::new(Box::new(scraper.clone()), config.clone());
        crawls.push(tokio::spawn(async move { crawler.run(provider.as_ref()).await }));
    }

    let mut incomplete = 0;
    while let Some(joined) = crawls.next().await {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                error!("Provider task failed: {}", e);
                incomplete += 1;
                continue;
            }
        };

        // Partial results are persisted too.
        let path = match storage.store(&report.output_name, &report.events) {
            Ok(path) => path,
            Err(e) => {
                error!(
                    "{}: could not save {} events: {}",
                    report.provider,
                    report.events.len(),
                    e
                );
                incomplete += 1;
                continue;
            }
        };
        match &report.outcome {
            CrawlOutcome::Aborted { page, error } => {
                incomplete += 1;
                warn!(
                    "{}: {} events saved to {} before failing on page {}: {}",
                    report.provider,
                    report.events.len(),
                    path.display(),
                    page,
                    error
                );
            }
            _ => info!(
                "{}: {} events saved to {}",
                report.provider,
                report.events.len(),
                path.display()
            ),
        }
    }

    if incomplete > 0 {
        warn!("{} provider crawls did not complete", incomplete);
    }
    Ok(())
}
