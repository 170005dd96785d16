use log::{debug, info, warn};
use std::sync::Arc;

use super::CrawlCursor;
use crate::core::{CrawlConfig, Event};
use crate::parser::{parse_history_page, HistoryPage, RawIncident};
use crate::providers::Provider;
use crate::scrapers::PacedScraper;
use crate::storage::EventSink;
use crate::stats::StatsTracker;
use crate::{Scraper, ScraperError, ScraperResult};

/// How a provider crawl ended.
#[derive(Debug)]
pub enum CrawlOutcome {
    /// Every page in the configured range was read.
    Exhausted { last_page: usize },
    /// The empty-page limit was reached at `page`.
    EndOfHistory { page: usize },
    /// A page or incident could not be fetched or parsed; earlier events are kept.
    Aborted { page: usize, error: ScraperError },
}

/// Events gathered for one provider, complete or partial.
#[derive(Debug)]
pub struct CrawlReport {
    pub provider: String,
    pub output_name: String,
    pub events: EventSink,
    pub outcome: CrawlOutcome,
}

pub struct Crawler {
    scraper: Box<dyn Scraper>,
    config: CrawlConfig,
    stats: Arc<StatsTracker>,
}

impl Crawler {
    /// Every fetch made through the crawler is spaced by the configured pacing delay.
    pub fn new(scraper: Box<dyn Scraper>, config: CrawlConfig) -> Self {
        info!("Initializing crawler");
        let stats = Arc::new(StatsTracker::new());
        let mut scraper: Box<dyn Scraper> =
            Box::new(PacedScraper::new(scraper, config.pacing_delay));
        scraper.set_stats(Arc::clone(&stats));

        Self {
            scraper,
            config,
            stats,
        }
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Walks the provider's history pages and normalizes every kept incident.
    ///
    /// Never fails: a fetch or page-level parse error ends the crawl and is
    /// reported in the outcome next to the events collected before it.
    pub async fn run<P: Provider + ?Sized>(&self, provider: &P) -> CrawlReport {
        info!("Starting crawl: {}", provider.name());
        debug!(
            "Pages {:?}, empty-page limit {}",
            self.config.pages, self.config.empty_page_limit
        );

        let mut events = EventSink::new();
        let outcome = self.crawl(provider, &mut events).await;

        match &outcome {
            CrawlOutcome::Exhausted { last_page } => {
                info!("{}: page range exhausted at page {}", provider.name(), last_page)
            }
            CrawlOutcome::EndOfHistory { page } => info!(
                "{}: no more information since page {}",
                provider.name(),
                page.saturating_sub(self.config.empty_page_limit)
            ),
            CrawlOutcome::Aborted { page, error } => warn!(
                "{}: crawl aborted on page {} ({}), keeping {} events",
                provider.name(),
                page,
                error,
                events.len()
            ),
        }

        self.stats.finish();
        self.stats.print_summary(provider.name());

        CrawlReport {
            provider: provider.name().to_string(),
            output_name: provider.output_name(),
            events,
            outcome,
        }
    }

    async fn crawl<P: Provider + ?Sized>(&self, provider: &P, events: &mut EventSink) -> CrawlOutcome {
        let mut cursor = CrawlCursor::new();
        let mut last_page = *self.config.pages.start();

        for page in self.config.pages.clone() {
            last_page = page;
            info!("Now scraping {} page {}", provider.name(), page);

            let history = match self.fetch_history(provider, page).await {
                Ok(history) => history,
                Err(error) => return CrawlOutcome::Aborted { page, error },
            };

            let kept: Vec<&RawIncident> = history
                .incidents
                .iter()
                .filter(|incident| !self.config.is_excluded(&incident.impact))
                .collect();
            self.stats
                .record_page(history.incidents.len(), history.incidents.len() - kept.len());

            cursor.advance(history.year, history.had_any_incident);
            if cursor.reached_end(self.config.empty_page_limit) {
                return CrawlOutcome::EndOfHistory { page };
            }

            for incident in kept {
                if !cursor.claim_issue(&incident.code) {
                    debug!("Skipping repeated incident {}", incident.code);
                    continue;
                }

                info!("Now scraping incident: {}", incident.code);
                match self.build_event(provider, incident, cursor.year).await {
                    Ok(event) => {
                        self.stats.record_event(event.is_flagged());
                        events.push(event);
                    }
                    Err(error) => return CrawlOutcome::Aborted { page, error },
                }
            }
        }

        CrawlOutcome::Exhausted { last_page }
    }

    async fn fetch_history<P: Provider + ?Sized>(
        &self,
        provider: &P,
        page: usize,
    ) -> ScraperResult<HistoryPage> {
        let url = provider.history_page_address(page)?;
        let response = self.scraper.fetch_url(url).await?;
        parse_history_page(&response.body)
    }

    /// Either a complete event or an error; nothing is recorded in between.
    async fn build_event<P: Provider + ?Sized>(
        &self,
        provider: &P,
        incident: &RawIncident,
        year: Option<i32>,
    ) -> ScraperResult<Event> {
        let scraper = self.scraper.as_ref();

        if year.is_none() {
            warn!("No year known for incident {} {}", provider.name(), incident.code);
            self.stats.increment_field_warnings();
        }
        let span = provider.normalize_time(scraper, incident, year).await?;
        if !span.is_resolved() && span.duration == 0 {
            warn!("Investigating incident: {} {}", provider.name(), incident.code);
        }

        let impact = provider.classify_impact(&incident.impact);
        let extraction = provider
            .extract_location_service_and_type(scraper, &incident.code)
            .await?;
        for _ in &extraction.missing {
            self.stats.increment_field_warnings();
        }

        let event = Event {
            issue: incident.code.clone(),
            provider_type: extraction.provider_type,
            provider: provider.name().to_string(),
            service: extraction.service,
            location: extraction.location,
            duration: span.duration,
            affect_rate: None,
            impact,
            cause: None,
            intensity: None,
            time: span.start,
        };

        if event.is_flagged() {
            warn!(
                "Incident {} {} has a non-positive duration of {} minutes",
                provider.name(),
                event.issue,
                event.duration
            );
        }
        Ok(event)
    }
}
