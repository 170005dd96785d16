use log::warn;
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const ENV_PREFIX: &str = "STATUSSCRAPER_";

const DEFAULT_FIRST_PAGE: usize = 1;
const DEFAULT_LAST_PAGE: usize = 40;
const DEFAULT_EMPTY_PAGE_LIMIT: usize = 3;
const DEFAULT_PACING_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "data";

/// Settings shared by every provider crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub pages: RangeInclusive<usize>,
    /// Consecutive incident-free pages after which the history is assumed to end.
    pub empty_page_limit: usize,
    pub pacing_delay: Duration,
    pub request_timeout: Duration,
    /// Impact labels dropped before normalization.
    pub excluded_impacts: Vec<String>,
    pub headers: Vec<(String, String)>,
    pub output_dir: PathBuf,
    /// Provider names to crawl; empty means every built-in provider.
    pub providers: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            pages: DEFAULT_FIRST_PAGE..=DEFAULT_LAST_PAGE,
            empty_page_limit: DEFAULT_EMPTY_PAGE_LIMIT,
            pacing_delay: Duration::from_millis(DEFAULT_PACING_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            excluded_impacts: vec!["maintenance".to_string()],
            headers: browser_headers(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            providers: Vec::new(),
        }
    }
}

impl CrawlConfig {
    /// Defaults overridden by `STATUSSCRAPER_*` variables, after loading `.env` if present.
    pub fn from_env() -> Self {
        load_env_file(dotenvy::dotenv());
        let defaults = Self::default();

        let first_page = env_parse("FIRST_PAGE", DEFAULT_FIRST_PAGE);
        let last_page = env_parse("LAST_PAGE", DEFAULT_LAST_PAGE);

        Self {
            pages: first_page..=last_page,
            empty_page_limit: env_parse("EMPTY_PAGE_LIMIT", DEFAULT_EMPTY_PAGE_LIMIT),
            pacing_delay: Duration::from_millis(env_parse("PACING_MS", DEFAULT_PACING_MS)),
            request_timeout: Duration::from_secs(env_parse("TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            excluded_impacts: env_list("EXCLUDED_IMPACTS").unwrap_or(defaults.excluded_impacts),
            headers: defaults.headers,
            output_dir: env_var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            providers: env_list("PROVIDERS").unwrap_or_default(),
        }
    }

    pub fn with_pages(mut self, pages: RangeInclusive<usize>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_empty_page_limit(mut self, limit: usize) -> Self {
        self.empty_page_limit = limit;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_excluded_impacts(mut self, impacts: Vec<&str>) -> Self {
        self.excluded_impacts = impacts.into_iter().map(String::from).collect();
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_providers(mut self, providers: Vec<&str>) -> Self {
        self.providers = providers.into_iter().map(String::from).collect();
        self
    }

    pub fn is_excluded(&self, impact: &str) -> bool {
        self.excluded_impacts
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(impact))
    }
}

/// Status pages serve a reduced page to unknown clients, so we present as a browser.
fn browser_headers() -> Vec<(String, String)> {
    [
        ("Cache-Control", "max-age=0"),
        ("Upgrade-Insecure-Requests", "1"),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.8"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// A missing `.env` is normal; one that exists but cannot be read is reported and skipped.
fn load_env_file<T>(loaded: dotenvy::Result<T>) -> bool {
    match loaded {
        Ok(_) => true,
        Err(e) if e.not_found() => false,
        Err(e) => {
            warn!("Ignoring unreadable .env file: {}", e);
            false
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{key}"))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn env_parse<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env_var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {ENV_PREFIX}{key}={raw:?}, using default {default}");
            default
        }),
        None => default,
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env_var(key).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
}
