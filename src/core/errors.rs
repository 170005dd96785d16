use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    StatusError { url: Url, status: u16 },

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Missing field '{field}' in {context}")]
    MissingField { field: &'static str, context: String },

    #[error("Unrecognized timestamp: {text:?}")]
    TimeParseError { text: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScraperError {
    /// Network or HTTP status failure while fetching a page.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScraperError::HttpError(_) | ScraperError::StatusError { .. }
        )
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
