use reqwest::Method;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub method: Method,
}

impl HttpRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
        }
    }
}
