use std::time::Duration;

use tracing::info;

use crate::error::{IngestError, Result};

/// GET a URL and hand back the body. No retries: a failure ends the run.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(IngestError::Client)?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String> {
        info!("Fetching {}", url);
        let network = |source: reqwest::Error| IngestError::Network {
            url: url.to_string(),
            source,
        };
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(network)?;
        info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
