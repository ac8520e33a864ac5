//! Catalog search HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::dto::SearchResponse;
use crate::domain::entities::{ItemPage, PageToken};
use crate::domain::errors::FetchError;
use crate::domain::ports::ItemServicePort;

const SEARCH_PATH: &str = "search/client";
const SEARCH_FOR: &str = "books";
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Connection settings for [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Scheme and host of the catalog API.
    pub base_url: String,
    /// Storefront identifier forwarded verbatim to the catalog.
    pub store: String,
    /// Extra attempts after a retryable failure.
    pub retries: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.storytel.net".to_string(),
            store: "STHP-SE".to_string(),
            retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Catalog search client.
pub struct CatalogClient {
    client: Client,
    config: CatalogClientConfig,
}

impl CatalogClient {
    /// Creates new client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: CatalogClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::invalid_request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Builds the search URL for one page.
    ///
    /// # Errors
    /// Returns error if the configured base URL is not a valid URL.
    pub fn search_url(&self, page: &PageToken, query: &str) -> Result<Url, FetchError> {
        let base = format!("{}/{SEARCH_PATH}", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| FetchError::invalid_request(format!("invalid base url {base}: {e}")))?;

        url.query_pairs_mut()
            .append_pair("page", page.as_str())
            .append_pair("query", query)
            .append_pair("searchFor", SEARCH_FOR)
            .append_pair("store", &self.config.store);

        Ok(url)
    }

    async fn fetch_once(&self, url: &Url) -> Result<ItemPage, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::network("request timed out")
            } else if e.is_connect() {
                FetchError::network("failed to connect to catalog")
            } else {
                FetchError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::decode(e.to_string()))?;

        Ok(body.into())
    }
}

#[async_trait]
impl ItemServicePort for CatalogClient {
    async fn fetch_page(&self, page: &PageToken, query: &str) -> Result<ItemPage, FetchError> {
        let url = self.search_url(page, query)?;
        let mut attempt = 0;

        loop {
            debug!(page = %page, attempt, "Fetching search page");
            match self.fetch_once(&url).await {
                Ok(result) => {
                    debug!(
                        page = %page,
                        items = result.items.len(),
                        next = ?result.next_page_token,
                        "Search page fetched"
                    );
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && attempt < self.config.retries => {
                    attempt += 1;
                    warn!(page = %page, attempt, error = %e, "Search request failed, retrying");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
                Err(e) => {
                    warn!(page = %page, error = %e, "Search request failed");
                    return Err(e);
                }
            }
        }
    }
}
