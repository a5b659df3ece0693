// Client for the scraping server's single endpoint

use reqwest::{Client, StatusCode};

use crate::error::{SyncError, SyncResult};
use crate::models::{ListingResult, SearchFilter};

pub const SCRAPE_PATH: &str = "/scrape";
const USER_AGENT: &str = concat!("search-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ScrapeClient {
    http: Client,
    endpoint: String,
}

impl ScrapeClient {
    // Fails with a configuration error when no base URL is set, before anything touches the network
    pub fn new(base_url: Option<&str>) -> SyncResult<Self> {
        let base_url = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SyncError::Configuration(
                    "scraper URL is not set (scraper_url / SEARCH_SYNC_SCRAPER_URL)".to_string(),
                )
            })?;

        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SCRAPE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POSTs `filter` as JSON and decodes the listings. Single attempt; any
    /// status other than 200 becomes [`SyncError::Server`].
    pub async fn query(&self, filter: &SearchFilter) -> SyncResult<Vec<ListingResult>> {
        tracing::debug!(endpoint = %self.endpoint, payload = ?filter, "Posting search filter");

        let response = self.http.post(&self.endpoint).json(filter).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            tracing::debug!(status = %status, response_body = %body, "Scraping server rejected the search");
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let listings: Vec<ListingResult> = serde_json::from_str(&body)?;
        tracing::debug!(listings = listings.len(), bytes = body.len(), "Decoded scrape response");
        Ok(listings)
    }
}
