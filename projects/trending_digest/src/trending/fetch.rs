use async_trait::async_trait;
use interfaces_github_trending::index::{
    fetch_trending_page, trending_url, GitHubTrendingResult, Timeframe, GITHUB_BASE_URL,
};
use reqwest::{Client, StatusCode};
use tracing::{error, info};

/// Source of trending-page markup.
///
/// `None` means "nothing this run": the failure has already been logged and
/// callers carry on with zero repositories.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, since: Option<Timeframe>) -> Option<String>;
}

pub struct GitHubPageFetcher {
    client: Client,
    base_url: String,
}

impl GitHubPageFetcher {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GITHUB_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for GitHubPageFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl PageFetcher for GitHubPageFetcher {
    async fn fetch(&self, since: Option<Timeframe>) -> Option<String> {
        let url = trending_url(&self.base_url, since);
        info!("Fetching trending page {url}");

        match fetch_trending_page(&self.client, &self.base_url, since).await {
            Ok(GitHubTrendingResult { body, status }) if status == StatusCode::OK => Some(body),
            Ok(GitHubTrendingResult { status, .. }) => {
                error!("Error fetching {url}: HTTP {status}");
                None
            }
            Err(err) => {
                error!("Error fetching {url}: {err}");
                None
            }
        }
    }
}
