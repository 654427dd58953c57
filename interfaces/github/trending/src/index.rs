use std::fmt;
use std::str::FromStr;

use reqwest::{Client, StatusCode};
use thiserror::Error;

pub const GITHUB_BASE_URL: &str = "https://github.com";
pub const TRENDING_PATH: &str = "/trending";

// GitHub serves a stripped page (or a 429) to clients that look automated.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Window the trending ranking is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

#[derive(Debug, Error)]
#[error("UnknownTimeframe: {value} (expected daily, weekly or monthly)")]
pub struct ParseTimeframeError {
    pub value: String,
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Timeframe::Daily),
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            _ => Err(ParseTimeframeError {
                value: s.to_string(),
            }),
        }
    }
}

pub struct GitHubTrendingResult {
    pub body: String,
    pub status: StatusCode,
}

/// Builds the listing URL, e.g. `https://github.com/trending?since=weekly`.
pub fn trending_url(base_url: &str, since: Option<Timeframe>) -> String {
    let base_url = base_url.trim_end_matches('/');
    match since {
        Some(timeframe) => format!(
            "{base_url}{TRENDING_PATH}?since={}",
            timeframe.as_query_value()
        ),
        None => format!("{base_url}{TRENDING_PATH}"),
    }
}

pub async fn fetch_trending_page(
    client: &Client,
    base_url: &str,
    since: Option<Timeframe>,
) -> Result<GitHubTrendingResult, FetchTrendingPageError> {
    let response = client
        .get(trending_url(base_url, since))
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Accept", "text/html")
        .send()
        .await
        .map_err(|source| FetchTrendingPageError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchTrendingPageError::ResponseRead { source })?;

    Ok(GitHubTrendingResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchTrendingPageError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
