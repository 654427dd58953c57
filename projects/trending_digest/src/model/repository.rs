use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const GITHUB_URL: &str = "https://github.com";
pub const NO_DESCRIPTION: &str = "No description";
pub const UNKNOWN_LANGUAGE: &str = "Unknown";
pub const NO_STARS: &str = "0";

/// One trending entry as it looked the first time it was seen.
///
/// Older history files carry no `url`; it is filled in from `repo` by
/// [`RepositoryRecord::fill_derived`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// `owner/name`
    pub repo: String,
    #[serde(default)]
    pub url: String,
    pub description: String,
    pub language: String,
    /// Display text as rendered by GitHub, e.g. `1,234`.
    pub stars: String,
    #[serde(with = "crate::model::timestamp")]
    pub first_seen: NaiveDateTime,
}

impl RepositoryRecord {
    pub fn new(repo: impl Into<String>, first_seen: NaiveDateTime) -> Self {
        let repo = repo.into();
        Self {
            url: repository_url(&repo),
            repo,
            description: NO_DESCRIPTION.to_string(),
            language: UNKNOWN_LANGUAGE.to_string(),
            stars: NO_STARS.to_string(),
            first_seen,
        }
    }

    pub fn fill_derived(&mut self) {
        if self.url.is_empty() {
            self.url = repository_url(&self.repo);
        }
    }
}

pub fn repository_url(repo: &str) -> String {
    format!("{GITHUB_URL}/{repo}")
}

/// Every repository ever seen, keyed by `owner/name`.
pub type History = BTreeMap<String, RepositoryRecord>;
