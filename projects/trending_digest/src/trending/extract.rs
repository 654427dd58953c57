use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::repository::{
    RepositoryRecord, GITHUB_URL, NO_DESCRIPTION, NO_STARS, UNKNOWN_LANGUAGE,
};

const ENTRY_SELECTOR: &str = "article.Box-row";
const LINK_SELECTOR: &str = "h2 a";
const DESCRIPTION_SELECTOR: &str = "p";
const LANGUAGE_SELECTOR: &str = "span[itemprop='programmingLanguage']";
const STARS_SELECTOR: &str = "a.Link--muted";

#[derive(Debug, Error)]
pub enum ExtractorInitError {
    #[error("InvalidSelector {selector}: {message}")]
    InvalidSelector {
        selector: &'static str,
        message: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractEntryError {
    #[error("MissingLink: no `h2 a` element")]
    MissingLink,

    #[error("MissingHref: repository link has no href")]
    MissingHref,

    #[error("EmptyIdentifier: href {href:?} names no repository")]
    EmptyIdentifier {
        href: String,
    },
}

/// Turns a trending page into records, one per `article.Box-row`.
pub struct RepositoryExtractor {
    entry: Selector,
    link: Selector,
    description: Selector,
    language: Selector,
    stars: Selector,
}

impl RepositoryExtractor {
    pub fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self {
            entry: parse_selector(ENTRY_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            description: parse_selector(DESCRIPTION_SELECTOR)?,
            language: parse_selector(LANGUAGE_SELECTOR)?,
            stars: parse_selector(STARS_SELECTOR)?,
        })
    }

    /// Extracts every well-formed entry in page order. Entries that cannot be
    /// identified are logged and skipped; the rest are unaffected.
    pub fn extract(&self, markup: &str, seen_at: NaiveDateTime) -> Vec<RepositoryRecord> {
        let document = Html::parse_document(markup);
        let mut records = Vec::new();

        for (position, entry) in document.select(&self.entry).enumerate() {
            match self.extract_entry(entry, seen_at) {
                Ok(record) => records.push(record),
                Err(err) => warn!(rank = position + 1, "Skipping trending entry: {err}"),
            }
        }

        debug!("Extracted {} repositories from trending page", records.len());
        records
    }

    pub fn extract_entry(
        &self,
        entry: ElementRef<'_>,
        seen_at: NaiveDateTime,
    ) -> Result<RepositoryRecord, ExtractEntryError> {
        let link = entry
            .select(&self.link)
            .next()
            .ok_or(ExtractEntryError::MissingLink)?;
        let href = link
            .value()
            .attr("href")
            .ok_or(ExtractEntryError::MissingHref)?;

        let repo = identifier_from_href(href);
        if repo.is_empty() {
            return Err(ExtractEntryError::EmptyIdentifier {
                href: href.to_string(),
            });
        }

        let mut record = RepositoryRecord::new(repo, seen_at);
        record.description = self
            .first_text(entry, &self.description)
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        record.language = self
            .first_text(entry, &self.language)
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        record.stars = self
            .first_text(entry, &self.stars)
            .unwrap_or_else(|| NO_STARS.to_string());

        Ok(record)
    }

    fn first_text(&self, entry: ElementRef<'_>, selector: &Selector) -> Option<String> {
        let element = entry.select(selector).next()?;
        let text = collapse_whitespace(&element.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }
}

fn parse_selector(selector: &'static str) -> Result<Selector, ExtractorInitError> {
    Selector::parse(selector).map_err(|err| ExtractorInitError::InvalidSelector {
        selector,
        message: err.to_string(),
    })
}

/// `/owner/name` (or an absolute github.com URL) to `owner/name`.
fn identifier_from_href(href: &str) -> &str {
    href.trim()
        .strip_prefix(GITHUB_URL)
        .unwrap_or(href.trim())
        .trim_matches('/')
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
