//! One pass of the digest: fetch, extract, diff, persist, notify.

use chrono::NaiveDateTime;
use interfaces_github_trending::index::Timeframe;
use thiserror::Error;
use tracing::{info, warn};

use crate::history::{diff_against_history, HistoryStore, SaveHistoryError};
use crate::notify::{deliver_all, format_messages, BatchLimits, DeliveryReport, MessageSender};
use crate::trending::{PageFetcher, RepositoryExtractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub since: Option<Timeframe>,
    pub limits: BatchLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub new: usize,
    pub tracked: usize,
    pub delivery: DeliveryReport,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("SaveHistory: {source}")]
    SaveHistory {
        #[from]
        source: SaveHistoryError,
    },
}

pub struct Pipeline<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub extractor: &'a RepositoryExtractor,
    pub store: &'a dyn HistoryStore,
    pub sender: &'a dyn MessageSender,
}

impl Pipeline<'_> {
    /// Runs the digest once. `now` stamps newly discovered repositories and
    /// dates the message header.
    ///
    /// A failed fetch is not an error: the run reports no new repositories.
    /// History is only rewritten when something new was found, and a failed
    /// save stops the run before anything is sent.
    pub async fn run_once(
        &self,
        options: &RunOptions,
        now: NaiveDateTime,
    ) -> Result<RunSummary, RunError> {
        let mut history = self.store.load();

        let current = match self.fetcher.fetch(options.since).await {
            Some(markup) => self.extractor.extract(&markup, now),
            None => {
                warn!("Failed to retrieve trending repositories, continuing with none");
                Vec::new()
            }
        };
        let fetched = current.len();
        info!("Found {fetched} trending repositories");

        let new_records = diff_against_history(current, &mut history);
        info!("Found {} new trending repositories", new_records.len());

        if !new_records.is_empty() {
            self.store.save(&history)?;
        }

        let messages = format_messages(&new_records, now.date(), options.limits);
        let delivery = deliver_all(self.sender, messages).await;

        info!("Total repositories tracked: {}", history.len());

        Ok(RunSummary {
            fetched,
            new: new_records.len(),
            tracked: history.len(),
            delivery,
        })
    }
}
