use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use interfaces_github_trending::index::Timeframe;
use projects_trending_digest::{
    config::{load_dotenv, Config, ConfigError},
    history::{
        store::DEFAULT_SNAPSHOT_FILE, HistoryStore, JsonHistoryStore, SnapshotHistoryStore,
    },
    notify::{
        deliver::MissingCredentialError, format::DEFAULT_MAX_RECORDS, BatchLimits, LogSender,
        MessageSender, TelegramSender,
    },
    run::{Pipeline, RunError, RunOptions},
    trending::{ExtractorInitError, GitHubPageFetcher, RepositoryExtractor},
};
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};
use utils_trace::{init as tracing_init, TraceConfig};

/// Posts newly trending GitHub repositories to a Telegram chat.
#[derive(Parser)]
#[command(name = "trending_digest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Trending window: daily, weekly or monthly. Defaults to GitHub's listing.
    #[arg(long)]
    since: Option<Timeframe>,

    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Ignore history and report every repository on the page.
    #[arg(long)]
    snapshot: bool,

    /// With --snapshot, where to write this run's repositories.
    #[arg(
        long,
        requires = "snapshot",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SNAPSHOT_FILE
    )]
    snapshot_file: Option<PathBuf>,

    /// Log messages instead of sending them to Telegram. History is still
    /// updated unless --snapshot is also given.
    #[arg(long)]
    dry_run: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    max_per_message: usize,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Config: {source}")]
    Config {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("TelegramCredentials: {source}")]
    TelegramCredentials {
        #[source]
        source: MissingCredentialError,
    },
    #[error("ExtractorInit: {source}")]
    ExtractorInit {
        #[source]
        source: ExtractorInitError,
    },
    #[error("Run: {source}")]
    Run {
        #[source]
        source: RunError,
    },
    #[error("Delivery: {failed} of {total} messages failed")]
    Delivery {
        failed: usize,
        total: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), MainError> {
    let cli = Cli::parse();

    let dotenv_path = load_dotenv().map_err(|source| MainError::Config { source })?;
    let mut config = Config::from_env().map_err(|source| MainError::Config { source })?;
    apply_cli(&mut config, &cli);

    let mut trace = TraceConfig::new(config.log_level.clone());
    if let Some(log_file) = &config.log_file {
        trace = trace.with_log_file(log_file);
    }
    tracing_init(&trace).map_err(|source| MainError::TracingInit { source })?;

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let client = Client::new();

    let sender: Box<dyn MessageSender> = if cli.dry_run {
        Box::new(LogSender)
    } else {
        let telegram = TelegramSender::new(
            client.clone(),
            config.telegram_token.clone(),
            config.telegram_chat_id.clone(),
        )
        .map_err(|source| MainError::TelegramCredentials { source })?;
        Box::new(telegram)
    };

    let store: Box<dyn HistoryStore> = if cli.snapshot {
        Box::new(SnapshotHistoryStore::new(cli.snapshot_file.clone()))
    } else {
        Box::new(JsonHistoryStore::new(config.history_file.clone()))
    };

    let extractor =
        RepositoryExtractor::new().map_err(|source| MainError::ExtractorInit { source })?;
    let fetcher = GitHubPageFetcher::new(client);

    let pipeline = Pipeline {
        fetcher: &fetcher,
        extractor: &extractor,
        store: store.as_ref(),
        sender: sender.as_ref(),
    };
    let options = RunOptions {
        since: config.since,
        limits: BatchLimits {
            max_records: cli.max_per_message,
            ..BatchLimits::default()
        },
    };

    let summary = pipeline
        .run_once(&options, Local::now().naive_local())
        .await
        .map_err(|source| MainError::Run { source })?;

    let delivery = summary.delivery;
    if !delivery.success() {
        error!("Failed to send update to Telegram");
        return Err(MainError::Delivery {
            failed: delivery.failed,
            total: delivery.sent + delivery.failed,
        });
    }

    info!("Sent update to Telegram");
    Ok(())
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if cli.since.is_some() {
        config.since = cli.since;
    }
    if let Some(path) = &cli.history_file {
        config.history_file = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
}
