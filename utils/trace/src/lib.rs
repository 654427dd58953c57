use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Where and how verbosely the process logs.
///
/// `RUST_LOG` always wins over `level` when it is set and valid.
#[derive(Debug, Clone, Default)]
pub struct TraceConfig {
    pub level: String,
    pub log_file: Option<PathBuf>,
}

impl TraceConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            log_file: None,
        }
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Installs the global subscriber: compact stdout output plus an optional
/// plain-text file sink. Must be called once, before anything logs.
pub fn init(config: &TraceConfig) -> Result<(), TracingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|source| TracingInitError::InvalidFilter { source })?;

    let file_layer = match config.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| TracingInitError::SetGlobalDefault { source })?;

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, TracingInitError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| TracingInitError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TracingInitError::OpenLogFile {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("InvalidFilter: {source}")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("OpenLogFile {}: {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("SetGlobalDefault: {source}")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}
