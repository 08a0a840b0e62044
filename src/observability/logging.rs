//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Route log output to stdout, stderr, a file, or nowhere
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Files are opened in append mode and shared behind a mutex

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    Discard,
    File(PathBuf),
}

impl LogOutput {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            "" => LogOutput::Discard,
            path => LogOutput::File(PathBuf::from(path)),
        }
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, LoggingError> {
        let writer = match self {
            LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
            LogOutput::Discard => BoxMakeWriter::new(io::sink),
            LogOutput::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LoggingError::OpenFile {
                        path: path.clone(),
                        source,
                    })?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        };
        Ok(writer)
    }
}

/// Default filter directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("txt_redirect={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let output = LogOutput::parse(&config.log_output);
    let ansi = matches!(output, LogOutput::Stdout | LogOutput::Stderr);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(output.make_writer()?)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
