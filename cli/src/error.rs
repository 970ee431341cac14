use std::path::PathBuf;

use thiserror::Error;

/// Failures outside the template itself: unreadable files and bad configuration.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown syntax '{0}' (expected latte, double, asp, python or off)")]
    UnknownSyntax(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
