//! Error taxonomy shared by the loader, resolver, and renderer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("input file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {} (line {line}): {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unknown algorithm name: {0} (expected one of Gauss2, Gauss3, Radau2, Radau3)")]
    UnknownAlgorithm(String),

    #[error("No RC data files found (rc_explicit.txt, ...) in {}. Run test_rc first.", dir.display())]
    NoData { dir: PathBuf },

    #[error("failed to render chart \"{title}\": {reason}")]
    Render { title: String, reason: String },

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlotError {
    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        PlotError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlotError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
