use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the session, store, and logging layers
#[derive(Debug, Error)]
pub enum ZenError {
    /// A required field was empty on an add
    #[error("validation error: {0}")]
    Validation(String),

    /// A stale or invalid list index on remove/toggle
    #[error("index {index} out of range for {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The backing file could not be read, written, or parsed
    #[error("persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistenceCause,
    },

    #[error("logging setup failed: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),
}

#[derive(Debug, Error)]
pub enum PersistenceCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ZenError {
    pub fn persistence<P, E>(path: P, cause: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<PersistenceCause>,
    {
        ZenError::Persistence {
            path: path.into(),
            source: cause.into(),
        }
    }

    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(ZenError::IndexOutOfRange { index, len })
        }
    }
}

pub type Result<T> = std::result::Result<T, ZenError>;
