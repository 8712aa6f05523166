use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced by the library pipeline.
///
/// Every variant carries enough context to locate the offending file or folder by hand.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing author or title, or an unreadable e-book container.
    #[error("{0}")]
    Metadata(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The source folder still had entries after all of them were moved.
    #[error("Folder is not empty after merge: {}", .0.display())]
    MergeConflict(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn io_path(action: &str, path: &Path, source: io::Error) -> Self {
        Self::io(format!("Failed to {action} {}", path.display()), source)
    }

    pub(crate) fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata(message.into())
    }
}
