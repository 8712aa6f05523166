//! Append-only error log for books that could not be sorted.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path_to_filename_string;

/// Append-only log of per-book ingest failures.
///
/// The file is opened for every entry so it is only created once something fails,
/// and earlier runs are never truncated.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format one log line: `Error en {dir}/{file}: {message}`.
    #[must_use]
    pub fn format_entry(source: &Path, message: &str) -> String {
        let dir = source.parent().unwrap_or_else(|| Path::new(""));
        format!(
            "Error en {}/{}: {message}",
            dir.display(),
            path_to_filename_string(source)
        )
    }

    /// Append a failure for `source` to the log file.
    ///
    /// # Errors
    /// Returns an error if the log file cannot be opened or written.
    pub fn record(&self, source: &Path, message: &str) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io_path("open error log", &self.path, e))?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", Self::format_entry(source, message))
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io_path("write error log", &self.path, e))
    }
}
