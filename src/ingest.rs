//! Sort incoming books into author folders, skipping exact duplicates.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::{Digest, hash_file};
use crate::logger::ErrorLog;
use crate::metadata::MetadataExtractor;
use crate::naming::{available_path, book_file_name, format_author, is_single_component, sanitize_component};
use crate::{BOOK_EXTENSION, is_hidden, path_to_file_extension_string};

/// Options for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Stop after this many books have been moved.
    pub limit: Option<usize>,
    /// Only report what would be done.
    pub dryrun: bool,
}

/// Everything needed to decide what to do with one source book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Author formatted as "Surname, Given names".
    pub author: String,
    pub title: String,
    pub year: Option<String>,
    pub source: PathBuf,
    pub digest: Digest,
    /// Destination inside the author folder.
    pub target: PathBuf,
}

/// Events reported during an ingest run.
#[derive(Debug)]
pub enum IngestEvent<'a> {
    Moved(&'a BookRecord),
    /// Dry-run: the book would have been moved.
    WouldMove(&'a BookRecord),
    /// Same content was already sorted during this run. The file is left in place.
    Duplicate(&'a BookRecord),
    Failed {
        source: &'a Path,
        error: Error,
    },
    /// A failure could not be written to the error log.
    ErrorLogFailed(Error),
    /// The item limit was reached and the run stopped.
    LimitReached(usize),
}

/// Counts for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub processed: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub limit_reached: bool,
}

/// Moves books from an input tree into author folders under the organized root.
#[derive(Debug)]
pub struct BookSorter<E> {
    extractor: E,
    output: PathBuf,
    error_log: ErrorLog,
    options: IngestOptions,
}

/// Collect all book files under `input`, sorted by path.
///
/// Hidden entries and the `exclude` directory are skipped.
#[must_use]
pub fn collect_books(input: &Path, exclude: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            (entry.depth() == 0 || !is_hidden(entry)) && exclude.is_none_or(|excluded| entry.path() != excluded)
        })
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path_to_file_extension_string(path) == BOOK_EXTENSION)
        .collect()
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed: {}, duplicates: {}, failed: {}",
            self.processed, self.duplicates, self.failed
        )
    }
}

impl<E: MetadataExtractor> BookSorter<E> {
    pub fn new(extractor: E, output: impl Into<PathBuf>, error_log: ErrorLog, options: IngestOptions) -> Self {
        Self {
            extractor,
            output: output.into(),
            error_log,
            options,
        }
    }

    /// Sort the given books.
    ///
    /// Failures are reported, written to the error log and counted, and never stop the run.
    /// Duplicate detection only covers books seen during this call.
    ///
    /// # Errors
    /// Returns an error only if the organized root cannot be created.
    pub fn run(&self, books: &[PathBuf], mut on_event: impl FnMut(IngestEvent)) -> Result<IngestStats> {
        if !self.options.dryrun {
            fs::create_dir_all(&self.output).map_err(|e| Error::io_path("create", &self.output, e))?;
        }

        let mut seen: HashSet<Digest> = HashSet::new();
        let mut stats = IngestStats::default();

        for source in books {
            if let Some(limit) = self.options.limit
                && stats.processed >= limit
            {
                stats.limit_reached = true;
                on_event(IngestEvent::LimitReached(limit));
                break;
            }

            let record = match self.plan(source) {
                Ok(record) => record,
                Err(error) => {
                    self.fail(source, error, &mut stats, &mut on_event);
                    continue;
                }
            };

            if !seen.insert(record.digest) {
                stats.duplicates += 1;
                on_event(IngestEvent::Duplicate(&record));
                continue;
            }

            if self.options.dryrun {
                stats.processed += 1;
                on_event(IngestEvent::WouldMove(&record));
                continue;
            }

            let digest = record.digest;
            match Self::relocate(record) {
                Ok(record) => {
                    stats.processed += 1;
                    on_event(IngestEvent::Moved(&record));
                }
                Err(error) => {
                    // Content was not sorted, so a later copy may still take its place
                    seen.remove(&digest);
                    self.fail(source, error, &mut stats, &mut on_event);
                }
            }
        }

        Ok(stats)
    }

    /// Read metadata and hash one book, computing its destination without touching the filesystem.
    ///
    /// # Errors
    /// Returns `Metadata` if the author or title is missing and `Io` if the file cannot be read.
    pub fn plan(&self, source: &Path) -> Result<BookRecord> {
        let metadata = self.extractor.extract(source)?;
        let (Some(author), Some(title)) = (metadata.author, metadata.title) else {
            return Err(Error::metadata("Missing metadata (author or title)"));
        };

        let author = sanitize_component(&format_author(&author));
        if !is_single_component(&author) {
            return Err(Error::metadata(format!("Could not format author name: '{author}'")));
        }

        let file_name = book_file_name(&author, &title, metadata.year.as_deref(), BOOK_EXTENSION);
        let target = self.output.join(&author).join(file_name);
        let digest = hash_file(source)?;

        Ok(BookRecord {
            author,
            title,
            year: metadata.year,
            source: source.to_path_buf(),
            digest,
            target,
        })
    }

    /// Move the book into its author folder, creating the folder if needed.
    /// An existing file at the target is never overwritten.
    fn relocate(mut record: BookRecord) -> Result<BookRecord> {
        if let Some(folder) = record.target.parent() {
            fs::create_dir_all(folder).map_err(|e| Error::io_path("create", folder, e))?;
        }
        record.target = available_path(&record.target);
        move_file(&record.source, &record.target)?;
        Ok(record)
    }

    fn fail(&self, source: &Path, error: Error, stats: &mut IngestStats, on_event: &mut impl FnMut(IngestEvent)) {
        stats.failed += 1;
        if !self.options.dryrun
            && let Err(log_error) = self.error_log.record(source, &error.to_string())
        {
            on_event(IngestEvent::ErrorLogFailed(log_error));
        }
        on_event(IngestEvent::Failed { source, error });
    }
}

/// Move a file, falling back to copy and delete when a rename is not possible,
/// for example across filesystems.
fn move_file(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    copy_then_remove(source, target, |path| fs::remove_file(path))
}

/// Copy `source` to `target`, then remove `source` with `remove`.
/// If the source cannot be removed the copy is deleted again, so the book is never in both places.
fn copy_then_remove(source: &Path, target: &Path, remove: impl FnOnce(&Path) -> std::io::Result<()>) -> Result<()> {
    fs::copy(source, target)
        .map_err(|e| Error::io(format!("Failed to move {} to {}", source.display(), target.display()), e))?;
    if let Err(error) = remove(source) {
        // Best effort: the original stays in place either way
        let _ = fs::remove_file(target);
        return Err(Error::io_path("remove", source, error));
    }
    Ok(())
}
