//! Merging author folders listed in the suggestion log.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::naming::{available_path, is_single_component};
use crate::suggest::MergeCandidate;

/// A single moved entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInfo {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Why a suggestion line was not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line is not a suggestion.
    Unparseable(String),
    /// One of the folders does not exist anymore, for example after an earlier merge.
    MissingFolder(PathBuf),
    /// Both names refer to the same folder.
    SameFolder(String),
    /// The name is not a single folder directly under the organized root.
    InvalidName(String),
}

/// Events reported while processing the suggestion log.
#[derive(Debug)]
pub enum MergeEvent<'a> {
    Merged {
        candidate: &'a MergeCandidate,
        moved: &'a [MoveInfo],
    },
    /// Dry-run: the merge would have happened.
    WouldMerge(&'a MergeCandidate),
    Skipped {
        line_number: usize,
        reason: SkipReason,
    },
    Failed {
        candidate: &'a MergeCandidate,
        error: Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Only report what would be merged.
    pub dryrun: bool,
}

/// Counts for one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MoveInfo {
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// True if the entry had to be renamed because the name was taken.
    #[must_use]
    pub fn renamed(&self) -> bool {
        self.source.file_name() != self.target.file_name()
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable(line) => write!(f, "Not a merge suggestion: {line}"),
            Self::MissingFolder(path) => write!(f, "Folder does not exist: {}", path.display()),
            Self::SameFolder(name) => write!(f, "Cannot merge folder with itself: {name}"),
            Self::InvalidName(name) => write!(f, "Not a folder name under the root: {name}"),
        }
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merged: {}, skipped: {}, failed: {}",
            self.merged, self.skipped, self.failed
        )
    }
}

/// Move every entry of `source` into `target` and remove `source`.
///
/// Entries whose name already exists in `target` get a `_duplicado` suffix,
/// so nothing in `target` is overwritten.
///
/// # Errors
/// Returns an IO error if an entry cannot be moved,
/// and `MergeConflict` if `source` is not empty after all entries were moved.
pub fn merge_folders(target: &Path, source: &Path) -> Result<Vec<MoveInfo>> {
    let mut entries = fs::read_dir(source)
        .map_err(|e| Error::io_path("list", source, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io_path("list", source, e))?;
    entries.sort();

    let mut moved = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let destination = available_path(&target.join(name));
        fs::rename(&entry, &destination).map_err(|e| {
            Error::io(
                format!("Failed to move {} to {}", entry.display(), destination.display()),
                e,
            )
        })?;
        moved.push(MoveInfo::new(entry, destination));
    }

    remove_merged_folder(source)?;
    Ok(moved)
}

fn remove_merged_folder(path: &Path) -> Result<()> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(_) if has_entries(path) => Err(Error::MergeConflict(path.to_path_buf())),
        Err(e) => Err(Error::io_path("remove", path, e)),
    }
}

fn has_entries(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Process suggestion log content line by line.
///
/// Both folders are checked right before each merge, so a line referring to a folder
/// that an earlier line already merged away is skipped.
/// A failure on one line never stops the following lines.
pub fn merge_suggestions(
    content: &str,
    root: &Path,
    options: MergeOptions,
    mut on_event: impl FnMut(MergeEvent),
) -> MergeStats {
    let mut stats = MergeStats::default();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some(candidate) = MergeCandidate::parse_line(line) else {
            stats.skipped += 1;
            on_event(MergeEvent::Skipped {
                line_number,
                reason: SkipReason::Unparseable(line.trim().to_string()),
            });
            continue;
        };

        if let Some(reason) = validate(&candidate, root) {
            stats.skipped += 1;
            on_event(MergeEvent::Skipped { line_number, reason });
            continue;
        }

        if options.dryrun {
            stats.merged += 1;
            on_event(MergeEvent::WouldMerge(&candidate));
            continue;
        }

        match merge_folders(&root.join(&candidate.target), &root.join(&candidate.source)) {
            Ok(moved) => {
                stats.merged += 1;
                on_event(MergeEvent::Merged {
                    candidate: &candidate,
                    moved: &moved,
                });
            }
            Err(error) => {
                stats.failed += 1;
                on_event(MergeEvent::Failed {
                    candidate: &candidate,
                    error,
                });
            }
        }
    }

    stats
}

/// Read the suggestion log at `log_path` and merge every valid suggestion under `root`.
///
/// # Errors
/// Returns an error if the log file cannot be read.
pub fn merge_from_log(
    log_path: &Path,
    root: &Path,
    options: MergeOptions,
    on_event: impl FnMut(MergeEvent),
) -> Result<MergeStats> {
    let content = fs::read_to_string(log_path).map_err(|e| Error::io_path("read suggestion log", log_path, e))?;
    Ok(merge_suggestions(&content, root, options, on_event))
}

fn validate(candidate: &MergeCandidate, root: &Path) -> Option<SkipReason> {
    if let Some(name) = [&candidate.target, &candidate.source]
        .into_iter()
        .find(|name| !is_single_component(name))
    {
        return Some(SkipReason::InvalidName(name.clone()));
    }
    if candidate.target == candidate.source {
        return Some(SkipReason::SameFolder(candidate.target.clone()));
    }
    [&candidate.target, &candidate.source]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| !path.is_dir())
        .map(SkipReason::MissingFolder)
}
