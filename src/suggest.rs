//! Merge suggestions for author folders that look like the same author.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::compare::folders_identical;
use crate::error::{Error, Result};
use crate::similarity::{DEFAULT_CONTENT_THRESHOLD, DEFAULT_NAME_THRESHOLD, is_similar};
use crate::{is_hidden_name, os_str_to_string};

/// Connector phrase used in suggestion log lines.
pub const SUGGESTION_CONNECTOR: &str = "puede fusionarse con";

/// Matches exactly one suggestion line: `"A" puede fusionarse con "B"`.
static RE_SUGGESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"(?P<a>[^"]+)" puede fusionarse con "(?P<b>[^"]+)"$"#).expect("Invalid suggestion regex")
});

/// Two author folders believed to be the same author.
///
/// The second folder is the one that gets merged into the first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MergeCandidate {
    pub target: String,
    pub source: String,
}

/// Options for generating suggestions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestOptions {
    /// Name similarity must be strictly above this value.
    pub threshold: f64,
    /// Also require both folders to hold identical books.
    pub require_content_match: bool,
}

/// Events reported while generating suggestions.
#[derive(Debug)]
pub enum SuggestEvent<'a> {
    Suggested(&'a MergeCandidate),
    /// Folder contents could not be compared, so the pair was not suggested.
    CompareFailed {
        candidate: &'a MergeCandidate,
        error: Error,
    },
}

impl MergeCandidate {
    #[must_use]
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Parse a suggestion log line. Surrounding whitespace is ignored.
    ///
    /// ```rust
    /// use ebook_tools::suggest::MergeCandidate;
    ///
    /// let candidate = MergeCandidate::parse_line(r#""Doe, Jane" puede fusionarse con "Doe, Jane A.""#);
    /// assert_eq!(candidate, Some(MergeCandidate::new("Doe, Jane", "Doe, Jane A.")));
    /// assert_eq!(MergeCandidate::parse_line("Doe, Jane puede fusionarse con Doe, Jane A."), None);
    /// ```
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        RE_SUGGESTION
            .captures(line.trim())
            .map(|captures| Self::new(&captures["a"], &captures["b"]))
    }
}

impl fmt::Display for MergeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {SUGGESTION_CONNECTOR} \"{}\"", self.target, self.source)
    }
}

impl SuggestOptions {
    /// Options with the default threshold for the given mode.
    #[must_use]
    pub const fn new(require_content_match: bool) -> Self {
        Self {
            threshold: if require_content_match {
                DEFAULT_CONTENT_THRESHOLD
            } else {
                DEFAULT_NAME_THRESHOLD
            },
            require_content_match,
        }
    }

    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// List the names of the author folders directly under `root`, sorted.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_author_folders(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root).map_err(|e| Error::io_path("list", root, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io_path("list", root, e))?;
        let name = os_str_to_string(&entry.file_name());
        if entry.path().is_dir() && !is_hidden_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Compare every pair of author folders and collect merge candidates.
///
/// Folder names are sorted first, so the result only depends on the folder set and options.
/// When content matching is required, folders are only hashed for pairs whose names already match.
///
/// # Errors
/// Returns an error if the root directory cannot be listed.
pub fn find_candidates(
    root: &Path,
    options: SuggestOptions,
    mut on_event: impl FnMut(SuggestEvent),
) -> Result<Vec<MergeCandidate>> {
    let names = list_author_folders(root)?;
    let mut candidates = Vec::new();

    for (first, second) in names.iter().tuple_combinations() {
        if !is_similar(first, second, options.threshold) {
            continue;
        }
        let candidate = MergeCandidate::new(first.as_str(), second.as_str());
        if options.require_content_match {
            match folders_identical(&root.join(first), &root.join(second)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    on_event(SuggestEvent::CompareFailed {
                        candidate: &candidate,
                        error,
                    });
                    continue;
                }
            }
        }
        on_event(SuggestEvent::Suggested(&candidate));
        candidates.push(candidate);
    }

    Ok(candidates)
}

/// Overwrite the suggestion log with one line per candidate.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_suggestions(path: &Path, candidates: &[MergeCandidate]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io_path("create suggestion log", path, e))?;
    let mut writer = BufWriter::new(file);
    for candidate in candidates {
        writeln!(writer, "{candidate}").map_err(|e| Error::io_path("write suggestion log", path, e))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io_path("write suggestion log", path, e))
}

/// Generate suggestions for `root` and write them to the log at `log_path`.
///
/// # Errors
/// Returns an error if the root cannot be listed or the log cannot be written.
pub fn generate_suggestions(
    root: &Path,
    log_path: &Path,
    options: SuggestOptions,
    on_event: impl FnMut(SuggestEvent),
) -> Result<Vec<MergeCandidate>> {
    let candidates = find_candidates(root, options, on_event)?;
    write_suggestions(log_path, &candidates)?;
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::{TempDir, tempdir};

    fn make_root(folders: &[&str]) -> TempDir {
        let root = tempdir().expect("tempdir");
        for folder in folders {
            fs::create_dir(root.path().join(folder)).expect("create dir");
        }
        root
    }

    fn collect(root: &Path, options: SuggestOptions) -> Vec<MergeCandidate> {
        find_candidates(root, options, |_| {}).expect("should find candidates")
    }

    #[test]
    fn candidate_display_uses_log_format() {
        let candidate = MergeCandidate::new("García, José", "Garcia, Jose");
        assert_eq!(
            candidate.to_string(),
            r#""García, José" puede fusionarse con "Garcia, Jose""#
        );
    }

    #[test]
    fn parse_line_reads_formatted_candidate() {
        let candidate = MergeCandidate::new("Public, Jane Q.", "Public, Jane");
        assert_eq!(MergeCandidate::parse_line(&candidate.to_string()), Some(candidate));
    }

    #[test]
    fn parse_line_ignores_trailing_newline() {
        let line = "\"A, B\" puede fusionarse con \"A, C\"\r\n";
        assert_eq!(MergeCandidate::parse_line(line), Some(MergeCandidate::new("A, B", "A, C")));
    }

    #[test]
    fn parse_line_rejects_other_text() {
        assert_eq!(MergeCandidate::parse_line(""), None);
        assert_eq!(MergeCandidate::parse_line("\"A\" can merge with \"B\""), None);
        assert_eq!(MergeCandidate::parse_line("\"A\" puede fusionarse con B"), None);
        assert_eq!(MergeCandidate::parse_line("\"\" puede fusionarse con \"B\""), None);
    }

    #[test]
    fn list_author_folders_sorts_and_skips_files() {
        let root = make_root(&["Zola, Émile", "Austen, Jane", ".hidden"]);
        fs::write(root.path().join("notes.txt"), "x").expect("write");
        let names = list_author_folders(root.path()).expect("list");
        assert_eq!(names, vec!["Austen, Jane", "Zola, Émile"]);
    }

    #[test]
    fn similar_names_are_suggested_in_sorted_order() {
        let root = make_root(&["Smith, John", "Garcia, Jose", "Johnson, Mary", "García, José"]);
        let candidates = collect(root.path(), SuggestOptions::default());
        assert_eq!(candidates, vec![MergeCandidate::new("Garcia, Jose", "García, José")]);
    }

    #[test]
    fn output_is_deterministic() {
        let root = make_root(&[
            "Tolkien, J.R.R.",
            "Tolkien, J. R. R.",
            "Garcia, Jose",
            "García, José",
            "Asimov, Isaac",
        ]);
        let first = collect(root.path(), SuggestOptions::default());
        let second = collect(root.path(), SuggestOptions::default());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn content_match_required() {
        let root = make_root(&["Asimov, Isaac", "Asimov, I.", "Asimov, Isaak"]);
        fs::write(root.path().join("Asimov, Isaac/Foundation.epub"), "book").expect("write");
        fs::write(root.path().join("Asimov, I./Foundation.epub"), "book").expect("write");
        fs::write(root.path().join("Asimov, Isaak/Foundation.epub"), "other").expect("write");

        let candidates = collect(root.path(), SuggestOptions::new(true));
        assert_eq!(candidates, vec![MergeCandidate::new("Asimov, I.", "Asimov, Isaac")]);
    }

    #[test]
    fn content_mode_has_lower_default_threshold() {
        let options = SuggestOptions::new(true);
        assert!(options.require_content_match);
        assert!(options.threshold < SuggestOptions::default().threshold);
    }

    #[test]
    fn threshold_is_configurable() {
        let root = make_root(&["Asimov, Isaac", "Asimov, I."]);
        assert!(collect(root.path(), SuggestOptions::default()).is_empty());
        let lenient = SuggestOptions::default().with_threshold(0.7);
        assert_eq!(collect(root.path(), lenient).len(), 1);
    }

    #[test]
    fn events_report_each_suggestion() {
        let root = make_root(&["Garcia, Jose", "García, José"]);
        let mut reported = Vec::new();
        find_candidates(root.path(), SuggestOptions::default(), |event| {
            if let SuggestEvent::Suggested(candidate) = event {
                reported.push(candidate.clone());
            }
        })
        .expect("should find candidates");
        assert_eq!(reported, vec![MergeCandidate::new("Garcia, Jose", "García, José")]);
    }

    #[test]
    fn generate_overwrites_previous_log() {
        let root = make_root(&["Garcia, Jose", "García, José"]);
        let log_dir = tempdir().expect("tempdir");
        let log_path = log_dir.path().join("sugerencias_fusion.txt");
        fs::write(&log_path, "\"Old, One\" puede fusionarse con \"Old, Two\"\n").expect("write");

        let candidates =
            generate_suggestions(root.path(), &log_path, SuggestOptions::default(), |_| {}).expect("generate");

        let content = fs::read_to_string(&log_path).expect("read");
        assert_eq!(content, "\"Garcia, Jose\" puede fusionarse con \"García, José\"\n");
        let parsed: Vec<MergeCandidate> = content.lines().filter_map(MergeCandidate::parse_line).collect();
        assert_eq!(parsed, candidates);
    }

    #[test]
    fn no_candidates_writes_empty_log() {
        let root = make_root(&["Austen, Jane", "Zola, Emile"]);
        let log_dir = tempdir().expect("tempdir");
        let log_path = log_dir.path().join("sugerencias_fusion.txt");
        generate_suggestions(root.path(), &log_path, SuggestOptions::default(), |_| {}).expect("generate");
        assert_eq!(fs::read_to_string(&log_path).expect("read"), "");
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempdir().expect("tempdir");
        let result = find_candidates(&root.path().join("missing"), SuggestOptions::default(), |_| {});
        assert!(result.is_err());
    }
}
