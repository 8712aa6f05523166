//! Exact content comparison of two author folders.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::hash::{Digest, hash_file};
use crate::{BOOK_EXTENSION, path_to_file_extension_string, path_to_filename_string};

/// Map each book file directly inside `dir` to its content digest.
///
/// # Errors
/// Returns an error if the directory cannot be listed or a file cannot be hashed.
pub fn folder_digests(dir: &Path) -> Result<BTreeMap<String, Digest>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io_path("list", dir, e))?;
    let mut digests = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io_path("list", dir, e))?;
        let path = entry.path();
        if path.is_file() && path_to_file_extension_string(&path) == BOOK_EXTENSION {
            digests.insert(path_to_filename_string(&path), hash_file(&path)?);
        }
    }
    Ok(digests)
}

/// Check if two folders hold exactly the same books:
/// the same file names, each with the same content.
///
/// # Errors
/// Returns an error if either folder cannot be read.
pub fn folders_identical(a: &Path, b: &Path) -> Result<bool> {
    Ok(folder_digests(a)? == folder_digests(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::{TempDir, tempdir};

    fn make_folder(root: &TempDir, name: &str, files: &[(&str, &str)]) -> std::path::PathBuf {
        let dir = root.path().join(name);
        fs::create_dir(&dir).expect("create dir");
        for (file, content) in files {
            fs::write(dir.join(file), content).expect("write");
        }
        dir
    }

    #[test]
    fn same_names_and_content_are_identical() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[("one.epub", "1"), ("two.epub", "2")]);
        let b = make_folder(&root, "b", &[("two.epub", "2"), ("one.epub", "1")]);
        assert!(folders_identical(&a, &b).expect("compare"));
    }

    #[test]
    fn same_content_under_different_names_is_not_identical() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[("one.epub", "1")]);
        let b = make_folder(&root, "b", &[("renamed.epub", "1")]);
        assert!(!folders_identical(&a, &b).expect("compare"));
    }

    #[test]
    fn same_names_with_different_content_is_not_identical() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[("one.epub", "1")]);
        let b = make_folder(&root, "b", &[("one.epub", "changed")]);
        assert!(!folders_identical(&a, &b).expect("compare"));
    }

    #[test]
    fn extra_file_is_not_identical() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[("one.epub", "1")]);
        let b = make_folder(&root, "b", &[("one.epub", "1"), ("two.epub", "2")]);
        assert!(!folders_identical(&a, &b).expect("compare"));
    }

    #[test]
    fn other_file_types_are_ignored() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[("one.epub", "1"), ("cover.jpg", "x")]);
        let b = make_folder(&root, "b", &[("one.EPUB", "1"), ("notes.txt", "y")]);
        // Names differ by extension case, so the maps differ
        assert!(!folders_identical(&a, &b).expect("compare"));

        let c = make_folder(&root, "c", &[("one.epub", "1"), ("notes.txt", "y")]);
        assert!(folders_identical(&a, &c).expect("compare"));
    }

    #[test]
    fn empty_folders_are_identical() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[]);
        let b = make_folder(&root, "b", &[]);
        assert!(folders_identical(&a, &b).expect("compare"));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let root = tempdir().expect("tempdir");
        let a = make_folder(&root, "a", &[]);
        assert!(folders_identical(&a, &root.path().join("missing")).is_err());
    }
}
