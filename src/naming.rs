//! Author folder and book file naming.

use std::path::{Component, Path, PathBuf};

use crate::insert_suffix_before_extension;

/// Suffix inserted before the extension when a destination name is already taken.
pub const DUPLICATE_SUFFIX: &str = "_duplicado";

/// Format an author name as "Surname, Given names".
///
/// The last whitespace-separated token is the surname.
/// Single-token names are returned unchanged.
///
/// ```rust
/// use ebook_tools::naming::format_author;
///
/// assert_eq!(format_author("Jane Q. Public"), "Public, Jane Q.");
/// assert_eq!(format_author("Homer"), "Homer");
/// ```
#[must_use]
pub fn format_author(author: &str) -> String {
    let parts: Vec<&str> = author.split_whitespace().collect();
    match parts.split_last() {
        Some((surname, given)) if !given.is_empty() => format!("{surname}, {}", given.join(" ")),
        _ => author.trim().to_string(),
    }
}

/// Replace path separators so the value can be used as a single path component.
#[must_use]
pub fn sanitize_component(value: &str) -> String {
    value.replace(['/', '\\'], "-")
}

/// Check that `name` is exactly one normal path component,
/// so joining it onto a directory always stays directly inside that directory.
///
/// ```rust
/// use ebook_tools::naming::is_single_component;
///
/// assert!(is_single_component("Public, Jane Q."));
/// assert!(!is_single_component(".."));
/// assert!(!is_single_component("a/b"));
/// ```
#[must_use]
pub fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(component)), None) if component == name
    )
}

/// Build the book file name: `"{author} - {title} ({year}).{extension}"`.
///
/// The year part is left out when there is no year.
#[must_use]
pub fn book_file_name(author: &str, title: &str, year: Option<&str>, extension: &str) -> String {
    let name = year.map_or_else(
        || format!("{author} - {title}"),
        |year| format!("{author} - {title} ({year})"),
    );
    format!("{}.{extension}", sanitize_component(&name))
}

/// Return `path` if it is free, otherwise the first free variant with a duplicate suffix:
/// `name_duplicado.ext`, then `name_duplicado_2.ext`, `name_duplicado_3.ext` and so on.
#[must_use]
pub fn available_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let mut candidate = insert_suffix_before_extension(path, DUPLICATE_SUFFIX);
    let mut counter = 2;
    while candidate.exists() {
        candidate = insert_suffix_before_extension(path, &format!("{DUPLICATE_SUFFIX}_{counter}"));
        counter += 1;
    }
    candidate
}
