//! Bibliographic metadata from EPUB files.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{Error, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Metadata fields used for naming. Any of them may be missing from a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub author: Option<String>,
    pub title: Option<String>,
    /// Four-digit publication year.
    pub year: Option<String>,
}

/// Source of book metadata.
pub trait MetadataExtractor {
    /// Read metadata for the book at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid book.
    fn extract(&self, path: &Path) -> Result<BookMetadata>;
}

/// Reads Dublin Core metadata from the OPF package document inside an EPUB.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Creator,
    Title,
    Date,
}

impl MetadataExtractor for EpubExtractor {
    fn extract(&self, path: &Path) -> Result<BookMetadata> {
        let file = File::open(path).map_err(|e| Error::io_path("open", path, e))?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| Error::metadata(format!("Not a valid EPUB container: {e}")))?;

        let package_path = match read_entry(&mut archive, CONTAINER_PATH) {
            Ok(container) => parse_rootfile_path(&container)?,
            Err(_) => archive
                .file_names()
                .find(|name| name.to_lowercase().ends_with(".opf"))
                .map(str::to_string)
                .ok_or_else(|| Error::metadata("EPUB has no package document"))?,
        };

        let package = read_entry(&mut archive, &package_path)?;
        parse_package(&package)
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::metadata(format!("Missing {name} in EPUB: {e}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| Error::metadata(format!("Failed to read {name} from EPUB: {e}")))?;
    Ok(content)
}

/// Find the `full-path` of the first `rootfile` element in `container.xml`.
fn parse_rootfile_path(container: &str) -> Result<String> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) if element.local_name().as_ref() == b"rootfile" => {
                let attribute = element
                    .try_get_attribute("full-path")
                    .map_err(|e| Error::metadata(format!("Invalid container.xml: {e}")))?;
                if let Some(attribute) = attribute {
                    let value = attribute
                        .unescape_value()
                        .map_err(|e| Error::metadata(format!("Invalid container.xml: {e}")))?;
                    return Ok(value.into_owned());
                }
            }
            Ok(Event::Eof) => return Err(Error::metadata("container.xml has no rootfile")),
            Err(e) => return Err(Error::metadata(format!("Invalid container.xml: {e}"))),
            Ok(_) => {}
        }
    }
}

/// Read creator, title and date from an OPF package document.
///
/// When an element appears more than once the last one wins.
fn parse_package(package: &str) -> Result<BookMetadata> {
    let mut reader = Reader::from_str(package);
    let mut metadata = BookMetadata::default();
    let mut current: Option<Field> = None;
    // Elements opened inside the current field, such as inline markup in a title
    let mut depth = 0_usize;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) if current.is_some() => depth += 1,
            Ok(Event::Start(element)) => {
                current = match element.local_name().as_ref() {
                    b"creator" => Some(Field::Creator),
                    b"title" => Some(Field::Title),
                    b"date" => Some(Field::Date),
                    _ => None,
                };
                text.clear();
            }
            Ok(Event::Text(content)) if current.is_some() => {
                let value = content
                    .unescape()
                    .map_err(|e| Error::metadata(format!("Invalid package document: {e}")))?;
                text.push_str(&value);
            }
            Ok(Event::CData(content)) if current.is_some() => {
                text.push_str(&String::from_utf8_lossy(&content.into_inner()));
            }
            Ok(Event::End(_)) if depth > 0 => depth -= 1,
            Ok(Event::End(_)) => {
                if let Some(field) = current.take() {
                    let value = non_empty(&text);
                    match field {
                        Field::Creator => metadata.author = value,
                        Field::Title => metadata.title = value,
                        Field::Date => metadata.year = value.as_deref().and_then(parse_year),
                    }
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::metadata(format!("Invalid package document: {e}"))),
            Ok(_) => {}
        }
    }

    Ok(metadata)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Year from the first four characters of a date string.
fn parse_year(date: &str) -> Option<String> {
    let year: String = date.chars().take(4).collect();
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}
