use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(not(test))]
use indicatif::ProgressStyle;
use indicatif::ProgressBar;

use ebook_tools::ingest::{BookSorter, IngestEvent, IngestOptions, IngestStats, collect_books};
use ebook_tools::logger::ErrorLog;
use ebook_tools::metadata::EpubExtractor;
use ebook_tools::{print_bold, print_error, print_warning};

use crate::Args;
use crate::config::Config;

#[cfg(not(test))]
const PROGRESS_BAR_CHARS: &str = "=>-";
#[cfg(not(test))]
const PROGRESS_BAR_TEMPLATE: &str = "[{elapsed_precise}] {bar:80.magenta/blue} {pos}/{len} {percent}%";

pub struct BookSort {
    config: Config,
}

impl BookSort {
    pub fn new(args: Args) -> anyhow::Result<Self> {
        let config = Config::from_args(args)?;
        Ok(Self { config })
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let stats = self.sort()?;
        if stats.limit_reached {
            print_bold!("Stopped after {} books", stats.processed);
        }
        println!("{stats}");
        Ok(())
    }

    /// Sort all books from the input directory into the output directory.
    fn sort(&self) -> anyhow::Result<IngestStats> {
        let input = &self.config.input;
        if !input.is_dir() {
            anyhow::bail!("Input directory does not exist: {}", input.display());
        }

        let start = Instant::now();
        let books = collect_books(input, Some(&self.config.output));
        if books.is_empty() {
            println!("No books found in {}", input.display());
            return Ok(IngestStats::default());
        }
        if self.config.verbose {
            print_bold!("Sorting {} books from {}", books.len(), input.display());
        }

        let sorter = BookSorter::new(
            EpubExtractor,
            &self.config.output,
            ErrorLog::new(&self.config.error_log),
            IngestOptions {
                limit: self.config.limit,
                dryrun: self.config.dryrun,
            },
        );

        let progress_bar = Self::progress_bar(books.len());
        let stats = sorter.run(&books, |event| {
            if matches!(
                event,
                IngestEvent::Moved(_)
                    | IngestEvent::WouldMove(_)
                    | IngestEvent::Duplicate(_)
                    | IngestEvent::Failed { .. }
            ) {
                progress_bar.inc(1);
            }
            progress_bar.suspend(|| self.report(&event));
        })?;
        progress_bar.finish_and_clear();

        if self.config.verbose {
            println!("Finished in {}", ebook_tools::format_duration(start.elapsed()));
        }
        if stats.failed > 0 && !self.config.dryrun {
            print_warning!("Failures were logged to {}", self.config.error_log.display());
        }
        Ok(stats)
    }

    fn report(&self, event: &IngestEvent) {
        match event {
            IngestEvent::Moved(record) => {
                if self.config.verbose {
                    ebook_tools::show_diff(
                        &relative_display(&record.source, &self.config.input),
                        &relative_display(&record.target, &self.config.output),
                    );
                }
            }
            IngestEvent::WouldMove(record) => {
                print_bold!("Would move:");
                ebook_tools::show_diff(
                    &relative_display(&record.source, &self.config.input),
                    &relative_display(&record.target, &self.config.output),
                );
            }
            IngestEvent::Duplicate(record) => {
                print_warning!(
                    "Duplicate skipped: {}",
                    relative_display(&record.source, &self.config.input)
                );
            }
            IngestEvent::Failed { source, error } => {
                print_error!("{}: {error}", relative_display(source, &self.config.input));
            }
            IngestEvent::ErrorLogFailed(error) => {
                print_error!("Could not write error log: {error}");
            }
            IngestEvent::LimitReached(limit) => {
                if self.config.verbose {
                    print_bold!("Reached limit of {limit} books");
                }
            }
        }
    }

    #[cfg(test)]
    fn progress_bar(_len: usize) -> ProgressBar {
        ProgressBar::hidden()
    }

    #[cfg(not(test))]
    fn progress_bar(len: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .expect("Failed to set progress bar template")
                .progress_chars(PROGRESS_BAR_CHARS),
        );
        progress_bar
    }
}

/// Path relative to `base` for display, or the full path if it is outside `base`.
fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map_or_else(|_| PathBuf::from(path), Path::to_path_buf)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn book_sort(root: &Path, dryrun: bool) -> BookSort {
        BookSort {
            config: Config {
                input: root.join("aordenar"),
                output: root.join("ordenados"),
                error_log: root.join("errores.txt"),
                limit: None,
                dryrun,
                verbose: false,
            },
        }
    }

    #[test]
    fn relative_display_strips_base() {
        assert_eq!(
            relative_display(Path::new("/library/in/sub/book.epub"), Path::new("/library/in")),
            PathBuf::from("sub/book.epub").display().to_string()
        );
    }

    #[test]
    fn relative_display_keeps_outside_paths() {
        assert_eq!(
            relative_display(Path::new("/other/book.epub"), Path::new("/library/in")),
            PathBuf::from("/other/book.epub").display().to_string()
        );
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let root = tempdir().expect("tempdir");
        assert!(book_sort(root.path(), false).sort().is_err());
    }

    #[test]
    fn empty_input_directory_does_nothing() {
        let root = tempdir().expect("tempdir");
        fs::create_dir(root.path().join("aordenar")).expect("create input");
        let stats = book_sort(root.path(), false).sort().expect("should succeed");
        assert_eq!(stats, IngestStats::default());
        assert!(!root.path().join("ordenados").exists());
    }

    #[test]
    fn unreadable_books_are_logged() {
        let root = tempdir().expect("tempdir");
        let input = root.path().join("aordenar");
        fs::create_dir(&input).expect("create input");
        fs::write(input.join("broken.epub"), b"not a zip").expect("write book");

        let stats = book_sort(root.path(), false).sort().expect("should succeed");
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processed, 0);
        assert!(input.join("broken.epub").exists());

        let log = fs::read_to_string(root.path().join("errores.txt")).expect("read log");
        assert!(log.contains("broken.epub"));
    }

    #[test]
    fn dryrun_does_not_write_error_log() {
        let root = tempdir().expect("tempdir");
        let input = root.path().join("aordenar");
        fs::create_dir(&input).expect("create input");
        fs::write(input.join("broken.epub"), b"not a zip").expect("write book");

        let stats = book_sort(root.path(), true).sort().expect("should succeed");
        assert_eq!(stats.failed, 1);
        assert!(!root.path().join("errores.txt").exists());
        assert!(!root.path().join("ordenados").exists());
    }
}
