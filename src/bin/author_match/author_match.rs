use std::time::Instant;

use ebook_tools::suggest::{MergeCandidate, SuggestEvent, generate_suggestions};
use ebook_tools::{print_bold, print_error};

use crate::Args;
use crate::config::Config;

pub struct AuthorMatch {
    config: Config,
}

impl AuthorMatch {
    pub fn new(args: Args) -> anyhow::Result<Self> {
        let config = Config::from_args(args)?;
        Ok(Self { config })
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let candidates = self.find()?;
        if candidates.is_empty() {
            println!("No similar author folders found");
        } else {
            print_bold!(
                "{} merge suggestions written to {}",
                candidates.len(),
                self.config.log.display()
            );
        }
        Ok(())
    }

    /// Compare author folders and write the suggestion log.
    fn find(&self) -> anyhow::Result<Vec<MergeCandidate>> {
        let root = &self.config.root;
        if !root.is_dir() {
            anyhow::bail!("Root directory does not exist: {}", root.display());
        }
        if self.config.verbose {
            print_bold!(
                "Comparing author folders in {} (threshold {}, content match: {})",
                root.display(),
                self.config.options.threshold,
                ebook_tools::colorize_bool(self.config.options.require_content_match)
            );
        }

        let start = Instant::now();
        let candidates = generate_suggestions(root, &self.config.log, self.config.options, |event| match event {
            SuggestEvent::Suggested(candidate) => println!("{candidate}"),
            SuggestEvent::CompareFailed { candidate, error } => {
                print_error!(
                    "Could not compare \"{}\" and \"{}\": {error}",
                    candidate.target,
                    candidate.source
                );
            }
        })?;

        if self.config.verbose {
            println!("Finished in {}", ebook_tools::format_duration(start.elapsed()));
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use ebook_tools::suggest::SuggestOptions;

    use super::*;

    fn author_match(root: &Path, options: SuggestOptions) -> AuthorMatch {
        AuthorMatch {
            config: Config {
                root: root.join("ordenados"),
                log: root.join("sugerencias_fusion.txt"),
                options,
                verbose: false,
            },
        }
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(author_match(dir.path(), SuggestOptions::default()).find().is_err());
        assert!(!dir.path().join("sugerencias_fusion.txt").exists());
    }

    #[test]
    fn writes_suggestions_for_similar_folders() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("ordenados");
        for name in ["Garcia Marquez, Gabriel", "García Márquez, Gabriel", "Borges, Jorge Luis"] {
            fs::create_dir_all(root.join(name)).expect("create folder");
        }

        let candidates = author_match(dir.path(), SuggestOptions::default())
            .find()
            .expect("should succeed");
        assert_eq!(
            candidates,
            vec![MergeCandidate::new("Garcia Marquez, Gabriel", "García Márquez, Gabriel")]
        );

        let log = fs::read_to_string(dir.path().join("sugerencias_fusion.txt")).expect("read log");
        assert_eq!(
            log,
            "\"Garcia Marquez, Gabriel\" puede fusionarse con \"García Márquez, Gabriel\"\n"
        );
    }

    #[test]
    fn writes_empty_log_when_nothing_matches() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("ordenados");
        fs::create_dir_all(root.join("Austen, Jane")).expect("create folder");
        fs::create_dir_all(root.join("Tolstoy, Leo")).expect("create folder");
        fs::write(dir.path().join("sugerencias_fusion.txt"), "old content\n").expect("write log");

        let candidates = author_match(dir.path(), SuggestOptions::default())
            .find()
            .expect("should succeed");
        assert!(candidates.is_empty());
        let log = fs::read_to_string(dir.path().join("sugerencias_fusion.txt")).expect("read log");
        assert!(log.is_empty());
    }
}
