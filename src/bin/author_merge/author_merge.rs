use ebook_tools::merge::{MergeEvent, MergeOptions, MergeStats, merge_from_log};
use ebook_tools::{print_bold, print_error, print_warning};

use crate::Args;
use crate::config::Config;

pub struct AuthorMerge {
    config: Config,
}

impl AuthorMerge {
    pub fn new(args: Args) -> anyhow::Result<Self> {
        let config = Config::from_args(args)?;
        Ok(Self { config })
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let stats = self.merge()?;
        println!("{stats}");
        Ok(())
    }

    /// Merge every valid suggestion from the log.
    fn merge(&self) -> anyhow::Result<MergeStats> {
        let root = &self.config.root;
        if !root.is_dir() {
            anyhow::bail!("Root directory does not exist: {}", root.display());
        }
        if self.config.verbose {
            print_bold!("Merging suggestions from {}", self.config.log.display());
        }

        let options = MergeOptions {
            dryrun: self.config.dryrun,
        };
        let stats = merge_from_log(&self.config.log, root, options, |event| self.report(&event))?;
        Ok(stats)
    }

    fn report(&self, event: &MergeEvent) {
        match event {
            MergeEvent::Merged { candidate, moved } => {
                print_bold!("Merged \"{}\" into \"{}\"", candidate.source, candidate.target);
                for info in moved.iter().filter(|info| self.config.verbose || info.renamed()) {
                    ebook_tools::show_diff(
                        &ebook_tools::path_to_filename_string(&info.source),
                        &ebook_tools::path_to_filename_string(&info.target),
                    );
                }
            }
            MergeEvent::WouldMerge(candidate) => {
                print_bold!("Would merge \"{}\" into \"{}\"", candidate.source, candidate.target);
            }
            MergeEvent::Skipped { line_number, reason } => {
                print_warning!("Line {line_number}: {reason}");
            }
            MergeEvent::Failed { candidate, error } => {
                print_error!(
                    "Failed to merge \"{}\" into \"{}\": {error}",
                    candidate.source,
                    candidate.target
                );
            }
        }
    }
}
