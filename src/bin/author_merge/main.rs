mod author_merge;
mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::author_merge::AuthorMerge;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Merge author folders listed in the suggestion log")]
struct Args {
    /// Organized root directory with one folder per author
    #[arg(value_hint = clap::ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// Suggestion log file to read
    #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath, name = "FILE")]
    log: Option<PathBuf>,

    /// Only print merges without moving files
    #[arg(short, long)]
    print: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        ebook_tools::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        AuthorMerge::new(args)?.run()
    }
}
