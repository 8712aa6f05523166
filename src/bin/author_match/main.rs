mod author_match;
mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::author_match::AuthorMatch;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Find author folders that look like the same author and write merge suggestions")]
struct Args {
    /// Organized root directory with one folder per author
    #[arg(value_hint = clap::ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// Suggestion log file to write
    #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath, name = "FILE")]
    log: Option<PathBuf>,

    /// Name similarity threshold between 0 and 1
    #[arg(short, long, name = "VALUE")]
    threshold: Option<f64>,

    /// Only suggest folders that also contain identical books
    #[arg(short, long)]
    content: bool,

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
        AuthorMatch::new(args)?.run()
    }
}
