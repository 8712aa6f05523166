mod book_sort;
mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::book_sort::BookSort;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Sort EPUB files into author folders, skipping exact duplicates")]
struct Args {
    /// Input directory with books to sort
    #[arg(value_hint = clap::ValueHint::DirPath)]
    input: Option<PathBuf>,

    /// Output directory with one folder per author
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Append failures to this file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath, name = "FILE")]
    error_log: Option<PathBuf>,

    /// Stop after sorting this many books
    #[arg(short = 'n', long, name = "COUNT")]
    limit: Option<usize>,

    /// Only print changes without moving files
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
        BookSort::new(args)?.run()
    }
}
