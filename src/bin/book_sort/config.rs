//! Configuration for `BookSort`.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use ebook_tools::config::{DEFAULT_ERROR_LOG, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};

use crate::Args;

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct BookSortConfig {
    #[serde(default)]
    input: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    error_log: Option<PathBuf>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    booksort: BookSortConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) error_log: PathBuf,
    pub(crate) limit: Option<usize>,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
}

impl BookSortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        ebook_tools::config::read_user_config()?
            .map_or_else(|| Ok(Self::default()), |content| Self::from_toml_str(&content))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.booksort)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: Args) -> Result<Self> {
        let user_config = BookSortConfig::get_user_config()?;
        let base = ebook_tools::current_dir()?;
        Ok(Self::from_parts(args, user_config, &base))
    }

    /// Combine CLI arguments with the user config, resolving relative paths against `base`.
    fn from_parts(args: Args, user_config: BookSortConfig, base: &Path) -> Self {
        let input = args
            .input
            .or(user_config.input)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
        let output = args
            .output
            .or(user_config.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let error_log = args
            .error_log
            .or(user_config.error_log)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ERROR_LOG));

        Self {
            input: ebook_tools::resolve_path(base, &input),
            output: ebook_tools::resolve_path(base, &output),
            error_log: ebook_tools::resolve_path(base, &error_log),
            limit: args.limit.or(user_config.limit),
            dryrun: args.print || user_config.dryrun,
            verbose: args.verbose || user_config.verbose,
        }
    }
}


#[cfg(test)]
mod config_from_args_tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).expect("should parse args")
    }

    #[test]
    fn uses_defaults_relative_to_base() {
        let config = Config::from_parts(parse(&["test"]), BookSortConfig::default(), Path::new("/library"));
        assert_eq!(config.input, Path::new("/library/aordenar"));
        assert_eq!(config.output, Path::new("/library/ordenados"));
        assert_eq!(config.error_log, Path::new("/library/errores.txt"));
        assert!(config.limit.is_none());
        assert!(!config.dryrun);
        assert!(!config.verbose);
    }

    #[test]
    fn cli_overrides_user_config() {
        let user_config = BookSortConfig::from_toml_str(
            "[booksort]\ninput = \"from_config\"\noutput = \"/abs/out\"\nlimit = 10\n",
        )
        .expect("should parse config");
        let config = Config::from_parts(
            parse(&["test", "from_cli", "-n", "3"]),
            user_config,
            Path::new("/library"),
        );
        assert_eq!(config.input, Path::new("/library/from_cli"));
        assert_eq!(config.output, Path::new("/abs/out"));
        assert_eq!(config.limit, Some(3));
    }

    #[test]
    fn user_config_used_when_cli_missing() {
        let user_config =
            BookSortConfig::from_toml_str("[booksort]\nerror_log = \"log/errors.txt\"\nlimit = 10\n")
                .expect("should parse config");
        let config = Config::from_parts(parse(&["test"]), user_config, Path::new("/library"));
        assert_eq!(config.error_log, Path::new("/library/log/errors.txt"));
        assert_eq!(config.limit, Some(10));
    }

    #[test]
    fn flags_are_combined() {
        let user_config =
            BookSortConfig::from_toml_str("[booksort]\nverbose = true\n").expect("should parse config");
        let config = Config::from_parts(parse(&["test", "-p"]), user_config, Path::new("/library"));
        assert!(config.dryrun);
        assert!(config.verbose);
    }
}
