//! Configuration for `AuthorMatch`.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use ebook_tools::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SUGGESTION_LOG, validate_threshold};
use ebook_tools::suggest::SuggestOptions;

use crate::Args;

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorMatchConfig {
    #[serde(default)]
    root: Option<PathBuf>,
    #[serde(default)]
    log: Option<PathBuf>,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    content: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    authormatch: AuthorMatchConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) root: PathBuf,
    pub(crate) log: PathBuf,
    pub(crate) options: SuggestOptions,
    pub(crate) verbose: bool,
}

impl AuthorMatchConfig {
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
            .map(|config| config.authormatch)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed,
    /// or if the threshold is out of range.
    pub fn from_args(args: Args) -> Result<Self> {
        let user_config = AuthorMatchConfig::get_user_config()?;
        let base = ebook_tools::current_dir()?;
        Self::from_parts(args, user_config, &base)
    }

    /// Combine CLI arguments with the user config, resolving relative paths against `base`.
    fn from_parts(args: Args, user_config: AuthorMatchConfig, base: &Path) -> Result<Self> {
        let root = args
            .root
            .or(user_config.root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let log = args
            .log
            .or(user_config.log)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUGGESTION_LOG));

        let mut options = SuggestOptions::new(args.content || user_config.content);
        if let Some(threshold) = args.threshold.or(user_config.threshold) {
            options = options.with_threshold(validate_threshold(threshold)?);
        }

        Ok(Self {
            root: ebook_tools::resolve_path(base, &root),
            log: ebook_tools::resolve_path(base, &log),
            options,
            verbose: args.verbose || user_config.verbose,
        })
    }
}


#[cfg(test)]
mod config_from_args_tests {
    use clap::Parser;

    use ebook_tools::similarity::{DEFAULT_CONTENT_THRESHOLD, DEFAULT_NAME_THRESHOLD};

    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).expect("should parse args")
    }

    #[test]
    fn uses_defaults_relative_to_base() {
        let config = Config::from_parts(parse(&["test"]), AuthorMatchConfig::default(), Path::new("/library"))
            .expect("should create config");
        assert_eq!(config.root, Path::new("/library/ordenados"));
        assert_eq!(config.log, Path::new("/library/sugerencias_fusion.txt"));
        assert!(!config.options.require_content_match);
        ebook_tools::assert_f64_eq(config.options.threshold, DEFAULT_NAME_THRESHOLD);
    }

    #[test]
    fn content_mode_uses_its_own_default_threshold() {
        let config = Config::from_parts(parse(&["test", "-c"]), AuthorMatchConfig::default(), Path::new("/library"))
            .expect("should create config");
        assert!(config.options.require_content_match);
        ebook_tools::assert_f64_eq(config.options.threshold, DEFAULT_CONTENT_THRESHOLD);
    }

    #[test]
    fn explicit_threshold_overrides_mode_default() {
        let user_config =
            AuthorMatchConfig::from_toml_str("[authormatch]\nthreshold = 0.6\ncontent = true\n").expect("parse");
        let config = Config::from_parts(parse(&["test"]), user_config, Path::new("/library"))
            .expect("should create config");
        assert!(config.options.require_content_match);
        ebook_tools::assert_f64_eq(config.options.threshold, 0.6);

        let user_config = AuthorMatchConfig::from_toml_str("[authormatch]\nthreshold = 0.6\n").expect("parse");
        let config = Config::from_parts(parse(&["test", "-t", "0.95"]), user_config, Path::new("/library"))
            .expect("should create config");
        ebook_tools::assert_f64_eq(config.options.threshold, 0.95);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let result = Config::from_parts(parse(&["test", "-t", "1.5"]), AuthorMatchConfig::default(), Path::new("/"));
        assert!(result.is_err());
    }
}
