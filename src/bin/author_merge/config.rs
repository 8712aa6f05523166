//! Configuration for `AuthorMerge`.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use ebook_tools::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SUGGESTION_LOG};

use crate::Args;

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorMergeConfig {
    #[serde(default)]
    root: Option<PathBuf>,
    #[serde(default)]
    log: Option<PathBuf>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    authormerge: AuthorMergeConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) root: PathBuf,
    pub(crate) log: PathBuf,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
}

impl AuthorMergeConfig {
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
            .map(|config| config.authormerge)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: Args) -> Result<Self> {
        let user_config = AuthorMergeConfig::get_user_config()?;
        let base = ebook_tools::current_dir()?;
        Ok(Self::from_parts(args, user_config, &base))
    }

    /// Combine CLI arguments with the user config, resolving relative paths against `base`.
    fn from_parts(args: Args, user_config: AuthorMergeConfig, base: &Path) -> Self {
        let root = args
            .root
            .or(user_config.root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let log = args
            .log
            .or(user_config.log)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUGGESTION_LOG));

        Self {
            root: ebook_tools::resolve_path(base, &root),
            log: ebook_tools::resolve_path(base, &log),
            dryrun: args.print || user_config.dryrun,
            verbose: args.verbose || user_config.verbose,
        }
    }
}
