use std::path::PathBuf;
use std::sync::LazyLock;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/ebook-tools.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Default directory with books waiting to be sorted.
pub const DEFAULT_INPUT_DIR: &str = "aordenar";

/// Default organized root with one folder per author.
pub const DEFAULT_OUTPUT_DIR: &str = "ordenados";

/// Default append-only ingest error log.
pub const DEFAULT_ERROR_LOG: &str = "errores.txt";

/// Default merge suggestion log.
pub const DEFAULT_SUGGESTION_LOG: &str = "sugerencias_fusion.txt";

/// Read the user config file contents.
///
/// Returns `Ok(None)` if there is no config file.
///
/// # Errors
/// Returns an error if the config file exists but cannot be read.
pub fn read_user_config() -> anyhow::Result<Option<String>> {
    let Some(path) = CONFIG_PATH.as_deref() else {
        return Ok(None);
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(anyhow::anyhow!(
            "Failed to read config file {}: {error}",
            path.display()
        )),
    }
}

/// Check that a similarity threshold is within `[0, 1]`.
///
/// # Errors
/// Returns an error if the value is out of range.
pub fn validate_threshold(threshold: f64) -> anyhow::Result<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        anyhow::bail!("Similarity threshold must be between 0 and 1, got {threshold}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_uses_package_name() {
        if let Some(path) = CONFIG_PATH.as_deref() {
            assert!(path.ends_with(".config/ebook-tools.toml"));
        }
    }

    #[test]
    fn threshold_range_is_inclusive() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(0.85).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }
}
