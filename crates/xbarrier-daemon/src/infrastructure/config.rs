//! TOML config file holding the insets.
//!
//! Read once at startup with `--config [PATH]`.  Without a path the file is
//! looked up at `$XDG_CONFIG_HOME/xpointerbarrier/config.toml` (falling back
//! to `~/.config/xpointerbarrier/config.toml`).
//!
//! ```toml
//! [insets]
//! top = 30
//! bottom = 48
//! ```
//!
//! Edges that are not named default to zero.  Values go through the same
//! validation as command-line insets, so a negative value is rejected before
//! any barrier is created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xbarrier_core::Insets;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine config directory")]
    NoConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed, or the insets are invalid.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level config file schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub insets: Insets,
}

/// Default location of the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if no base directory can be derived
/// from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("xpointerbarrier").join("config.toml"))
}

/// Parses config file content.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML and for insets that fail
/// validation.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Reads and parses the config file at `path`.
///
/// Unlike optional settings files, a missing file is an error here: the user
/// asked for it explicitly.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if its content is invalid.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_reads_named_edges_and_defaults_the_rest() {
        let cfg = parse_config("[insets]\ntop = 30\nbottom = 48\n").expect("valid config");

        assert_eq!(cfg.insets, Insets::new(30, 0, 0, 48).unwrap());
    }

    #[test]
    fn test_parse_config_without_insets_table_uses_zero() {
        let cfg = parse_config("").expect("empty config is valid");
        assert_eq!(cfg.insets, Insets::ZERO);
    }

    #[test]
    fn test_parse_config_rejects_negative_inset() {
        let err = parse_config("[insets]\nleft = -5\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("negative inset"), "{err}");
    }

    #[test]
    fn test_parse_config_rejects_malformed_toml() {
        assert!(matches!(
            parse_config("[insets\ntop = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_config_reports_missing_file_with_path() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let err = load_config(&path).unwrap_err();

        match err {
            ConfigError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_config_reads_file_from_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("xpointerbarrier_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[insets]\nright = 12\n").unwrap();

        // Act
        let cfg = load_config(&path).expect("load");

        // Assert
        assert_eq!(cfg.insets.right(), 12);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_config_serializes_back_to_toml() {
        let cfg = FileConfig {
            insets: Insets::new(1, 2, 3, 4).unwrap(),
        };

        let text = toml::to_string(&cfg).unwrap();

        assert_eq!(parse_config(&text).unwrap(), cfg);
    }
}
