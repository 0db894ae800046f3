//! Configuration file support for ferro-varnorm.
//!
//! Loads `.ferro-varnorm.toml` files that set normalization and batch
//! options.
//!
//! # Example Configuration
//!
//! ```toml
//! [normalize]
//! decompose-mnv = true
//!
//! [normalize.copy-number]
//! loss-below = 2
//! gain-above = 2
//!
//! [batch]
//! continue-on-error = true
//! progress-interval = 1000
//! max-frame-span = 100000
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-varnorm.toml` in current directory
//! 2. `~/.config/ferro/varnorm.toml`
//!
//! CLI flags take precedence over config file settings.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::BatchConfig;
use crate::error::FerroError;
use crate::normalize::NormalizeConfig;

/// File name searched in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".ferro-varnorm.toml";

/// Parsed configuration from a `.ferro-varnorm.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FerroConfig {
    /// Normalization settings.
    pub normalize: NormalizeConfig,
    /// Batch driver settings.
    pub batch: BatchConfig,
}

impl FerroConfig {
    /// Load configuration from the default locations.
    ///
    /// A file that exists but cannot be parsed is an error; no file at all
    /// gives `None`.
    pub fn load() -> Result<Option<Self>, FerroError> {
        for path in search_paths() {
            if path.exists() {
                debug!("loading configuration from {}", path.display());
                return Self::load_from_path(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, FerroError> {
        let content = fs::read_to_string(path).map_err(|e| FerroError::Config {
            msg: format!("{}: {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            FerroError::Config { msg } => FerroError::Config {
                msg: format!("{}: {}", path.display(), msg),
            },
            other => other,
        })
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, FerroError> {
        let config: FerroConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), FerroError> {
        self.normalize.validate()?;
        self.batch.validate()
    }

    /// Merge with CLI arguments; CLI arguments take precedence.
    pub fn merge_with_cli(
        mut self,
        decompose_mnv: Option<bool>,
        continue_on_error: Option<bool>,
    ) -> Self {
        if let Some(decompose) = decompose_mnv {
            self.normalize.decompose_mnv = decompose;
        }
        if let Some(keep_going) = continue_on_error {
            self.batch.continue_on_error = keep_going;
        }
        self
    }
}

/// Candidate configuration files, in priority order
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    match dirs_home() {
        Some(home) => paths.push(home.join(".config").join("ferro").join("varnorm.toml")),
        None => warn!("HOME is not set; skipping the user configuration file"),
    }
    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::structural::CopyNumberPolicy;

    #[test]
    fn test_parse_empty_config() {
        let config = FerroConfig::parse("").unwrap();
        assert_eq!(config, FerroConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
# comment
[normalize]
decompose-mnv = true

[normalize.copy-number]
loss-below = 1
gain-above = 1

[batch]
continue-on-error = false
progress-interval = 10
max-frame-span = 500
"#;
        let config = FerroConfig::parse(content).unwrap();
        assert!(config.normalize.decompose_mnv);
        assert_eq!(config.normalize.copy_number, CopyNumberPolicy::with_baseline(1));
        assert!(!config.batch.continue_on_error);
        assert_eq!(config.batch.progress_interval, 10);
        assert_eq!(config.batch.max_frame_span, 500);
    }

    #[test]
    fn test_invalid_config() {
        let err = FerroConfig::parse("[unknown]\nx = 1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);

        let err = FerroConfig::parse("[normalize.copy-number]\nloss-below = 3\ngain-above = 1")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);

        let err = FerroConfig::parse("[batch]\nprogress-interval = 0").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);

        let err = FerroConfig::parse("[batch]\nmax-frame-span = 0").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
    }

    #[test]
    fn test_merge_with_cli() {
        let config = FerroConfig::default().merge_with_cli(Some(true), Some(false));
        assert!(config.normalize.decompose_mnv);
        assert!(!config.batch.continue_on_error);

        let unchanged = FerroConfig::default().merge_with_cli(None, None);
        assert_eq!(unchanged, FerroConfig::default());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varnorm.toml");
        fs::write(&path, "[batch]\nprogress-interval = 5\n").unwrap();
        let config = FerroConfig::load_from_path(&path).unwrap();
        assert_eq!(config.batch.progress_interval, 5);

        let missing = FerroConfig::load_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert_eq!(missing.code(), ErrorCode::Config);
    }
}
