//! Configuration loading.
//!
//! Configuration is read in layers, later layers overriding earlier ones
//! key by key:
//! 1. Built-in defaults
//! 2. The user config file, `<config dir>/phpcursor/config.toml`
//! 3. A file passed explicitly with `--config`
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [scan]
//! skip_comments = true
//! ```

use std::path::{Path, PathBuf};

use etcetera::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::invocation::ScanOptions;

// ─── Resolved configuration ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanConfig {
    /// Skip comments between a receiver and a dynamic member name.
    pub skip_comments: bool,
}

impl ScanConfig {
    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            skip_comments: self.skip_comments,
        }
    }
}

// ─── Overlays ───────────────────────────────────────────────────────────────

/// A partially specified config file.  Only keys present in the file
/// replace values from earlier layers.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigOverlay {
    logging: Option<LoggingOverlay>,
    scan: Option<ScanOverlay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingOverlay {
    level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScanOverlay {
    skip_comments: Option<bool>,
}

impl Config {
    fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(logging) = overlay.logging
            && let Some(level) = logging.level
        {
            self.logging.level = level;
        }
        if let Some(scan) = overlay.scan
            && let Some(skip) = scan.skip_comments
        {
            self.scan.skip_comments = skip;
        }
    }

    /// Load the user config file (if any) and then `explicit` on top.
    ///
    /// A missing user config file is not an error; a missing explicit
    /// file is.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = user_config_path()
            && let Some(overlay) = read_overlay(&path, true)?
        {
            config.apply(overlay);
        }

        if let Some(path) = explicit
            && let Some(overlay) = read_overlay(path, false)?
        {
            config.apply(overlay);
        }

        Ok(config)
    }

    /// Parse a single TOML document on top of the defaults.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply(parse_overlay(contents, path)?);
        Ok(config)
    }
}

/// `<config dir>/phpcursor/config.toml`, or `None` when the platform has
/// no config directory (e.g. no home directory).
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("phpcursor").join("config.toml"))
}

fn parse_overlay(contents: &str, path: &Path) -> Result<ConfigOverlay, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_overlay(path: &Path, optional: bool) -> Result<Option<ConfigOverlay>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_overlay(&contents, path).map(Some),
        Err(e) if optional && e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
