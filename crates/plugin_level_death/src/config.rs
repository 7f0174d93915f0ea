//! Plugin configuration.
//!
//! The file on disk is `config.toml` in the plugin's data folder. Despite the
//! extension it is a flat `KEY=value` list, not TOML:
//!
//! ```text
//! OPTION1=true
//! OPTION1_START_LEVEL=10
//! OPTION1_PENALTY_PERCENT=-20
//! OPTION2=false
//! OPTION2_LEVEL_RANGES="10,30,-20;31,100,-50"
//! ```
//!
//! Loading is two-step. [`load_raw_config`] never fails: I/O problems are
//! logged and produce an empty mapping. [`DeathPenaltyConfig::from_raw`] then
//! parses the mapping into a typed rule and reports bad values.

use crate::penalty::{LevelRange, PenaltyRule};
use crate::LOG_PREFIX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const OPTION1: &str = "OPTION1";
pub const OPTION1_START_LEVEL: &str = "OPTION1_START_LEVEL";
pub const OPTION1_PENALTY_PERCENT: &str = "OPTION1_PENALTY_PERCENT";
pub const OPTION2: &str = "OPTION2";
pub const OPTION2_LEVEL_RANGES: &str = "OPTION2_LEVEL_RANGES";

/// Written when no config file exists yet.
pub const DEFAULT_CONFIG: &str = r#"# Level death penalty settings.
# OPTION1: fixed percent from a start level upwards.
OPTION1=true
OPTION1_START_LEVEL=10
OPTION1_PENALTY_PERCENT=-20
# OPTION2: "min,max,percent" ranges separated by ';'. Used when OPTION1 is false.
OPTION2=false
OPTION2_LEVEL_RANGES="10,30,-20;31,100,-50"
"#;

/// Option name to option value, exactly as read from disk.
pub type RawConfig = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be true or false, got '{value}'")]
    InvalidBool { key: &'static str, value: String },
    #[error("{key} must be an integer, got '{value}': {source}")]
    InvalidInteger {
        key: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid level range '{entry}' in OPTION2_LEVEL_RANGES: {source}")]
    InvalidRange {
        entry: String,
        #[source]
        source: ParseIntError,
    },
}

pub fn config_path(data_folder: &Path) -> PathBuf {
    data_folder.join(CONFIG_FILE_NAME)
}

/// Writes [`DEFAULT_CONFIG`] unless a config file already exists.
///
/// Returns whether a file was written. Failures are logged, never returned.
pub async fn save_default_config(data_folder: &Path) -> bool {
    let path = config_path(data_folder);
    if path.exists() {
        return false;
    }

    if let Err(e) = fs::create_dir_all(data_folder).await {
        error!(
            "{} Error creating data folder {}: {}",
            LOG_PREFIX,
            data_folder.display(),
            e
        );
        return false;
    }

    match fs::write(&path, DEFAULT_CONFIG).await {
        Ok(()) => {
            info!("{} Default config saved to {}", LOG_PREFIX, path.display());
            true
        }
        Err(e) => {
            error!("{} Error saving default config: {}", LOG_PREFIX, e);
            false
        }
    }
}

/// Reads the config file into a [`RawConfig`].
///
/// A missing or unreadable file is logged and yields an empty mapping.
pub async fn load_raw_config(data_folder: &Path) -> RawConfig {
    let path = config_path(data_folder);
    if !path.exists() {
        error!("{} Config file not found: {}", LOG_PREFIX, path.display());
        return RawConfig::new();
    }

    match fs::read_to_string(&path).await {
        Ok(text) => {
            let config = parse_config_text(&text);
            info!("{} Config loaded: {:?}", LOG_PREFIX, config);
            config
        }
        Err(e) => {
            error!("{} Error loading config: {}", LOG_PREFIX, e);
            RawConfig::new()
        }
    }
}

/// Parses `KEY=value` lines. Blank lines and `#` comments are skipped, the
/// value is split off at the first `=`, surrounding double quotes are removed
/// and the last occurrence of a key wins.
pub fn parse_config_text(text: &str) -> RawConfig {
    let mut config = RawConfig::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                config.insert(
                    key.trim().to_string(),
                    value.trim().trim_matches('"').to_string(),
                );
            }
            None => warn!("{} Ignoring config line without '=': {}", LOG_PREFIX, line),
        }
    }
    config
}

/// Typed plugin configuration, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathPenaltyConfig {
    pub rule: PenaltyRule,
}

impl Default for DeathPenaltyConfig {
    fn default() -> Self {
        Self {
            rule: PenaltyRule::Disabled,
        }
    }
}

impl DeathPenaltyConfig {
    /// Builds the typed configuration. `OPTION1` takes precedence over
    /// `OPTION2`; only the keys of the selected rule are parsed.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let rule = if read_bool(raw, OPTION1, false)? {
            PenaltyRule::Threshold {
                start_level: read_int(raw, OPTION1_START_LEVEL, 10)?,
                percent: read_int(raw, OPTION1_PENALTY_PERCENT, 0)?,
            }
        } else if read_bool(raw, OPTION2, false)? {
            let ranges_text = raw.get(OPTION2_LEVEL_RANGES).map(String::as_str).unwrap_or("");
            PenaltyRule::Ranges {
                ranges: parse_level_ranges(ranges_text)?,
            }
        } else {
            PenaltyRule::Disabled
        };

        Ok(Self { rule })
    }

    /// Ensures a config file exists in `data_folder`, then reads and parses it.
    pub async fn load(data_folder: &Path) -> Result<Self, ConfigError> {
        save_default_config(data_folder).await;
        let raw = load_raw_config(data_folder).await;
        Self::from_raw(&raw)
    }
}

/// Parses `min,max,percent;min,max,percent;...`, keeping file order.
///
/// Entries without exactly three parts are logged and skipped.
pub fn parse_level_ranges(text: &str) -> Result<Vec<LevelRange>, ConfigError> {
    let mut ranges = Vec::new();
    for entry in text.split(';') {
        let entry = entry.trim();
        let parts: Vec<&str> = entry.split(',').collect();
        if parts.len() != 3 {
            error!("{} Invalid level range format: '{}'", LOG_PREFIX, entry);
            continue;
        }

        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|source| ConfigError::InvalidRange {
                    entry: entry.to_string(),
                    source,
                })
        };
        let range = LevelRange {
            min_level: parse(parts[0])?,
            max_level: parse(parts[1])?,
            percent: parse(parts[2])?,
        };

        if range.min_level > range.max_level {
            warn!(
                "{} Level range '{}' has min above max and will never match",
                LOG_PREFIX, entry
            );
        }
        ranges.push(range);
    }
    Ok(ranges)
}

fn read_bool(raw: &RawConfig, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match raw.get(key) {
        None => Ok(default),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(ConfigError::InvalidBool {
            key,
            value: value.clone(),
        }),
    }
}

fn read_int(raw: &RawConfig, key: &'static str, default: i32) -> Result<i32, ConfigError> {
    match raw.get(key) {
        None => Ok(default),
        Some(value) => value
            .parse::<i32>()
            .map_err(|source| ConfigError::InvalidInteger {
                key,
                value: value.clone(),
                source,
            }),
    }
}
