//! Configuration management for carpark.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the user's config directory.
const APP_DIR_NAME: &str = "carpark";

/// Default spaces file name.
const SPACES_FILE_NAME: &str = "SPACES.txt";

/// Default cars file name.
const CARS_FILE_NAME: &str = "CARS.txt";

/// Default parked file name.
const PARKED_FILE_NAME: &str = "PARKED.txt";

/// Default timestamp format written to the parked file.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CARPARK_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/carpark/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data file locations.
    pub files: FilesConfig,
    /// Parking rules.
    pub parking: ParkingConfig,
    /// Input validation.
    pub validation: ValidationConfig,
}

/// Data file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory holding the data files.
    /// Defaults to the current working directory.
    pub data_dir: Option<PathBuf>,
    /// File name of the spaces table.
    pub spaces_file: String,
    /// File name of the registered cars table.
    pub cars_file: String,
    /// File name of the parked cars table.
    pub parked_file: String,
}

/// Parking rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingConfig {
    /// Requested stays are rounded to a multiple of this many minutes.
    pub slot_minutes: u32,
    /// Shortest stay that can be booked.
    pub min_duration_minutes: u32,
    /// strftime format for times written to the parked file.
    pub time_format: String,
    /// Let disabled badge holders use a standard bay when no disabled bay is free.
    pub disabled_may_use_standard: bool,
}

/// Input validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Regex a normalised registration must match before parking.
    /// `None` accepts any registration.
    pub registration_pattern: Option<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to the working directory at runtime
            spaces_file: SPACES_FILE_NAME.to_string(),
            cars_file: CARS_FILE_NAME.to_string(),
            parked_file: PARKED_FILE_NAME.to_string(),
        }
    }
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 15,
            min_duration_minutes: 15,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            disabled_may_use_standard: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            registration_pattern: Some(r"^[A-Z0-9][A-Z0-9 ]{0,9}$".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CARPARK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.parking.slot_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "slot_minutes must be greater than 0".to_string(),
            });
        }

        if self.parking.min_duration_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "min_duration_minutes must be greater than 0".to_string(),
            });
        }

        let format = &self.parking.time_format;
        if format.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "time_format must not be empty".to_string(),
            });
        }
        // Times share a line with comma-separated fields.
        if format.contains(',') {
            return Err(Error::ConfigValidation {
                message: format!("time_format must not contain a comma: {format}"),
            });
        }
        check_time_format(format)?;

        for (name, file) in [
            ("spaces_file", &self.files.spaces_file),
            ("cars_file", &self.files.cars_file),
            ("parked_file", &self.files.parked_file),
        ] {
            if file.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        self.registration_regex()?;
        Ok(())
    }

    /// Compile the registration pattern, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn registration_regex(&self) -> Result<Option<Regex>> {
        self.validation
            .registration_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|_| Error::ConfigValidation {
                    message: format!("invalid regex pattern: {pattern}"),
                })
            })
            .transpose()
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.files
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path to the spaces file.
    #[must_use]
    pub fn spaces_path(&self) -> PathBuf {
        self.data_dir().join(&self.files.spaces_file)
    }

    /// Path to the cars file.
    #[must_use]
    pub fn cars_path(&self) -> PathBuf {
        self.data_dir().join(&self.files.cars_file)
    }

    /// Path to the parked file.
    #[must_use]
    pub fn parked_path(&self) -> PathBuf {
        self.data_dir().join(&self.files.parked_file)
    }
}

/// Check that times written with `format` can be read back unchanged.
fn check_time_format(format: &str) -> Result<()> {
    let invalid = |reason: &str| Error::ConfigValidation {
        message: format!("invalid time_format {format}: {reason}"),
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid("unknown specifier"));
    }

    let sample = NaiveDate::from_ymd_opt(2025, 9, 30)
        .and_then(|date| date.and_hms_opt(9, 5, 7))
        .ok_or_else(|| invalid("no sample time"))?;
    let mut written = String::new();
    write!(written, "{}", sample.format(format))
        .map_err(|_| invalid("needs a time zone, but times are local"))?;

    match NaiveDateTime::parse_from_str(&written, format) {
        Ok(read) if read == sample => Ok(()),
        _ => Err(invalid("written times cannot be read back in full")),
    }
}
