//! Storage layer for carpark.
//!
//! This module reads the spaces, cars and parked files into records and
//! writes the parked table back out. Malformed lines are logged and skipped;
//! they never abort a load.

pub mod format;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_TIME_FORMAT};
use crate::error::{Error, Result};
use crate::model::{ParkedRecord, ParkingSpace, RegisteredCar};

use self::format::{data_lines, format_parked, parse_car, parse_parked, parse_space, PARKED_HEADER};

/// File-backed storage for the three car park tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    /// Path to the spaces file.
    spaces_path: PathBuf,
    /// Path to the registered cars file.
    cars_path: PathBuf,
    /// Path to the parked cars file.
    parked_path: PathBuf,
    /// strftime format used when writing times.
    time_format: String,
}

impl Storage {
    /// Create storage over explicit file paths.
    #[must_use]
    pub fn new(
        spaces_path: impl Into<PathBuf>,
        cars_path: impl Into<PathBuf>,
        parked_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            spaces_path: spaces_path.into(),
            cars_path: cars_path.into(),
            parked_path: parked_path.into(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Create storage for the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let config = Config::default();
        let dir = dir.as_ref();
        Self::new(
            dir.join(&config.files.spaces_file),
            dir.join(&config.files.cars_file),
            dir.join(&config.files.parked_file),
        )
    }

    /// Create storage from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.spaces_path(), config.cars_path(), config.parked_path())
            .with_time_format(&config.parking.time_format)
    }

    /// Use a different time format when writing.
    #[must_use]
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    /// Get the path to the spaces file.
    #[must_use]
    pub fn spaces_path(&self) -> &Path {
        &self.spaces_path
    }

    /// Get the path to the cars file.
    #[must_use]
    pub fn cars_path(&self) -> &Path {
        &self.cars_path
    }

    /// Get the path to the parked file.
    #[must_use]
    pub fn parked_path(&self) -> &Path {
        &self.parked_path
    }

    /// Get the time format used when writing.
    #[must_use]
    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// Load the spaces table, in file order.
    ///
    /// Every space starts unoccupied; occupancy comes from the parked table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file is missing, or an error if
    /// it cannot be read.
    pub fn load_spaces(&self) -> Result<Vec<ParkingSpace>> {
        let content = read_table(&self.spaces_path)?;
        let mut seen = HashSet::new();
        let mut spaces = Vec::new();

        for line in data_lines(&content) {
            match parse_space(&line.fields) {
                Ok(space) if !seen.insert(space.id.clone()) => {
                    warn!(
                        "{}:{}: duplicate space {}, skipping",
                        self.spaces_path.display(),
                        line.number,
                        space.id
                    );
                }
                Ok(space) => spaces.push(space),
                Err(e) => skip_line(&self.spaces_path, line.number, &e),
            }
        }

        info!(
            "Loaded {} spaces from {}",
            spaces.len(),
            self.spaces_path.display()
        );
        Ok(spaces)
    }

    /// Load the registered cars table, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file is missing, or an error if
    /// it cannot be read.
    pub fn load_cars(&self) -> Result<Vec<RegisteredCar>> {
        let content = read_table(&self.cars_path)?;
        let mut seen = HashSet::new();
        let mut cars = Vec::new();

        for line in data_lines(&content) {
            match parse_car(&line.fields) {
                Ok(car) if !seen.insert(car.registration.clone()) => {
                    warn!(
                        "{}:{}: duplicate registration {}, skipping",
                        self.cars_path.display(),
                        line.number,
                        car.registration
                    );
                }
                Ok(car) => cars.push(car),
                Err(e) => skip_line(&self.cars_path, line.number, &e),
            }
        }

        info!("Loaded {} cars from {}", cars.len(), self.cars_path.display());
        Ok(cars)
    }

    /// Load the parked table.
    ///
    /// A missing file means no cars are parked. Records are returned as read;
    /// checking them against the spaces and cars is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_parked(&self) -> Result<Vec<ParkedRecord>> {
        let content = match read_table(&self.parked_path) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                debug!(
                    "{} does not exist, no cars parked",
                    self.parked_path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let records: Vec<ParkedRecord> = data_lines(&content)
            .filter_map(|line| match parse_parked(&line.fields, &self.time_format) {
                Ok(record) => Some(record),
                Err(e) => {
                    skip_line(&self.parked_path, line.number, &e);
                    None
                }
            })
            .collect();

        info!(
            "Loaded {} parked records from {}",
            records.len(),
            self.parked_path.display()
        );
        Ok(records)
    }

    /// Write the parked table, replacing the file.
    ///
    /// Creates the parent directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_parked<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ParkedRecord>,
    ) -> Result<usize> {
        if let Some(parent) = self.parked_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut content = String::new();
        content.push_str(PARKED_HEADER);
        content.push('\n');
        let mut count = 0;
        for record in records {
            content.push_str(&format_parked(record, &self.time_format));
            content.push('\n');
            count += 1;
        }

        std::fs::write(&self.parked_path, content).map_err(|source| Error::FileWrite {
            path: self.parked_path.clone(),
            source,
        })?;

        info!(
            "Saved {} parked records to {}",
            count,
            self.parked_path.display()
        );
        Ok(count)
    }
}

fn read_table(path: &Path) -> Result<String> {
    debug!("Reading {}", path.display());
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn skip_line(path: &Path, line: usize, reason: &format::LineError) {
    warn!("{}, skipping", Error::parse(path, line, reason.to_string()));
}
