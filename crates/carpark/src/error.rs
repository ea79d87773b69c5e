//! Error types for carpark.
//!
//! This module defines all error types used throughout the carpark crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::SpaceType;

/// The main error type for carpark operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Data File Errors ===
    /// A data file does not exist.
    #[error("{} not found", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read a data file.
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a data file.
    #[error("failed to write {}: {source}", .path.display())]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line in a data file could not be parsed.
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Parking Errors ===
    /// The registration is not in the car table.
    #[error("Car {0} not found in registered cars")]
    UnknownRegistration(String),

    /// The registration does not match the configured format.
    #[error("Registration '{0}' is not in a recognised format")]
    InvalidRegistration(String),

    /// The car already occupies a space.
    #[error("Car {registration} is already parked in space {space_id}")]
    AlreadyParked {
        /// The car's registration.
        registration: String,
        /// The space it occupies.
        space_id: String,
    },

    /// No free space is usable by the entitlement.
    #[error("No available {0} space found")]
    NoFreeSpace(SpaceType),

    /// The space ID is not in the space table.
    #[error("Space {0} does not exist")]
    UnknownSpace(String),

    /// The requested space cannot take this car.
    #[error("Space {space_id} is not available for {entitlement} cars")]
    SpaceUnavailable {
        /// The requested space.
        space_id: String,
        /// The car's entitlement.
        entitlement: SpaceType,
    },

    /// Neither a parked registration nor an occupied space matched.
    #[error("Car or space {0} not found in parked cars")]
    NotParked(String),

    /// The requested stay cannot be represented.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// A space type string was not recognised.
    #[error("unknown space type '{0}' (expected Standard, Disabled or EV)")]
    UnknownSpaceType(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Console or other I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for carpark operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a parse error for a line in a data file.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid duration error.
    #[must_use]
    pub fn invalid_duration(message: impl Into<String>) -> Self {
        Self::InvalidDuration(message.into())
    }

    /// Check if this error means a data file is missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Check if this error is a rejected parking operation rather than a
    /// system failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownRegistration(_)
                | Self::InvalidRegistration(_)
                | Self::AlreadyParked { .. }
                | Self::NoFreeSpace(_)
                | Self::UnknownSpace(_)
                | Self::SpaceUnavailable { .. }
                | Self::NotParked(_)
                | Self::InvalidDuration(_)
        )
    }
}
